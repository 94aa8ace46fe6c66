//! Turn criterion lines into attribute constraint records.

use super::{Category, EligibilityCriteria};
use crate::attributes::{Attribute, AttributeRecord, AttributeValue};
use crate::lexicon::{digit_levels, AgeBound, Lexicon};
use ctm_types::CriterionText;
use serde::Serialize;

/// Attribute constraints derived from a trial's eligibility text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CriteriaProfile {
    pub inclusion: AttributeRecord,
    pub exclusion: AttributeRecord,
}

impl CriteriaProfile {
    pub fn record(&self, category: Category) -> &AttributeRecord {
        match category {
            Category::Inclusion => &self.inclusion,
            Category::Exclusion => &self.exclusion,
        }
    }
}

/// Profile both sections of `criteria` with the shared lexicon.
///
/// `scheduled_for_FDG-PET` is never an exclusion constraint and is removed from the
/// exclusion record after profiling.
pub fn generate_criteria_profile(criteria: &EligibilityCriteria) -> CriteriaProfile {
    let lexicon = Lexicon::shared();

    let inclusion = profile_lines(lexicon, criteria.lines(Category::Inclusion));
    let mut exclusion = profile_lines(lexicon, criteria.lines(Category::Exclusion));
    exclusion.remove(Attribute::ScheduledForFdgPet);

    tracing::debug!(
        inclusion = inclusion.len(),
        exclusion = exclusion.len(),
        "generated criteria profile"
    );

    CriteriaProfile {
        inclusion,
        exclusion,
    }
}

/// Accumulate the constraints stated by `lines` into one record.
///
/// Every rule that fires on a line applies; later lines overwrite earlier values for the
/// same attribute.
pub fn profile_lines(lexicon: &Lexicon, lines: &[CriterionText]) -> AttributeRecord {
    let mut record = AttributeRecord::new();

    for line in lines {
        let folded = line.folded();

        match lexicon.age_bound(&folded) {
            Some(AgeBound::Range { min, max }) => {
                record.insert(Attribute::MinAge, AttributeValue::Age(min));
                record.insert(Attribute::MaxAge, AttributeValue::Age(max));
            }
            Some(AgeBound::Above(min)) => {
                record.insert(Attribute::MinAge, AttributeValue::Age(min));
            }
            Some(AgeBound::Below(max)) => {
                record.insert(Attribute::MaxAge, AttributeValue::Age(max));
            }
            None => {}
        }

        for attribute in lexicon.mentioned(&folded) {
            match attribute {
                Attribute::PerformanceStatus => {
                    let levels = digit_levels(&folded);
                    if levels.is_empty() {
                        tracing::debug!("performance status criterion without levels: {line}");
                        continue;
                    }
                    record.insert(attribute, AttributeValue::PerformanceLevels(levels));
                }
                _ => record.set_flag(attribute, true),
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::split_criteria;
    use crate::trial::TrialDefinition;

    fn lines(texts: &[&str]) -> Vec<CriterionText> {
        texts
            .iter()
            .map(|text| CriterionText::new(text).expect("non-empty line"))
            .collect()
    }

    #[test]
    fn demo_trial_profile() {
        let trial = TrialDefinition::demo();
        let profile = generate_criteria_profile(&split_criteria(&trial.criteria));

        let inclusion = &profile.inclusion;
        assert_eq!(inclusion.age(Attribute::MinAge), Some(20));
        assert_eq!(inclusion.age(Attribute::MaxAge), None);
        assert_eq!(inclusion.flag(Attribute::Consent), Some(true));
        assert_eq!(inclusion.flag(Attribute::Diagnosis), Some(true));
        assert_eq!(inclusion.flag(Attribute::ScheduledForFdgPet), Some(true));
        assert_eq!(inclusion.performance_levels(), Some(&[0, 1, 2, 3][..]));
        assert_eq!(inclusion.len(), 5);

        let exclusion = &profile.exclusion;
        assert_eq!(exclusion.flag(Attribute::PregnantOrLactating), Some(true));
        assert_eq!(
            exclusion.flag(Attribute::MalignantPleuralEffusionOnly),
            Some(true)
        );
        assert_eq!(exclusion.flag(Attribute::UndergoingIrradiation), Some(true));
        assert_eq!(
            exclusion.flag(Attribute::NeurologicalOrPsychiatricDisorders),
            Some(true)
        );
        // "informed consent" appears in the neurological exclusion line.
        assert_eq!(exclusion.flag(Attribute::Consent), Some(true));
        // "Active infection" (singular) does not trigger.
        assert!(!exclusion.contains(Attribute::ActiveInfection));
        assert!(!exclusion.contains(Attribute::ScheduledForFdgPet));
    }

    #[test]
    fn age_range_sets_both_bounds() {
        let record = profile_lines(Lexicon::shared(), &lines(&["Age 18 - 65"]));
        assert_eq!(record.age(Attribute::MinAge), Some(18));
        assert_eq!(record.age(Attribute::MaxAge), Some(65));
    }

    #[test]
    fn age_upper_bound_only() {
        let record = profile_lines(Lexicon::shared(), &lines(&["Age < 75 years"]));
        assert_eq!(record.age(Attribute::MinAge), None);
        assert_eq!(record.age(Attribute::MaxAge), Some(75));
    }

    #[test]
    fn ggo_counts_as_diagnosis() {
        let record = profile_lines(Lexicon::shared(), &lines(&["GGO on chest CT"]));
        assert_eq!(record.flag(Attribute::Diagnosis), Some(true));
    }

    #[test]
    fn performance_status_without_digits_is_not_recorded() {
        let record = profile_lines(Lexicon::shared(), &lines(&["Good performance status"]));
        assert!(!record.contains(Attribute::PerformanceStatus));
    }

    #[test]
    fn performance_levels_keep_source_order() {
        let record = profile_lines(Lexicon::shared(), &lines(&["Performance status 2 or 0"]));
        assert_eq!(record.performance_levels(), Some(&[2, 0][..]));
    }

    #[test]
    fn fdg_pet_is_kept_for_inclusion_only() {
        let criteria = split_criteria(
            "Inclusion Criteria:\nScheduled FDG-PET\nExclusion Criteria:\nFDG-PET allergy\n",
        );
        let profile = generate_criteria_profile(&criteria);
        assert_eq!(
            profile.inclusion.flag(Attribute::ScheduledForFdgPet),
            Some(true)
        );
        assert!(profile.record(Category::Exclusion).is_empty());
    }
}
