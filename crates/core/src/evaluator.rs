//! Normalise a patient record and a criteria profile into comparable boolean records,
//! then score them.

use crate::attributes::{
    Attribute, AttributeRecord, ComparableProfile, DiagnosisLabel, PerformanceRange,
};
use crate::criteria::CriteriaProfile;
use crate::scorer::{similarity_score, ComparableCriteria, SimilarityScore};
use crate::{MatchError, MatchResult};
use serde::Serialize;

/// Result of evaluating one patient against one trial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: SimilarityScore,
    /// Patient record after normalisation.
    pub patient: ComparableProfile,
    /// Trial constraints after normalisation, exclusion values not yet negated.
    pub trial: ComparableCriteria,
}

/// Evaluate `patient` against `criteria`.
///
/// Age, performance status and diagnosis are collapsed to pass/fail booleans on the
/// patient side and fixed to `true` on the inclusion side. A patient record that does not
/// state one of them fails that check.
///
/// # Errors
///
/// Returns [`MatchError::MissingRequiredField`] when the inclusion criteria carry no
/// performance-status levels.
pub fn evaluate_eligibility(
    patient: &AttributeRecord,
    criteria: &CriteriaProfile,
) -> MatchResult<Evaluation> {
    let inclusion_record = &criteria.inclusion;

    let age_ok = age_check(patient.age(Attribute::Age), inclusion_record);

    let range = inclusion_record
        .performance_levels()
        .and_then(PerformanceRange::from_levels)
        .ok_or(MatchError::MissingRequiredField {
            attribute: Attribute::PerformanceStatus,
        })?;
    let performance_ok = patient
        .performance_status()
        .is_some_and(|level| range.contains(level));

    let diagnosis_ok = patient.diagnosis() == Some(DiagnosisLabel::LungCancer);

    tracing::debug!(
        age_ok,
        performance_ok,
        diagnosis_ok,
        performance_min = range.min,
        performance_max = range.max,
        "normalised patient checks"
    );

    let mut patient_profile = ComparableProfile::from_record(patient);
    patient_profile.insert(Attribute::Age, age_ok);
    patient_profile.insert(Attribute::PerformanceStatus, performance_ok);
    patient_profile.insert(Attribute::Diagnosis, diagnosis_ok);

    let mut inclusion = ComparableProfile::from_record(inclusion_record);
    inclusion.insert(Attribute::Age, true);
    inclusion.insert(Attribute::PerformanceStatus, true);
    inclusion.insert(Attribute::Diagnosis, true);

    // Consent is required for inclusion but never disqualifies.
    let mut exclusion = ComparableProfile::from_record(&criteria.exclusion);
    exclusion.remove(Attribute::Consent);

    let trial = ComparableCriteria {
        inclusion,
        exclusion,
    };
    let score = similarity_score(&patient_profile, &trial);

    Ok(Evaluation {
        score,
        patient: patient_profile,
        trial,
    })
}

/// Strict age bounds: `age > min_age` and `age < max_age`, each only when stated.
fn age_check(age: Option<u32>, inclusion: &AttributeRecord) -> bool {
    let min_age = inclusion.age(Attribute::MinAge);
    let max_age = inclusion.age(Attribute::MaxAge);

    let above_min = min_age.map_or(true, |min| age.is_some_and(|age| age > min));
    let below_max = max_age.map_or(true, |max| age.is_some_and(|age| age < max));
    above_min && below_max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::criteria::{generate_criteria_profile, split_criteria};
    use crate::patient::{build_patient_profile, PatientForm};
    use crate::trial::TrialDefinition;
    use ctm_types::{PatientAge, PerformanceScore};

    fn demo_profile() -> CriteriaProfile {
        generate_criteria_profile(&split_criteria(&TrialDefinition::demo().criteria))
    }

    fn aligned_form(age: i64, performance: i64) -> PatientForm {
        let mut form = PatientForm::new(
            PatientAge::new(age).expect("valid age"),
            DiagnosisLabel::LungCancer,
            PerformanceScore::new(performance).expect("valid score"),
        );
        form.scheduled_for_fdg_pet = true;
        form.consent = true;
        form
    }

    fn inclusion_with(
        min_age: Option<u32>,
        max_age: Option<u32>,
        levels: Vec<u8>,
    ) -> CriteriaProfile {
        let mut inclusion = AttributeRecord::new();
        if let Some(min) = min_age {
            inclusion.insert(Attribute::MinAge, AttributeValue::Age(min));
        }
        if let Some(max) = max_age {
            inclusion.insert(Attribute::MaxAge, AttributeValue::Age(max));
        }
        inclusion.insert(
            Attribute::PerformanceStatus,
            AttributeValue::PerformanceLevels(levels),
        );
        CriteriaProfile {
            inclusion,
            exclusion: AttributeRecord::new(),
        }
    }

    fn patient(age: u32, performance: u8) -> AttributeRecord {
        let mut record = AttributeRecord::new();
        record.insert(Attribute::Age, AttributeValue::Age(age));
        record.insert(
            Attribute::PerformanceStatus,
            AttributeValue::PerformanceStatus(performance),
        );
        record.insert(
            Attribute::Diagnosis,
            AttributeValue::Diagnosis(DiagnosisLabel::LungCancer),
        );
        record
    }

    #[test]
    fn demo_trial_aligned_patient_scores_one() {
        let record = build_patient_profile(&aligned_form(25, 1));
        let evaluation = evaluate_eligibility(&record, &demo_profile()).expect("evaluate");

        assert_eq!(evaluation.patient.get(Attribute::Age), Some(true));
        assert_eq!(evaluation.patient.get(Attribute::Diagnosis), Some(true));
        assert_eq!(evaluation.patient.get(Attribute::PerformanceStatus), Some(true));
        assert_eq!(evaluation.score.value, 1.0);

        let inclusion = &evaluation.trial.inclusion;
        assert_eq!(inclusion.len(), 5);
        assert!(!inclusion.contains(Attribute::MinAge));
        assert!(!evaluation.trial.exclusion.contains(Attribute::Consent));
    }

    #[test]
    fn demo_trial_pregnant_patient_is_vetoed() {
        let mut form = aligned_form(25, 1);
        form.pregnant = true;
        let evaluation =
            evaluate_eligibility(&build_patient_profile(&form), &demo_profile()).expect("evaluate");

        assert_eq!(evaluation.score.value, 0.0);
        assert_eq!(
            evaluation.score.vetoed_by,
            Some(Attribute::PregnantOrLactating)
        );
    }

    #[test]
    fn demo_trial_consent_never_vetoes() {
        // The neurological exclusion line mentions informed consent.
        let record = build_patient_profile(&aligned_form(40, 0));
        let evaluation = evaluate_eligibility(&record, &demo_profile()).expect("evaluate");
        assert!(!evaluation.score.is_vetoed());
    }

    #[test]
    fn demo_trial_wrong_diagnosis_lowers_score() {
        let mut form = aligned_form(25, 1);
        form.diagnosis = DiagnosisLabel::Malaria;
        let evaluation =
            evaluate_eligibility(&build_patient_profile(&form), &demo_profile()).expect("evaluate");
        // 2 * 4 / (5 + 5)
        assert!((evaluation.score.value - 0.8).abs() < 1e-12);
        assert_eq!(evaluation.score.mismatched, vec![Attribute::Diagnosis]);
    }

    #[test]
    fn age_equal_to_minimum_fails() {
        let criteria = inclusion_with(Some(20), None, vec![0, 1]);
        let at_min = evaluate_eligibility(&patient(20, 0), &criteria).expect("evaluate");
        assert_eq!(at_min.patient.get(Attribute::Age), Some(false));

        let above = evaluate_eligibility(&patient(21, 0), &criteria).expect("evaluate");
        assert_eq!(above.patient.get(Attribute::Age), Some(true));
    }

    #[test]
    fn age_equal_to_maximum_fails() {
        let criteria = inclusion_with(Some(18), Some(65), vec![0]);
        let at_max = evaluate_eligibility(&patient(65, 0), &criteria).expect("evaluate");
        assert_eq!(at_max.patient.get(Attribute::Age), Some(false));

        let below = evaluate_eligibility(&patient(64, 0), &criteria).expect("evaluate");
        assert_eq!(below.patient.get(Attribute::Age), Some(true));
    }

    #[test]
    fn unconstrained_age_passes() {
        let criteria = inclusion_with(None, None, vec![0]);
        let evaluation = evaluate_eligibility(&patient(0, 0), &criteria).expect("evaluate");
        assert_eq!(evaluation.patient.get(Attribute::Age), Some(true));
    }

    #[test]
    fn performance_bounds_are_inclusive() {
        let criteria = inclusion_with(None, None, vec![1, 2, 3]);
        let check = |level| {
            evaluate_eligibility(&patient(30, level), &criteria)
                .expect("evaluate")
                .patient
                .get(Attribute::PerformanceStatus)
        };
        assert_eq!(check(0), Some(false));
        assert_eq!(check(1), Some(true));
        assert_eq!(check(3), Some(true));
        assert_eq!(check(4), Some(false));
    }

    #[test]
    fn performance_levels_out_of_order_still_bound_the_range() {
        let criteria = inclusion_with(None, None, vec![3, 1]);
        let evaluation = evaluate_eligibility(&patient(30, 2), &criteria).expect("evaluate");
        assert_eq!(
            evaluation.patient.get(Attribute::PerformanceStatus),
            Some(true)
        );
    }

    #[test]
    fn missing_performance_levels_is_an_error() {
        let criteria = CriteriaProfile::default();
        let err = evaluate_eligibility(&patient(30, 1), &criteria).expect_err("should fail");
        assert!(matches!(
            err,
            MatchError::MissingRequiredField {
                attribute: Attribute::PerformanceStatus
            }
        ));

        let empty = inclusion_with(None, None, Vec::new());
        assert!(evaluate_eligibility(&patient(30, 1), &empty).is_err());
    }

    #[test]
    fn unstated_patient_facts_fail_their_checks() {
        let criteria = inclusion_with(Some(20), None, vec![0, 1]);
        let evaluation =
            evaluate_eligibility(&AttributeRecord::new(), &criteria).expect("evaluate");
        assert_eq!(evaluation.patient.get(Attribute::Age), Some(false));
        assert_eq!(
            evaluation.patient.get(Attribute::PerformanceStatus),
            Some(false)
        );
        assert_eq!(evaluation.patient.get(Attribute::Diagnosis), Some(false));
        assert_eq!(evaluation.score.value, 0.0);
    }
}
