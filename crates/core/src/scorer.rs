//! Sorensen-Dice similarity between a patient and a trial.

use crate::attributes::{Attribute, ComparableProfile};
use serde::Serialize;

/// Normalised trial constraints, inclusion and exclusion side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComparableCriteria {
    pub inclusion: ComparableProfile,
    pub exclusion: ComparableProfile,
}

/// Similarity score with the attribute breakdown behind it.
///
/// Only `value` is the score; the lists are for display and tracing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimilarityScore {
    /// Score in `0.0..=1.0`.
    pub value: f64,
    /// Exclusion attribute that disqualified the patient, if any.
    pub vetoed_by: Option<Attribute>,
    /// Inclusion attributes where patient and trial agree.
    pub matched: Vec<Attribute>,
    /// Inclusion attributes where patient and trial disagree.
    pub mismatched: Vec<Attribute>,
    /// Inclusion attributes the patient record does not mention.
    pub missing: Vec<Attribute>,
}

impl SimilarityScore {
    pub fn is_vetoed(&self) -> bool {
        self.vetoed_by.is_some()
    }

    pub fn percentage(&self) -> f64 {
        self.value * 100.0
    }
}

/// Score `patient` against `criteria`.
///
/// Any attribute that is true for the patient and named by the exclusion record vetoes
/// the match with a score of `0.0`. Otherwise the patient is restricted to the inclusion
/// keys and the Dice coefficient of the two (attribute, value) sets is returned. Two
/// empty sets score `0.0`.
pub fn similarity_score(
    patient: &ComparableProfile,
    criteria: &ComparableCriteria,
) -> SimilarityScore {
    let allowed = criteria.exclusion.negated();
    if let Some(attribute) = patient.truthy().find(|attribute| allowed.contains(*attribute)) {
        tracing::debug!(%attribute, "patient vetoed by exclusion criterion");
        return SimilarityScore {
            vetoed_by: Some(attribute),
            ..SimilarityScore::default()
        };
    }

    let inclusion = &criteria.inclusion;
    let restricted = patient.restricted_to(inclusion);

    let mut score = SimilarityScore::default();
    for (attribute, required) in inclusion.iter() {
        match restricted.get(attribute) {
            Some(value) if value == required => {
                tracing::debug!(%attribute, "matched");
                score.matched.push(attribute);
            }
            Some(value) => {
                tracing::debug!(%attribute, patient = value, criterion = required, "not matched");
                score.mismatched.push(attribute);
            }
            None => {
                tracing::debug!(%attribute, "not in patient profile");
                score.missing.push(attribute);
            }
        }
    }

    let total = restricted.len() + inclusion.len();
    score.value = if total == 0 {
        0.0
    } else {
        (2 * score.matched.len()) as f64 / total as f64
    };
    tracing::debug!(score = score.value, "similarity score");
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(entries: &[(Attribute, bool)]) -> ComparableProfile {
        entries.iter().copied().collect()
    }

    fn full_inclusion() -> ComparableProfile {
        profile(&[
            (Attribute::Age, true),
            (Attribute::Diagnosis, true),
            (Attribute::PerformanceStatus, true),
            (Attribute::Consent, true),
            (Attribute::ScheduledForFdgPet, true),
        ])
    }

    #[test]
    fn identical_records_score_one() {
        let criteria = ComparableCriteria {
            inclusion: full_inclusion(),
            exclusion: ComparableProfile::new(),
        };
        let score = similarity_score(&full_inclusion(), &criteria);
        assert_eq!(score.value, 1.0);
        assert_eq!(score.matched.len(), 5);
        assert!(!score.is_vetoed());
    }

    #[test]
    fn patient_without_inclusion_keys_scores_zero() {
        let criteria = ComparableCriteria {
            inclusion: full_inclusion(),
            exclusion: ComparableProfile::new(),
        };
        let patient = profile(&[(Attribute::ActiveInfection, false)]);
        let score = similarity_score(&patient, &criteria);
        assert_eq!(score.value, 0.0);
        assert_eq!(score.missing.len(), 5);
    }

    #[test]
    fn partial_overlap_uses_dice() {
        let criteria = ComparableCriteria {
            inclusion: full_inclusion(),
            exclusion: ComparableProfile::new(),
        };
        let patient = profile(&[
            (Attribute::Age, true),
            (Attribute::Diagnosis, false),
            (Attribute::PerformanceStatus, true),
            (Attribute::Consent, true),
        ]);
        // 2 * 3 / (4 + 5)
        let score = similarity_score(&patient, &criteria);
        assert!((score.value - 6.0 / 9.0).abs() < 1e-12);
        assert_eq!(score.mismatched, vec![Attribute::Diagnosis]);
        assert_eq!(score.missing, vec![Attribute::ScheduledForFdgPet]);
    }

    #[test]
    fn exclusion_veto_overrides_full_inclusion_match() {
        let criteria = ComparableCriteria {
            inclusion: full_inclusion(),
            exclusion: profile(&[(Attribute::PregnantOrLactating, true)]),
        };
        let mut patient = full_inclusion();
        patient.insert(Attribute::PregnantOrLactating, true);

        let score = similarity_score(&patient, &criteria);
        assert_eq!(score.value, 0.0);
        assert_eq!(score.vetoed_by, Some(Attribute::PregnantOrLactating));
        assert!(score.matched.is_empty());
    }

    #[test]
    fn false_patient_flag_does_not_veto() {
        let criteria = ComparableCriteria {
            inclusion: full_inclusion(),
            exclusion: profile(&[(Attribute::PregnantOrLactating, true)]),
        };
        let mut patient = full_inclusion();
        patient.insert(Attribute::PregnantOrLactating, false);

        let score = similarity_score(&patient, &criteria);
        assert_eq!(score.value, 1.0);
    }

    #[test]
    fn empty_sets_score_zero() {
        let score = similarity_score(&ComparableProfile::new(), &ComparableCriteria::default());
        assert_eq!(score.value, 0.0);
        assert!(!score.is_vetoed());
    }
}
