//! # Clinical Trial Matcher Core
//!
//! Rule-based matching of a patient's clinical attributes against a trial's free-text
//! eligibility criteria.
//!
//! Pipeline, leaf first:
//! - [`criteria::split_criteria`] splits the criteria text into inclusion/exclusion lines
//! - [`criteria::generate_criteria_profile`] turns the lines into attribute constraints
//! - [`patient::build_patient_profile`] turns the form record into the same attribute shape
//! - [`evaluator::evaluate_eligibility`] normalises both sides to comparable booleans
//! - [`scorer::similarity_score`] computes the Sorensen-Dice score with exclusion veto
//!
//! **No API concerns**: the CLI and the REST server live in `ctm-cli` and `api-rest`.

pub mod attributes;
pub mod config;
pub mod constants;
pub mod criteria;
mod error;
pub mod evaluator;
pub mod lexicon;
pub mod patient;
pub mod scorer;
pub mod trial;

pub use attributes::{
    Attribute, AttributeRecord, AttributeValue, ComparableProfile, DiagnosisLabel,
    PerformanceRange,
};
pub use config::MatchConfig;
pub use criteria::{Category, CriteriaProfile, EligibilityCriteria};
pub use error::{MatchError, MatchResult};
pub use evaluator::Evaluation;
pub use patient::PatientForm;
pub use scorer::{ComparableCriteria, SimilarityScore};
pub use trial::TrialDefinition;

pub use ctm_types::Threshold;

use serde::Serialize;
use std::sync::Arc;

/// Eligibility decision after applying the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "eligible")]
    Eligible,
    #[serde(rename = "not eligible")]
    NotEligible,
}

impl Verdict {
    pub fn from_percentage(percentage: f64, threshold: Threshold) -> Self {
        if threshold.admits(percentage) {
            Verdict::Eligible
        } else {
            Verdict::NotEligible
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Verdict::Eligible => "eligible",
            Verdict::NotEligible => "not eligible",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the display side needs for one match request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Similarity score times 100.
    pub percentage: f64,
    pub threshold: Threshold,
    pub verdict: Verdict,
    pub evaluation: Evaluation,
}

/// Runs the matching pipeline for one request at a time.
///
/// Holds only the startup configuration; every call builds its records from scratch.
#[derive(Clone, Debug, Default)]
pub struct MatchService {
    cfg: Arc<MatchConfig>,
}

impl MatchService {
    pub fn new(cfg: Arc<MatchConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// The configured trial.
    pub fn trial(&self) -> &TrialDefinition {
        self.cfg.trial()
    }

    /// Split `criteria`, or the configured trial's criteria when `None`.
    pub fn split(&self, criteria: Option<&str>) -> EligibilityCriteria {
        criteria::split_criteria(criteria.unwrap_or(&self.cfg.trial().criteria))
    }

    /// Profile `criteria`, or the configured trial's criteria when `None`.
    pub fn profile(&self, criteria: Option<&str>) -> CriteriaProfile {
        criteria::generate_criteria_profile(&self.split(criteria))
    }

    /// Match a form record against `criteria` (default: configured trial).
    ///
    /// `threshold` falls back to the configured default.
    pub fn evaluate(
        &self,
        patient: &PatientForm,
        criteria: Option<&str>,
        threshold: Option<Threshold>,
    ) -> MatchResult<MatchOutcome> {
        self.evaluate_record(&patient.to_attribute_record(), criteria, threshold)
    }

    /// Match an already-built patient attribute record.
    pub fn evaluate_record(
        &self,
        patient: &AttributeRecord,
        criteria: Option<&str>,
        threshold: Option<Threshold>,
    ) -> MatchResult<MatchOutcome> {
        let threshold = threshold.unwrap_or(self.cfg.default_threshold());
        let profile = self.profile(criteria);
        let evaluation = evaluator::evaluate_eligibility(patient, &profile)?;

        let percentage = evaluation.score.percentage();
        let verdict = Verdict::from_percentage(percentage, threshold);
        tracing::info!(
            percentage,
            threshold = threshold.get(),
            %verdict,
            "evaluated patient against trial"
        );

        Ok(MatchOutcome {
            percentage,
            threshold,
            verdict,
            evaluation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctm_types::{PatientAge, PerformanceScore};

    fn form() -> PatientForm {
        let mut form = PatientForm::new(
            PatientAge::new(25).expect("valid age"),
            DiagnosisLabel::LungCancer,
            PerformanceScore::new(1).expect("valid score"),
        );
        form.scheduled_for_fdg_pet = true;
        form.consent = true;
        form
    }

    fn threshold(percent: i64) -> Option<Threshold> {
        Some(Threshold::new(percent).expect("valid threshold"))
    }

    #[test]
    fn full_match_is_eligible() {
        let service = MatchService::default();
        let outcome = service.evaluate(&form(), None, None).expect("evaluate");
        assert_eq!(outcome.percentage, 100.0);
        assert_eq!(outcome.verdict, Verdict::Eligible);
        assert_eq!(outcome.threshold.get(), 50);
    }

    #[test]
    fn percentage_equal_to_threshold_is_eligible() {
        let mut patient = form();
        patient.diagnosis = DiagnosisLabel::Leukemia;
        let service = MatchService::default();

        let outcome = service.evaluate(&patient, None, threshold(80)).expect("evaluate");
        assert!((outcome.percentage - 80.0).abs() < 1e-9);
        assert_eq!(outcome.verdict, Verdict::Eligible);

        let outcome = service.evaluate(&patient, None, threshold(81)).expect("evaluate");
        assert_eq!(outcome.verdict, Verdict::NotEligible);
    }

    #[test]
    fn vetoed_patient_is_not_eligible_even_at_zero_threshold() {
        let mut patient = form();
        patient.irradiation = true;
        let outcome = MatchService::default()
            .evaluate(&patient, None, threshold(1))
            .expect("evaluate");
        assert_eq!(outcome.percentage, 0.0);
        assert_eq!(outcome.verdict, Verdict::NotEligible);
    }

    #[test]
    fn custom_criteria_override_configured_trial() {
        let criteria = "Inclusion Criteria:\nAge > 30\nPerformance status 0-1\n";
        let outcome = MatchService::default()
            .evaluate(&form(), Some(criteria), None)
            .expect("evaluate");
        // Age fails, performance status and diagnosis pass: 2 * 2 / (3 + 3).
        assert!((outcome.percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn criteria_without_performance_levels_fail() {
        let err = MatchService::default()
            .evaluate(&form(), Some("Inclusion Criteria:\nAge > 18\n"), None)
            .expect_err("missing levels");
        assert!(matches!(err, MatchError::MissingRequiredField { .. }));
    }

    #[test]
    fn verdict_renders_as_words() {
        assert_eq!(Verdict::Eligible.to_string(), "eligible");
        assert_eq!(Verdict::NotEligible.to_string(), "not eligible");
    }
}
