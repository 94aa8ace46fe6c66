//! Patient attribute records.
//!
//! The authoritative input is [`PatientForm`], the structured record a form collects.
//! [`extract_patient_profile`] is an alternate entry point that reads a free-text
//! description with the same phrase lexicon used for criteria.

use crate::attributes::{Attribute, AttributeRecord, AttributeValue, DiagnosisLabel};
use crate::lexicon::{digit_levels, Lexicon};
use crate::{MatchError, MatchResult};
use ctm_types::{PatientAge, PerformanceScore};
use serde::{Deserialize, Serialize};

/// Structured patient facts as collected by the form.
///
/// Range checks on age and performance status are enforced by the field types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientForm {
    pub age: PatientAge,
    pub diagnosis: DiagnosisLabel,
    #[serde(rename = "scheduled_for_FDG-PET", default)]
    pub scheduled_for_fdg_pet: bool,
    pub performance_status: PerformanceScore,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default)]
    pub lactating: bool,
    #[serde(default)]
    pub malignant_pleural_effusion: bool,
    #[serde(default)]
    pub irradiation: bool,
    #[serde(default)]
    pub active_infection: bool,
    #[serde(default)]
    pub neurological: bool,
    #[serde(default)]
    pub psychiatric: bool,
    #[serde(default)]
    pub consent: bool,
}

impl PatientForm {
    /// A form with every flag cleared.
    pub fn new(
        age: PatientAge,
        diagnosis: DiagnosisLabel,
        performance_status: PerformanceScore,
    ) -> Self {
        Self {
            age,
            diagnosis,
            scheduled_for_fdg_pet: false,
            performance_status,
            pregnant: false,
            lactating: false,
            malignant_pleural_effusion: false,
            irradiation: false,
            active_infection: false,
            neurological: false,
            psychiatric: false,
            consent: false,
        }
    }

    /// Parse a patient form from YAML.
    ///
    /// Schema mismatches are reported with the path of the offending field.
    pub fn parse_yaml(yaml_text: &str) -> MatchResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        serde_path_to_error::deserialize::<_, PatientForm>(deserializer).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            MatchError::Translation(format!("Patient record schema mismatch at {path}: {source}"))
        })
    }

    /// Canonical attribute record for this patient.
    pub fn to_attribute_record(&self) -> AttributeRecord {
        build_patient_profile(self)
    }
}

/// Build the canonical attribute record from a form.
///
/// Paired form questions collapse into the combined attributes used by criteria:
/// pregnant or lactating, neurological or psychiatric.
pub fn build_patient_profile(form: &PatientForm) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    record.insert(Attribute::Age, AttributeValue::Age(form.age.get()));
    record.insert(Attribute::Diagnosis, AttributeValue::Diagnosis(form.diagnosis));
    record.insert(
        Attribute::PerformanceStatus,
        AttributeValue::PerformanceStatus(form.performance_status.get()),
    );
    record.set_flag(Attribute::ScheduledForFdgPet, form.scheduled_for_fdg_pet);
    record.set_flag(
        Attribute::PregnantOrLactating,
        form.pregnant || form.lactating,
    );
    record.set_flag(
        Attribute::MalignantPleuralEffusionOnly,
        form.malignant_pleural_effusion,
    );
    record.set_flag(Attribute::UndergoingIrradiation, form.irradiation);
    record.set_flag(Attribute::ActiveInfection, form.active_infection);
    record.set_flag(
        Attribute::NeurologicalOrPsychiatricDisorders,
        form.neurological || form.psychiatric,
    );
    record.set_flag(Attribute::Consent, form.consent);
    record
}

/// Build a patient record from a free-text description.
///
/// - age from `NN-year-old`;
/// - diagnosis from the earliest form label mentioned;
/// - performance status from the first digit of a sentence mentioning it;
/// - flags from the lexicon rules, `false` when never mentioned.
///
/// Age, diagnosis and performance status are left out when the text does not state them.
pub fn extract_patient_profile(text: &str) -> AttributeRecord {
    let lexicon = Lexicon::shared();
    let folded = text.to_lowercase();
    let mut record = AttributeRecord::new();

    if let Some(age) = lexicon.stated_age(&folded) {
        record.insert(Attribute::Age, AttributeValue::Age(age));
    }
    if let Some(label) = lexicon.diagnosis_label(&folded) {
        record.insert(Attribute::Diagnosis, AttributeValue::Diagnosis(label));
    }

    for sentence in folded.split(|c: char| c == '.' || c == '\n') {
        for attribute in lexicon.mentioned(sentence) {
            match attribute {
                Attribute::Diagnosis => {}
                Attribute::PerformanceStatus => {
                    if record.contains(attribute) {
                        continue;
                    }
                    if let Some(level) = digit_levels(sentence).first() {
                        record.insert(attribute, AttributeValue::PerformanceStatus(*level));
                    }
                }
                _ => record.set_flag(attribute, true),
            }
        }
    }

    for attribute in Attribute::ALL.into_iter().filter(|a| a.is_flag()) {
        if !record.contains(attribute) {
            record.set_flag(attribute, false);
        }
    }

    record
}
