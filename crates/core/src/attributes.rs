//! Attribute records shared by the criteria and patient sides of a match.
//!
//! Both a trial's constraints and a patient's clinical facts are expressed over the same
//! closed set of [`Attribute`] keys. Lookups return `Option` so that "not stated" stays
//! distinct from "stated as false"; callers decide what absence means.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of attribute keys understood by the matcher.
///
/// Variant order is the display order of records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Age,
    Diagnosis,
    #[serde(rename = "scheduled_for_FDG-PET")]
    ScheduledForFdgPet,
    PerformanceStatus,
    PregnantOrLactating,
    MalignantPleuralEffusionOnly,
    UndergoingIrradiation,
    ActiveInfection,
    NeurologicalOrPsychiatricDisorders,
    Consent,
    MinAge,
    MaxAge,
}

impl Attribute {
    pub const ALL: [Attribute; 12] = [
        Attribute::Age,
        Attribute::Diagnosis,
        Attribute::ScheduledForFdgPet,
        Attribute::PerformanceStatus,
        Attribute::PregnantOrLactating,
        Attribute::MalignantPleuralEffusionOnly,
        Attribute::UndergoingIrradiation,
        Attribute::ActiveInfection,
        Attribute::NeurologicalOrPsychiatricDisorders,
        Attribute::Consent,
        Attribute::MinAge,
        Attribute::MaxAge,
    ];

    /// Wire name of the attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            Attribute::Age => "age",
            Attribute::Diagnosis => "diagnosis",
            Attribute::ScheduledForFdgPet => "scheduled_for_FDG-PET",
            Attribute::PerformanceStatus => "performance_status",
            Attribute::PregnantOrLactating => "pregnant_or_lactating",
            Attribute::MalignantPleuralEffusionOnly => "malignant_pleural_effusion_only",
            Attribute::UndergoingIrradiation => "undergoing_irradiation",
            Attribute::ActiveInfection => "active_infection",
            Attribute::NeurologicalOrPsychiatricDisorders => {
                "neurological_or_psychiatric_disorders"
            }
            Attribute::Consent => "consent",
            Attribute::MinAge => "min_age",
            Attribute::MaxAge => "max_age",
        }
    }

    /// Whether the attribute is a plain yes/no fact on the patient side.
    ///
    /// Age, diagnosis and performance status carry typed values and are normalised by the
    /// evaluator; age bounds only exist on the criteria side.
    pub const fn is_flag(self) -> bool {
        matches!(
            self,
            Attribute::ScheduledForFdgPet
                | Attribute::PregnantOrLactating
                | Attribute::MalignantPleuralEffusionOnly
                | Attribute::UndergoingIrradiation
                | Attribute::ActiveInfection
                | Attribute::NeurologicalOrPsychiatricDisorders
                | Attribute::Consent
        )
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Attribute {
    type Err = crate::MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| crate::MatchError::InvalidInput(format!("unknown attribute: {s}")))
    }
}

/// Diagnosis labels offered by the patient form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisLabel {
    #[serde(rename = "lung cancer")]
    LungCancer,
    #[serde(rename = "leukemia")]
    Leukemia,
    #[serde(rename = "malaria")]
    Malaria,
}

impl DiagnosisLabel {
    pub const ALL: [DiagnosisLabel; 3] = [
        DiagnosisLabel::LungCancer,
        DiagnosisLabel::Leukemia,
        DiagnosisLabel::Malaria,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosisLabel::LungCancer => "lung cancer",
            DiagnosisLabel::Leukemia => "leukemia",
            DiagnosisLabel::Malaria => "malaria",
        }
    }
}

impl std::fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosisLabel {
    type Err = crate::MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_lowercase();
        DiagnosisLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == folded)
            .ok_or_else(|| crate::MatchError::InvalidInput(format!("unknown diagnosis: {s}")))
    }
}

/// A value held against an [`Attribute`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Age(u32),
    PerformanceStatus(u8),
    /// Accepted performance-status levels, in the order they appear in the criterion.
    PerformanceLevels(Vec<u8>),
    Diagnosis(DiagnosisLabel),
}

impl AttributeValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

/// Inclusive performance-status band accepted by a trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PerformanceRange {
    pub min: u8,
    pub max: u8,
}

impl PerformanceRange {
    /// Reduce a list of accepted levels to its bounds, whatever order the levels came in.
    ///
    /// Returns `None` for an empty list.
    pub fn from_levels(levels: &[u8]) -> Option<Self> {
        let min = levels.iter().copied().min()?;
        let max = levels.iter().copied().max()?;
        Some(Self { min, max })
    }

    pub fn contains(self, level: u8) -> bool {
        !(level < self.min || level > self.max)
    }
}

/// Mapping from attribute to value, ordered by [`Attribute`] for stable display.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeRecord(BTreeMap<Attribute, AttributeValue>);

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attribute: Attribute, value: AttributeValue) {
        self.0.insert(attribute, value);
    }

    pub fn set_flag(&mut self, attribute: Attribute, value: bool) {
        self.insert(attribute, AttributeValue::Flag(value));
    }

    pub fn remove(&mut self, attribute: Attribute) -> Option<AttributeValue> {
        self.0.remove(&attribute)
    }

    pub fn get(&self, attribute: Attribute) -> Option<&AttributeValue> {
        self.0.get(&attribute)
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.0.contains_key(&attribute)
    }

    /// Boolean value of `attribute`, or `None` when absent or not a flag.
    pub fn flag(&self, attribute: Attribute) -> Option<bool> {
        self.get(attribute).and_then(AttributeValue::as_flag)
    }

    /// Age-typed value of `attribute` (used for `age`, `min_age` and `max_age`).
    pub fn age(&self, attribute: Attribute) -> Option<u32> {
        match self.get(attribute) {
            Some(AttributeValue::Age(years)) => Some(*years),
            _ => None,
        }
    }

    pub fn performance_status(&self) -> Option<u8> {
        match self.get(Attribute::PerformanceStatus) {
            Some(AttributeValue::PerformanceStatus(level)) => Some(*level),
            _ => None,
        }
    }

    pub fn performance_levels(&self) -> Option<&[u8]> {
        match self.get(Attribute::PerformanceStatus) {
            Some(AttributeValue::PerformanceLevels(levels)) => Some(levels),
            _ => None,
        }
    }

    pub fn diagnosis(&self) -> Option<DiagnosisLabel> {
        match self.get(Attribute::Diagnosis) {
            Some(AttributeValue::Diagnosis(label)) => Some(*label),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeValue)> {
        self.0.iter().map(|(attribute, value)| (*attribute, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Attribute, AttributeValue)> for AttributeRecord {
    fn from_iter<T: IntoIterator<Item = (Attribute, AttributeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A record reduced to boolean entries, ready for set-overlap scoring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparableProfile(BTreeMap<Attribute, bool>);

impl ComparableProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the flag entries of `record`.
    pub fn from_record(record: &AttributeRecord) -> Self {
        record
            .iter()
            .filter_map(|(attribute, value)| value.as_flag().map(|flag| (attribute, flag)))
            .collect()
    }

    pub fn insert(&mut self, attribute: Attribute, value: bool) {
        self.0.insert(attribute, value);
    }

    pub fn remove(&mut self, attribute: Attribute) -> Option<bool> {
        self.0.remove(&attribute)
    }

    pub fn get(&self, attribute: Attribute) -> Option<bool> {
        self.0.get(&attribute).copied()
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.0.contains_key(&attribute)
    }

    /// Copy with every value logically inverted.
    pub fn negated(&self) -> Self {
        self.iter().map(|(attribute, value)| (attribute, !value)).collect()
    }

    /// Copy keeping only the keys also present in `other`.
    pub fn restricted_to(&self, other: &ComparableProfile) -> Self {
        self.iter()
            .filter(|(attribute, _)| other.contains(*attribute))
            .collect()
    }

    /// Attributes whose value is `true`.
    pub fn truthy(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.iter()
            .filter_map(|(attribute, value)| value.then_some(attribute))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, bool)> + '_ {
        self.0.iter().map(|(attribute, value)| (*attribute, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Attribute, bool)> for ComparableProfile {
    fn from_iter<T: IntoIterator<Item = (Attribute, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
