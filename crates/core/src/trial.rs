//! Trial definitions: identifier, title and free-text eligibility criteria.
//!
//! Definitions are read from YAML with a strict schema. A built-in demonstration trial is
//! used when none is configured.

use crate::{MatchError, MatchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEMO_TRIAL_ID: &str = "NCT05617742";

const DEMO_TRIAL_TITLE: &str = "FAPI-PET in patients with lung cancer or ground-glass opacity";

const DEMO_TRIAL_CRITERIA: &str = "
Inclusion Criteria:
    Age > 20 years
    Informed consent obtained from patients and families
    Patients with histology confirmed lung cancer or patients with GGO on chest CT planned to have biopsy or surgery
    Patients scheduled to undergo FDG-PET examination
    Performance status: 0, 1, 2, 3

Exclusion Criteria:
    Contraindication to FAPI-PET and FDG-PET such as pregnant, or lactating patients
    Patients with mainly malignant pleural effusion without other measurable lesions
    Undergoing irradiation at accrual
    Active infection or other serious underlying medical conditions not compatible with study entry
    History of significant neurological or psychiatric disorders including dementia that would prohibit the understanding and giving of informed consent
";

/// A single clinical trial to match against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrialDefinition {
    /// Registry identifier, for example `NCT05617742`.
    pub id: String,
    pub title: String,
    /// Eligibility statement with "Inclusion Criteria:" / "Exclusion Criteria:" headers.
    pub criteria: String,
}

impl TrialDefinition {
    /// The built-in demonstration trial.
    pub fn demo() -> Self {
        Self {
            id: DEMO_TRIAL_ID.into(),
            title: DEMO_TRIAL_TITLE.into(),
            criteria: DEMO_TRIAL_CRITERIA.into(),
        }
    }

    /// Parse a trial definition from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Translation`] naming the failing field when the YAML does not
    /// match the schema, and [`MatchError::InvalidInput`] when the identifier is blank.
    pub fn parse_yaml(yaml_text: &str) -> MatchResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let trial = match serde_path_to_error::deserialize::<_, TrialDefinition>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(MatchError::Translation(format!(
                    "Trial definition schema mismatch at {path}: {source}"
                )));
            }
        };

        if trial.id.trim().is_empty() {
            return Err(MatchError::InvalidInput("trial id cannot be empty".into()));
        }

        Ok(trial)
    }

    /// Read and parse a trial definition file.
    pub fn load(path: &Path) -> MatchResult<Self> {
        let text = std::fs::read_to_string(path).map_err(MatchError::FileRead)?;
        let trial = Self::parse_yaml(&text)?;
        tracing::info!(id = %trial.id, path = %path.display(), "loaded trial definition");
        Ok(trial)
    }

    /// Render the definition as YAML.
    pub fn to_yaml(&self) -> MatchResult<String> {
        serde_yaml::to_string(self).map_err(MatchError::YamlSerialization)
    }
}
