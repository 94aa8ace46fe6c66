//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services, so
//! request handling never reads process-wide environment variables.

use crate::trial::TrialDefinition;
use crate::MatchResult;
use ctm_types::Threshold;
use std::path::PathBuf;

/// Matcher configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    default_threshold: Threshold,
    trial: TrialDefinition,
}

impl MatchConfig {
    pub fn new(default_threshold: Threshold, trial: TrialDefinition) -> Self {
        Self {
            default_threshold,
            trial,
        }
    }

    /// Build a configuration from raw environment values.
    ///
    /// Both values are optional; see [`threshold_from_env_value`] and
    /// [`trial_from_env_value`].
    pub fn from_env_values(
        threshold: Option<String>,
        trial_file: Option<String>,
    ) -> MatchResult<Self> {
        Ok(Self::new(
            threshold_from_env_value(threshold)?,
            trial_from_env_value(trial_file)?,
        ))
    }

    pub fn default_threshold(&self) -> Threshold {
        self.default_threshold
    }

    pub fn trial(&self) -> &TrialDefinition {
        &self.trial
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(Threshold::default(), TrialDefinition::demo())
    }
}

/// Parse the default eligibility threshold from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the built-in default of 50%.
pub fn threshold_from_env_value(value: Option<String>) -> MatchResult<Threshold> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<Threshold>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Resolve the trial definition from an optional file path value.
///
/// If `value` is `None` or empty/whitespace, returns the built-in demonstration trial.
pub fn trial_from_env_value(value: Option<String>) -> MatchResult<TrialDefinition> {
    let path = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    match path {
        Some(path) => TrialDefinition::load(&path),
        None => {
            tracing::debug!("no trial file configured; using the demonstration trial");
            Ok(TrialDefinition::demo())
        }
    }
}
