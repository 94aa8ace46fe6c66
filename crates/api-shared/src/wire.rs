//! JSON request and response bodies.
//!
//! Wire types keep primitive field types so that request validation happens in one place
//! (the conversions below) and produces readable error messages.

use ctm_core::{
    ComparableProfile, CriteriaProfile, DiagnosisLabel, MatchOutcome, MatchResult, PatientForm,
    Threshold, TrialDefinition,
};
use ctm_types::{PatientAge, PerformanceScore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Patient form as posted by a front end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatientReq {
    /// Age in years, 0-120.
    pub age: i64,
    /// One of "lung cancer", "leukemia", "malaria".
    pub diagnosis: String,
    /// Performance status, 0-4.
    pub performance_status: i64,
    #[serde(rename = "scheduled_for_FDG-PET", default)]
    pub scheduled_for_fdg_pet: bool,
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

impl PatientReq {
    /// Validate and convert into the core form record.
    pub fn into_form(self) -> MatchResult<PatientForm> {
        Ok(PatientForm {
            age: PatientAge::new(self.age)?,
            diagnosis: self.diagnosis.parse::<DiagnosisLabel>()?,
            scheduled_for_fdg_pet: self.scheduled_for_fdg_pet,
            performance_status: PerformanceScore::new(self.performance_status)?,
            pregnant: self.pregnant,
            lactating: self.lactating,
            malignant_pleural_effusion: self.malignant_pleural_effusion,
            irradiation: self.irradiation,
            active_infection: self.active_infection,
            neurological: self.neurological,
            psychiatric: self.psychiatric,
            consent: self.consent,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchReq {
    pub patient: PatientReq,
    /// Eligibility threshold in percent; the server default applies when omitted.
    #[serde(default)]
    pub threshold: Option<i64>,
    /// Eligibility text to match against instead of the configured trial.
    #[serde(default)]
    pub criteria: Option<String>,
}

impl MatchReq {
    pub fn threshold(&self) -> MatchResult<Option<Threshold>> {
        Ok(self.threshold.map(Threshold::new).transpose()?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrialProfileRes {
    pub inclusion: BTreeMap<String, bool>,
    pub exclusion: BTreeMap<String, bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchRes {
    pub evaluation_id: String,
    pub evaluated_at: String,
    pub percentage: f64,
    pub threshold: u8,
    /// "eligible" or "not eligible".
    pub verdict: String,
    /// Exclusion attribute that forced the score to zero.
    pub vetoed_by: Option<String>,
    pub patient_profile: BTreeMap<String, bool>,
    pub trial_profile: TrialProfileRes,
}

impl MatchRes {
    pub fn from_outcome(
        outcome: &MatchOutcome,
        evaluation_id: String,
        evaluated_at: String,
    ) -> Self {
        let evaluation = &outcome.evaluation;
        Self {
            evaluation_id,
            evaluated_at,
            percentage: outcome.percentage,
            threshold: outcome.threshold.get(),
            verdict: outcome.verdict.to_string(),
            vetoed_by: evaluation.score.vetoed_by.map(|a| a.to_string()),
            patient_profile: named(&evaluation.patient),
            trial_profile: TrialProfileRes {
                inclusion: named(&evaluation.trial.inclusion),
                exclusion: named(&evaluation.trial.exclusion),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfileReq {
    /// Eligibility text to profile instead of the configured trial.
    #[serde(default)]
    pub criteria: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfileRes {
    #[schema(value_type = Object)]
    pub inclusion: serde_json::Value,
    #[schema(value_type = Object)]
    pub exclusion: serde_json::Value,
}

impl ProfileRes {
    pub fn from_profile(profile: &CriteriaProfile) -> serde_json::Result<Self> {
        Ok(Self {
            inclusion: serde_json::to_value(&profile.inclusion)?,
            exclusion: serde_json::to_value(&profile.exclusion)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrialRes {
    pub id: String,
    pub title: String,
    pub criteria: String,
}

impl From<&TrialDefinition> for TrialRes {
    fn from(trial: &TrialDefinition) -> Self {
        Self {
            id: trial.id.clone(),
            title: trial.title.clone(),
            criteria: trial.criteria.clone(),
        }
    }
}

fn named(profile: &ComparableProfile) -> BTreeMap<String, bool> {
    profile
        .iter()
        .map(|(attribute, value)| (attribute.as_str().to_owned(), value))
        .collect()
}
