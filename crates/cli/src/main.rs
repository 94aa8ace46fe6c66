use anyhow::Context;
use clap::{Parser, Subcommand};
use ctm_core::{
    config::{threshold_from_env_value, trial_from_env_value},
    patient::extract_patient_profile,
    Category, DiagnosisLabel, MatchConfig, MatchService, PatientForm, Threshold, TrialDefinition,
};
use ctm_types::{PatientAge, PerformanceScore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ctm")]
#[command(about = "Clinical trial matcher CLI")]
struct Cli {
    /// Trial definition YAML (defaults to CTM_TRIAL_FILE, then the demonstration trial)
    #[arg(long, global = true)]
    trial: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the trial's inclusion and exclusion lines
    Split,
    /// Show the attribute profile derived from the trial's criteria
    Profile,
    /// Score a patient against the trial
    Match {
        /// Patient record YAML; when given, the patient flags below are ignored
        #[arg(long)]
        patient: Option<PathBuf>,
        /// Eligibility threshold in percent (defaults to CTM_DEFAULT_THRESHOLD, then 50)
        #[arg(long)]
        threshold: Option<Threshold>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Build a patient record from a free-text description
    ExtractPatient {
        /// Description such as "a 64-year-old diagnosed with lung cancer..."
        text: String,
    },
}

/// Patient form fields given as flags.
#[derive(clap::Args)]
struct FormArgs {
    /// Patient age in years (0-120)
    #[arg(long, default_value = "0")]
    age: PatientAge,
    /// Diagnosis: "lung cancer", "leukemia" or "malaria"
    #[arg(long, default_value = "lung cancer")]
    diagnosis: DiagnosisLabel,
    /// Performance status (0-4)
    #[arg(long, default_value = "0")]
    performance_status: PerformanceScore,
    #[arg(long)]
    fdg_pet: bool,
    #[arg(long)]
    pregnant: bool,
    #[arg(long)]
    lactating: bool,
    #[arg(long)]
    malignant_pleural_effusion: bool,
    #[arg(long)]
    irradiation: bool,
    #[arg(long)]
    active_infection: bool,
    #[arg(long)]
    neurological: bool,
    #[arg(long)]
    psychiatric: bool,
    #[arg(long)]
    consent: bool,
}

impl FormArgs {
    fn into_form(self) -> PatientForm {
        PatientForm {
            age: self.age,
            diagnosis: self.diagnosis,
            scheduled_for_fdg_pet: self.fdg_pet,
            performance_status: self.performance_status,
            pregnant: self.pregnant,
            lactating: self.lactating,
            malignant_pleural_effusion: self.malignant_pleural_effusion,
            irradiation: self.irradiation,
            active_infection: self.active_infection,
            neurological: self.neurological,
            psychiatric: self.psychiatric,
            consent: self.consent,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let trial = match cli.trial {
        Some(path) => TrialDefinition::load(&path)?,
        None => trial_from_env_value(std::env::var(ctm_core::constants::TRIAL_FILE_ENV).ok())?,
    };
    let default_threshold =
        threshold_from_env_value(std::env::var(ctm_core::constants::THRESHOLD_ENV).ok())?;
    let service = MatchService::new(Arc::new(MatchConfig::new(default_threshold, trial)));

    match cli.command {
        Some(Commands::Split) => {
            let criteria = service.split(None);
            println!("Trial: {} ({})", service.trial().title, service.trial().id);
            for category in Category::ALL {
                println!("{category}:");
                for line in criteria.lines(category) {
                    println!("  - {line}");
                }
            }
        }
        Some(Commands::Profile) => {
            print!("{}", profile_report(&service)?);
        }
        Some(Commands::Match {
            patient,
            threshold,
            form,
        }) => {
            let form = match patient {
                Some(path) => PatientForm::parse_yaml(&std::fs::read_to_string(&path)?)?,
                None => form.into_form(),
            };
            print!("{}", match_report(&service, &form, threshold)?);
        }
        Some(Commands::ExtractPatient { text }) => {
            let record = extract_patient_profile(&text);
            print!("{}", serde_yaml::to_string(&record)?);
        }
        None => {
            println!("Use 'ctm --help' for commands");
        }
    }

    Ok(())
}

/// YAML rendering of the trial profile, grouped by category.
fn profile_report(service: &MatchService) -> anyhow::Result<String> {
    let profile = service.profile(None);
    let mut out = String::new();
    for category in Category::ALL {
        out.push_str(&format!("{category}:\n"));
        let record = serde_yaml::to_string(profile.record(category))?;
        for line in record.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    Ok(out)
}

/// Score `form` against the configured trial and render the result.
///
/// A trial whose criteria cannot be evaluated is an error, so the process exits non-zero.
fn match_report(
    service: &MatchService,
    form: &PatientForm,
    threshold: Option<Threshold>,
) -> anyhow::Result<String> {
    let outcome = service
        .evaluate(form, None, threshold)
        .with_context(|| format!("Error matching patient against {}", service.trial().id))?;

    let mut out = format!(
        "The patient match score for {} is {:.1}% ({}, threshold {}%)\n",
        service.trial().id,
        outcome.percentage,
        outcome.verdict,
        outcome.threshold
    );
    if let Some(attribute) = outcome.evaluation.score.vetoed_by {
        out.push_str(&format!("Excluded by: {attribute}\n"));
    }
    out.push_str("Patient profile:\n");
    out.push_str(&serde_yaml::to_string(&outcome.evaluation.patient)?);
    out.push_str("Trial profile:\n");
    out.push_str(&serde_yaml::to_string(&outcome.evaluation.trial)?);
    Ok(out)
}
