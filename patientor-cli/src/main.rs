use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use patientor_api::{
    ensure_patient_details, load_diagnoses, load_patient_list, submit_new_entry, HttpPatientApi,
    SubmitOutcome,
};
use patientor_core::config::DEFAULT_API_BASE_URL;
use patientor_core::{
    render_entry, ClientConfig, Discharge, EntryFormValues, EntryType, PatientPage, SickLeave,
    Store,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "patientor", about = "Browse patients and add medical entries.")]
struct Cli {
    /// Base URL of the patient API.
    #[arg(long, env = "PATIENTOR_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all patients
    Patients,
    /// Show one patient with entries
    Show {
        /// Patient id
        id: String,
    },
    /// List known diagnosis codes
    Diagnoses,
    /// Add an entry to a patient
    AddEntry(AddEntryArgs),
}

#[derive(Args, Debug)]
struct AddEntryArgs {
    /// Patient id
    id: String,

    /// Read the form values from a JSON file instead of the flags below.
    #[arg(long, conflicts_with = "kind")]
    from_json: Option<PathBuf>,

    #[arg(long = "type", value_enum, default_value_t = EntryKindArg::Hospital)]
    kind: EntryKindArg,

    /// Entry date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    date: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "")]
    specialist: String,

    /// Diagnosis code, repeatable
    #[arg(long = "diagnosis-code")]
    diagnosis_codes: Vec<String>,

    #[arg(long, default_value = "")]
    discharge_date: String,

    #[arg(long, default_value = "")]
    discharge_criteria: String,

    /// Health check rating, 0 (healthy) to 3 (critical risk)
    #[arg(long)]
    rating: Option<u8>,

    #[arg(long, default_value = "")]
    employer: String,

    #[arg(long, default_value = "")]
    sick_leave_start: String,

    #[arg(long, default_value = "")]
    sick_leave_end: String,

    /// Validate and print the request body without sending it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EntryKindArg {
    Hospital,
    HealthCheck,
    OccupationalHealthcare,
}

impl From<EntryKindArg> for EntryType {
    fn from(kind: EntryKindArg) -> Self {
        match kind {
            EntryKindArg::Hospital => EntryType::Hospital,
            EntryKindArg::HealthCheck => EntryType::HealthCheck,
            EntryKindArg::OccupationalHealthcare => EntryType::OccupationalHealthcare,
        }
    }
}

impl AddEntryArgs {
    fn form_values(&self) -> anyhow::Result<EntryFormValues> {
        if let Some(path) = &self.from_json {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read file {path:?}"))?;
            return serde_json::from_str(&data)
                .with_context(|| format!("Invalid form values in {path:?}"));
        }

        let defaults = EntryFormValues::default();
        Ok(EntryFormValues {
            entry_type: self.kind.into(),
            date: self.date.clone(),
            description: self.description.clone(),
            specialist: self.specialist.clone(),
            diagnosis_codes: self.diagnosis_codes.clone(),
            discharge: Discharge {
                date: self.discharge_date.clone(),
                criteria: self.discharge_criteria.clone(),
            },
            health_check_rating: self.rating.map(i64::from).or(defaults.health_check_rating),
            sick_leave: SickLeave {
                start_date: self.sick_leave_start.clone(),
                end_date: self.sick_leave_end.clone(),
            },
            employer_name: self.employer.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::with_base_url(&cli.api_url);
    let api = HttpPatientApi::new(&config);
    let mut store = Store::new();

    match cli.command {
        Command::Patients => {
            load_patient_list(&api, &mut store)
                .await
                .context("Cannot load patients")?;
            for patient in store.patients_sorted() {
                println!(
                    "{}\t{}\t{:?}\t{}",
                    patient.id, patient.name, patient.gender, patient.occupation
                );
            }
        }
        Command::Diagnoses => {
            load_diagnoses(&api, &mut store)
                .await
                .context("Cannot load diagnoses")?;
            for diagnosis in store.diagnoses_sorted() {
                match &diagnosis.latin {
                    Some(latin) => println!("{}\t{} ({latin})", diagnosis.code, diagnosis.name),
                    None => println!("{}\t{}", diagnosis.code, diagnosis.name),
                }
            }
        }
        Command::Show { id } => {
            load_diagnoses(&api, &mut store)
                .await
                .context("Cannot load diagnoses")?;
            ensure_patient_details(&api, &mut store, &id)
                .await
                .with_context(|| format!("Cannot load patient {id}"))?;
            print_patient(&store, &PatientPage::new(id))?;
        }
        Command::AddEntry(args) => {
            let values = args.form_values()?;
            if args.dry_run {
                let entry = values.to_new_entry()?;
                println!("{}", serde_json::to_string_pretty(&entry)?);
                return Ok(());
            }

            load_diagnoses(&api, &mut store)
                .await
                .context("Cannot load diagnoses")?;
            let mut page = PatientPage::new(args.id.clone());
            page.open_modal();
            match submit_new_entry(&api, &mut store, &mut page, &values).await {
                SubmitOutcome::Added => print_patient(&store, &page)?,
                SubmitOutcome::Invalid(errors) => {
                    for (path, message) in errors.paths() {
                        eprintln!("{path}: {message}");
                    }
                    bail!("Entry form is invalid");
                }
                SubmitOutcome::Failed(message) => bail!("Cannot add entry: {message}"),
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise info for the patientor crates.
fn log_filter(rust_log: Option<&str>) -> tracing_subscriber::EnvFilter {
    rust_log
        .and_then(|directives| tracing_subscriber::EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("patientor=info"))
}

fn print_patient(store: &Store, page: &PatientPage) -> anyhow::Result<()> {
    let Some(patient) = page.resolve(store) else {
        bail!("Unknown patient {}", page.patient_id());
    };

    println!("{} ({})", patient.name, patient.gender.icon());
    println!("ssn: {}", patient.ssn.as_deref().unwrap_or("-"));
    println!("occupation: {}", patient.occupation);
    if let Some(age) = patient.age_on(Utc::now().date_naive()) {
        println!("age: {age}");
    }

    if patient.entries().is_empty() {
        println!("\nNo entries");
    }
    for entry in patient.entries() {
        println!("\n{}", render_entry(entry, store.diagnoses()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_entry_args(argv: &[&str]) -> AddEntryArgs {
        let cli = Cli::try_parse_from(argv).expect("arguments parse");
        match cli.command {
            Command::AddEntry(args) => args,
            other => panic!("expected add-entry, got {other:?}"),
        }
    }

    #[test]
    fn flags_build_health_check_values() {
        let args = add_entry_args(&[
            "patientor",
            "add-entry",
            "d2773598",
            "--type",
            "health-check",
            "--date",
            "2019-10-20",
            "--description",
            "Yearly control visit.",
            "--rating",
            "2",
            "--diagnosis-code",
            "Z57.1",
            "--diagnosis-code",
            "M24.2",
        ]);
        let values = args.form_values().expect("values");

        assert_eq!(values.entry_type, EntryType::HealthCheck);
        assert_eq!(values.health_check_rating, Some(2));
        assert_eq!(values.diagnosis_codes, ["Z57.1", "M24.2"]);
        assert!(values.validate().is_empty());
    }

    #[test]
    fn missing_flags_surface_as_form_errors() {
        let args = add_entry_args(&["patientor", "add-entry", "d2773598"]);
        let errors = args.form_values().expect("values").validate();

        assert_eq!(errors.get("date"), Some("Field is required"));
        assert_eq!(errors.get("discharge.criteria"), Some("Field is required"));
    }

    #[test]
    fn rust_log_replaces_the_default_filter() {
        assert_eq!(log_filter(Some("patientor=debug")).to_string(), "patientor=debug");
        assert_eq!(log_filter(None).to_string(), "patientor=info");
    }

    #[test]
    fn api_url_defaults_to_local_server() {
        let cli = Cli::try_parse_from(["patientor", "patients"]).expect("arguments parse");
        if std::env::var_os("PATIENTOR_API_URL").is_none() {
            assert_eq!(cli.api_url, DEFAULT_API_BASE_URL);
        }
    }
}
