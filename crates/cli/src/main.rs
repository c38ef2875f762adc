use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use registry_core::{
    max_candidates_from_env_value, CandidateLookup, CoreConfig, DemographicsRepository,
    IntakeService, PatientRecord, Sex, StandardFieldValidator, ValidationOutcome,
};
use registry_core::constants::DEFAULT_PATIENT_DATA_DIR;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Patient registry CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a patient, refusing possible duplicates unless forced
    Add {
        /// Given name
        given_name: String,
        /// Family name
        family_name: String,
        /// Sex (male, female, other, unknown)
        #[arg(long)]
        sex: Option<Sex>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        dob: Option<NaiveDate>,
        /// Save even if possible duplicates exist
        #[arg(long)]
        force: bool,
    },
    /// Search patients by name
    Search {
        /// Part of the full name; case and spacing are ignored
        name: String,
    },
    /// List all patients
    List,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn format_patient(record: &PatientRecord) -> String {
    let id = record.id.as_ref().map(|id| id.as_str()).unwrap_or("-");
    let dob = record
        .date_of_birth
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".into());
    let sex = record.sex.map(|s| s.as_str()).unwrap_or("unknown");
    format!(
        "ID: {}, Name: {}, DOB: {}, Sex: {}",
        id,
        record.full_name(),
        dob,
        sex
    )
}

fn load_config() -> Result<Arc<CoreConfig>, Box<dyn std::error::Error>> {
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into());
    let max_candidates =
        max_candidates_from_env_value(std::env::var("REGISTRY_MAX_CANDIDATES").ok())?;
    Ok(Arc::new(CoreConfig::new(
        PathBuf::from(patient_data_dir),
        max_candidates,
    )?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Add {
            given_name,
            family_name,
            sex,
            dob,
            force,
        }) => {
            let cfg = load_config()?;
            let repository = Arc::new(DemographicsRepository::new(cfg.clone()));
            let intake = IntakeService::new(
                cfg,
                Arc::new(StandardFieldValidator::new()),
                repository.clone(),
                repository,
            );

            let mut candidate = PatientRecord::new(given_name, family_name);
            candidate.sex = sex;
            candidate.date_of_birth = dob;

            match intake.submit(candidate, !force).await? {
                ValidationOutcome::Saved(record) => {
                    println!("Saved patient {}", format_patient(&record));
                }
                ValidationOutcome::FieldInvalid(errors) => {
                    for (field, message) in &errors {
                        eprintln!("{field}: {message}");
                    }
                    return Err("patient not saved: invalid fields".into());
                }
                ValidationOutcome::DuplicateFound(conflict) => {
                    eprintln!("Found {} possible duplicate(s):", conflict.count());
                    for record in conflict.matched() {
                        eprintln!("  {}", format_patient(record));
                    }
                    return Err("patient not saved: rerun with --force to save anyway".into());
                }
            }
        }
        Some(Commands::Search { name }) => {
            let repository = DemographicsRepository::new(load_config()?);
            let patients = repository.search(&name).await?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in &patients {
                    println!("{}", format_patient(patient));
                }
            }
        }
        Some(Commands::List) => {
            let repository = DemographicsRepository::new(load_config()?);
            let patients = repository.list_patients();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in &patients {
                    println!("{}", format_patient(patient));
                }
            }
        }
        None => {
            println!("Use 'registry --help' for commands");
        }
    }

    Ok(())
}
