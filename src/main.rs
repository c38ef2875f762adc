use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use registry_core::constants::DEFAULT_PATIENT_DATA_DIR;
use registry_core::{CoreConfig, max_candidates_from_env_value};

/// Main entry point for the patient registry server
///
/// Starts the REST server on port 3000 (configurable via REGISTRY_REST_ADDR).
///
/// # Environment Variables
/// - `REGISTRY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `REGISTRY_MAX_CANDIDATES`: Candidates compared per duplicate check (default: 50)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry_run=info".parse()?)
                .add_directive("registry_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("REGISTRY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let patient_data_dir = PathBuf::from(
        std::env::var("PATIENT_DATA_DIR").unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into()),
    );
    let max_candidates =
        max_candidates_from_env_value(std::env::var("REGISTRY_MAX_CANDIDATES").ok())?;

    std::fs::create_dir_all(&patient_data_dir)?;
    let cfg = Arc::new(CoreConfig::new(patient_data_dir, max_candidates)?);

    tracing::info!(
        data_dir = %cfg.patient_data_dir().display(),
        max_candidates = cfg.max_candidates(),
        "++ Starting patient registry REST on {}",
        rest_addr
    );

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
