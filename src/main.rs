use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use ctm_core::constants::{DEFAULT_REST_ADDR, REST_ADDR_ENV, THRESHOLD_ENV, TRIAL_FILE_ENV};
use ctm_core::{MatchConfig, MatchService};

/// Main entry point for the trial matcher server
///
/// Resolves the matcher configuration once and serves the REST API with its Swagger UI.
///
/// # Environment Variables
/// - `CTM_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CTM_DEFAULT_THRESHOLD`: eligibility threshold in percent when a request gives none (default: 50)
/// - `CTM_TRIAL_FILE`: trial definition YAML (default: the built-in demonstration trial)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the threshold or trial file is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ctmatch_run=info".parse()?)
                .add_directive("ctm_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(MatchConfig::from_env_values(
        std::env::var(THRESHOLD_ENV).ok(),
        std::env::var(TRIAL_FILE_ENV).ok(),
    )?);
    tracing::info!(
        trial = %cfg.trial().id,
        threshold = cfg.default_threshold().get(),
        "matcher configured"
    );

    let rest_addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    tracing::info!("-- Starting trial matcher REST API on {}", rest_addr);

    let app = router(AppState::new(MatchService::new(cfg)));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
