//! # API REST
//!
//! REST API for the clinical trial matcher.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for the wire types and `ctm-core` for matching.

#![warn(rust_2018_idioms)]

use api_shared::{
    HealthRes, HealthService, MatchReq, MatchRes, PatientReq, ProfileReq, ProfileRes,
    TrialProfileRes, TrialRes,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use ctm_core::{MatchError, MatchOutcome, MatchResult, MatchService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type ApiError = (StatusCode, String);

/// Application state shared across REST API handlers.
#[derive(Clone, Default)]
pub struct AppState {
    service: Arc<MatchService>,
}

impl AppState {
    pub fn new(service: MatchService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, trial, profile, match_patient),
    components(schemas(
        HealthRes,
        TrialRes,
        ProfileReq,
        ProfileRes,
        PatientReq,
        MatchReq,
        MatchRes,
        TrialProfileRes,
    ))
)]
struct ApiDoc;

/// Build the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trial", get(trial))
        .route("/trial/profile", post(profile))
        .route("/match", post(match_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map core errors onto HTTP status codes.
///
/// Validation failures are the caller's fault (400); criteria that cannot be evaluated are
/// well-formed but unprocessable (422).
fn reject(err: MatchError) -> ApiError {
    let status = match &err {
        MatchError::InvalidInput(_) | MatchError::Types(_) | MatchError::Translation(_) => {
            StatusCode::BAD_REQUEST
        }
        MatchError::MissingRequiredField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        MatchError::FileRead(_) | MatchError::YamlSerialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!("Match request error: {:?}", err);
    } else {
        tracing::warn!(%status, "rejected match request: {}", err);
    }
    (status, err.to_string())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancer checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/trial",
    responses(
        (status = 200, description = "Configured trial", body = TrialRes)
    )
)]
#[axum::debug_handler]
async fn trial(State(state): State<AppState>) -> Json<TrialRes> {
    Json(TrialRes::from(state.service.trial()))
}

#[utoipa::path(
    post,
    path = "/trial/profile",
    request_body = ProfileReq,
    responses(
        (status = 200, description = "Attribute profile of the criteria", body = ProfileRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Profile the given criteria text, or the configured trial when none is sent.
#[axum::debug_handler]
async fn profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileReq>,
) -> Result<Json<ProfileRes>, ApiError> {
    let profile = state.service.profile(req.criteria.as_deref());
    match ProfileRes::from_profile(&profile) {
        Ok(res) => Ok(Json(res)),
        Err(e) => {
            tracing::error!("Profile serialization error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/match",
    request_body = MatchReq,
    responses(
        (status = 200, description = "Match score and verdict", body = MatchRes),
        (status = 400, description = "Invalid patient record or threshold"),
        (status = 422, description = "Criteria cannot be evaluated")
    )
)]
/// Score a patient against the configured trial or the criteria in the request.
///
/// # Errors
/// Returns `400 Bad Request` if a patient field or the threshold is out of range, and
/// `422 Unprocessable Entity` if the inclusion criteria state no performance status levels.
#[axum::debug_handler]
async fn match_patient(
    State(state): State<AppState>,
    Json(req): Json<MatchReq>,
) -> Result<Json<MatchRes>, ApiError> {
    let evaluation_id = uuid::Uuid::new_v4().simple().to_string();
    let span = tracing::info_span!("match", %evaluation_id);

    let outcome = span.in_scope(|| evaluate(&state.service, req).map_err(reject))?;

    let evaluated_at = chrono::Utc::now().to_rfc3339();
    Ok(Json(MatchRes::from_outcome(&outcome, evaluation_id, evaluated_at)))
}

fn evaluate(service: &MatchService, req: MatchReq) -> MatchResult<MatchOutcome> {
    let threshold = req.threshold()?;
    let form = req.patient.into_form()?;
    service.evaluate(&form, req.criteria.as_deref(), threshold)
}
