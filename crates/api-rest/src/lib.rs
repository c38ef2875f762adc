//! # API REST
//!
//! REST API for the patient registry.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! All intake decisions are made by [`registry_core::IntakeService`]; this crate maps its
//! outcomes onto HTTP.

#![warn(rust_2018_idioms)]

pub mod cache;
pub mod dto;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use registry_core::{
    CandidateLookup, CoreConfig, DemographicsRepository, IntakeError, IntakeService,
    StandardFieldValidator, ValidationOutcome,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

pub use cache::PatientListCache;
use dto::{
    CreatePatientReq, CreatePatientRes, DuplicatePatientsRes, ErrorRes, FieldErrorsRes, HealthRes,
    ListPatientsRes, PatientDto, SearchParams,
};

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    intake: IntakeService,
    repository: DemographicsRepository,
    list_cache: Arc<PatientListCache>,
}

impl AppState {
    /// Wires the file-backed repository, the standard validator and the list cache.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let repository = DemographicsRepository::new(cfg.clone());
        let list_cache = Arc::new(PatientListCache::new());
        let backend = Arc::new(repository.clone());

        let intake = IntakeService::new(
            cfg,
            Arc::new(StandardFieldValidator::new()),
            backend.clone(),
            backend,
        )
        .with_notifier(list_cache.clone());

        Self {
            intake,
            repository,
            list_cache,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_patients, create_patient, search_patients),
    components(schemas(
        HealthRes,
        PatientDto,
        CreatePatientReq,
        CreatePatientRes,
        FieldErrorsRes,
        DuplicatePatientsRes,
        ListPatientsRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/search", get(search_patients))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error response carrying a status code and a client-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes { error: self.message })).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Lookup(_) => Self::internal("duplicate check failed"),
            IntakeError::Persistence(_) | IntakeError::PersistenceInterrupted(_) => {
                Self::internal("failed to save patient")
            }
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Patient registry REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients, ordered by name", body = ListPatientsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Lists all patients, served from the cache when it is warm.
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Result<Json<ListPatientsRes>, ApiError> {
    if let Some(patients) = state.list_cache.get().await {
        return Ok(Json(ListPatientsRes::from(patients.as_slice())));
    }

    let generation = state.list_cache.generation().await;
    let repository = state.repository.clone();
    let patients = tokio::task::spawn_blocking(move || repository.list_patients())
        .await
        .map_err(|e| {
            tracing::error!("patient listing task failed: {}", e);
            ApiError::internal("failed to list patients")
        })?;

    let patients = state.list_cache.store(generation, patients).await;
    Ok(Json(ListPatientsRes::from(patients.as_slice())))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient saved", body = CreatePatientRes),
        (status = 400, description = "Malformed sex or date of birth", body = ErrorRes),
        (status = 409, description = "Possible duplicates found; nothing saved", body = DuplicatePatientsRes),
        (status = 422, description = "Field validation failed; nothing saved", body = FieldErrorsRes),
        (status = 500, description = "Lookup or storage failure", body = ErrorRes)
    )
)]
/// Adds a patient, holding the save when a possible duplicate already exists.
///
/// Send `flag_duplicates: false` to save regardless of duplicates.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> Result<Response, ApiError> {
    let flag_duplicates = req.flag_duplicates();
    let candidate = req.into_record().map_err(ApiError::bad_request)?;

    let response = match state.intake.submit(candidate, flag_duplicates).await? {
        ValidationOutcome::Saved(record) => (
            StatusCode::CREATED,
            Json(CreatePatientRes {
                patient: PatientDto::from(&record),
            }),
        )
            .into_response(),
        ValidationOutcome::FieldInvalid(field_errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(FieldErrorsRes { field_errors }),
        )
            .into_response(),
        ValidationOutcome::DuplicateFound(conflict) => (
            StatusCode::CONFLICT,
            Json(DuplicatePatientsRes {
                count: conflict.count(),
                matches: conflict.matched().iter().map(PatientDto::from).collect(),
            }),
        )
            .into_response(),
    };

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/patients/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Patients whose full name contains the query", body = ListPatientsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn search_patients(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let patients = state.repository.search(&params.name).await.map_err(|e| {
        tracing::error!("patient search failed: {}", e);
        ApiError::internal("failed to search patients")
    })?;
    Ok(Json(ListPatientsRes::from(patients.as_slice())))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app(patient_data_dir: &Path) -> Router {
        let cfg = Arc::new(
            CoreConfig::new(patient_data_dir.to_path_buf(), 50)
                .expect("CoreConfig::new should succeed"),
        );
        router(AppState::new(cfg))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("request should complete");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, body)
    }

    fn post_patient(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/patients")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_duplicate_is_held_until_forced() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());
        let john = json!({
            "given_name": "John",
            "family_name": "Smith",
            "date_of_birth": "2020-01-01"
        });

        let (status, body) = send(&app, post_patient(john.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let first_id = body["patient"]["id"].as_str().expect("id").to_string();

        let (status, body) = send(
            &app,
            post_patient(json!({
                "given_name": "  JOHN ",
                "family_name": "smith",
                "date_of_birth": "2020-01-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["count"], 1);
        assert_eq!(body["matches"][0]["id"], first_id.as_str());

        let mut forced = john;
        forced["flag_duplicates"] = json!(false);
        let (status, body) = send(&app, post_patient(forced)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_ne!(body["patient"]["id"], first_id.as_str());
    }

    #[tokio::test]
    async fn test_field_errors_return_422() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());

        let (status, body) = send(
            &app,
            post_patient(json!({ "given_name": "", "family_name": "Smith" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field_errors"]["givenName"], "Given name is required");

        let (_, body) = send(&app, get("/patients")).await;
        assert_eq!(body["patients"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_malformed_date_returns_400() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());

        let (status, body) = send(
            &app,
            post_patient(json!({
                "given_name": "John",
                "family_name": "Smith",
                "date_of_birth": "01/01/2020"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("date_of_birth"));
    }

    #[tokio::test]
    async fn test_patient_list_refreshes_after_save() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());

        let (status, body) = send(&app, get("/patients")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patients"].as_array().map(Vec::len), Some(0));

        let (status, _) = send(
            &app,
            post_patient(json!({ "given_name": "Alice", "family_name": "Jones" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, get("/patients")).await;
        assert_eq!(body["patients"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["patients"][0]["given_name"], "Alice");
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());

        for (given, family) in [("John", "Smith"), ("Jane", "Doe")] {
            send(
                &app,
                post_patient(json!({ "given_name": given, "family_name": family })),
            )
            .await;
        }

        let (status, body) = send(&app, get("/patients/search?name=john%20smith")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patients"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["patients"][0]["full_name"], "John Smith");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let app = test_app(temp_dir.path());

        let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/patients"].is_object());
        assert!(body["paths"]["/patients/search"].is_object());
    }
}
