use crate::connectors::factory;
use crate::connectors::registry::SourceRegistry;
use crate::connectors::{ProjectRecord, QueryParams};
use crate::constants::SERVICE_NAME;
use crate::error::ServiceError;
use crate::projects::store::ProjectStore;
use crate::projects::{validate_payload, Project, ProjectParams, User, UserParams};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SourceRegistry>,
    pub store: Arc<dyn ProjectStore>,
    /// Overall deadline for one connector dispatch, so a slow external
    /// registry cannot stall the request indefinitely.
    pub request_deadline: Duration,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::MissingSource | ServiceError::InvalidSource { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /connector/projects?source=<ID>&...`: validate the source against
/// the registry, dispatch to the matching fetcher, and serialize the
/// normalized listing.
async fn connector_projects(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    let source = match params.get("source") {
        Some(raw) => raw.to_uppercase(),
        None => return ServiceError::MissingSource.into_response(),
    };
    if !state.registry.is_registered(&source) {
        return ServiceError::InvalidSource {
            valid: state.registry.valid_sources().join(", "),
        }
        .into_response();
    }

    // Single error boundary: every dispatch-time failure (factory, fetch,
    // timeout) becomes a server error carrying the message.
    match dispatch(&state, &source, &params).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!("Connector dispatch for {} failed: {}", source, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn dispatch(
    state: &AppState,
    source: &str,
    params: &QueryParams,
) -> crate::error::Result<Vec<ProjectRecord>> {
    let connector = factory::create(source, &state.registry)?;
    match tokio::time::timeout(state.request_deadline, connector.fetch_projects(params)).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Fetch {
            message: format!(
                "{} did not respond within {}s",
                source,
                state.request_deadline.as_secs()
            ),
        }),
    }
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ServiceError> {
    Ok(Json(state.store.list_projects().await?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(acronym): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ServiceError> {
    let project = state
        .store
        .get_project(&acronym)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("project not found: {acronym}")))?;

    let mut body = serde_json::to_value(&project)?;
    if wants_include(&params, "creator") {
        let mut expanded = Vec::new();
        for username in &project.creator {
            if let Some(user) = state.store.get_user(username).await? {
                expanded.push(serde_json::to_value(user)?);
            }
        }
        body["creator"] = Value::Array(expanded);
    }
    Ok(Json(body).into_response())
}

fn wants_include(params: &QueryParams, relation: &str) -> bool {
    params
        .get("include")
        .map_or(false, |value| value.split(',').any(|p| p.trim() == relation))
}

async fn put_project(
    State(state): State<AppState>,
    Path(acronym): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ServiceError> {
    create_from_body(&state, acronym, body).await
}

async fn post_project(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ServiceError> {
    let acronym = body
        .get("acronym")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::Validation("acronym is required".to_string()))?
        .to_string();
    create_from_body(&state, acronym, body).await
}

async fn create_from_body(
    state: &AppState,
    acronym: String,
    body: Value,
) -> Result<Response, ServiceError> {
    validate_payload(&body)?;
    let params: ProjectParams = serde_json::from_value(body)?;
    let project = Project::from_params(acronym, params)?;
    let created = state.store.create_project(project).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn patch_project(
    State(state): State<AppState>,
    Path(acronym): Path<String>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ServiceError> {
    let params: ProjectParams = serde_json::from_value(body)
        .map_err(|e| ServiceError::Validation(format!("invalid project payload: {e}")))?;
    state.store.update_project(&acronym, params).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_project(
    State(state): State<AppState>,
    Path(acronym): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.store.delete_project(&acronym).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ServiceError> {
    let user = state
        .store
        .get_user(&username)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user not found: {username}")))?;
    Ok(Json(user))
}

async fn put_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(params): Json<UserParams>,
) -> Result<Response, ServiceError> {
    let user = state
        .store
        .create_user(User {
            username,
            email: params.email,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// Create the HTTP router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/connector/projects", get(connector_projects))
        .route("/projects", get(list_projects).post(post_project))
        .route(
            "/projects/:acronym",
            get(get_project)
                .put(put_project)
                .patch(patch_project)
                .delete(delete_project),
        )
        .route("/users/:username", get(get_user).put(put_user))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
