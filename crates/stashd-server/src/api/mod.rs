mod links;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use stashd_core::ContentStore;
use stashd_pipeline::{IngestError, IngestGate};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub gate: Arc<IngestGate>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "busy" | "shutting_down" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Resolves the acting user from the `x-user-id` header.
///
/// Authentication is out of scope here; the gateway in front of this
/// service owns it and forwards the verified user ID.
pub(super) fn require_user_id(headers: &HeaderMap, request_id: &str) -> Result<Uuid, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| {
            ApiError::new(
                request_id.to_owned(),
                "bad_request",
                "x-user-id header must carry a valid UUID",
            )
        })
}

pub(super) fn map_ingest_error(request_id: String, error: &IngestError) -> ApiError {
    match error {
        IngestError::InvalidUrl(reason) => {
            ApiError::new(request_id, "validation_error", reason.clone())
        }
        IngestError::Busy => ApiError::new(
            request_id,
            "busy",
            "processing queue is full, try again later",
        ),
        IngestError::ShuttingDown => {
            ApiError::new(request_id, "shutting_down", "service is shutting down")
        }
        IngestError::Store(err) => {
            tracing::error!(error = %err, "submission failed in the store");
            ApiError::new(request_id, "internal_error", "storage failure")
        }
    }
}

pub(super) fn map_store_error(request_id: String, error: &stashd_core::StoreError) -> ApiError {
    match error {
        stashd_core::StoreError::NotFound => {
            ApiError::new(request_id, "not_found", "link not found")
        }
        other => {
            tracing::error!(error = %other, "store query failed");
            ApiError::new(request_id, "internal_error", "storage failure")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-user-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/links", post(links::submit_link))
        .route("/api/v1/links/{link_id}", get(links::view_link))
        .route("/api/v1/links/{link_id}/confirm", patch(links::confirm_link))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    // A point read is enough to prove the backend answers.
    match state.store.content(Uuid::nil()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    store: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        store: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}
