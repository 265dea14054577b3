use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::PreprocessError;
use crate::logic::Preprocessor;
use crate::model::{OperationKind, Request};
use crate::store::traits::ContainmentQuery;

/// Shared state: the containment query service and the operation kinds to rewrite.
pub struct AppState<Q> {
    pub store: Q,
    pub operations: Vec<OperationKind>,
}

impl<Q: ContainmentQuery> AppState<Q> {
    pub fn new(store: Q, operations: Vec<OperationKind>) -> Self {
        Self { store, operations }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PreprocessRequest {
    pub requests: Vec<Request>,
}

#[derive(Debug, Serialize)]
pub struct PreprocessResponse {
    pub run_id: Uuid,
    pub requests: Vec<Request>,
    pub image_count: usize,
    pub container_count: usize,
    pub processed_at: String,
}

fn error_status(error: &PreprocessError) -> StatusCode {
    if error.is_invariant_violation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Rewrite a request batch so that no operation splits a fileset
pub async fn preprocess_batch<Q: ContainmentQuery>(
    State(state): State<Arc<AppState<Q>>>,
    Json(payload): Json<PreprocessRequest>,
) -> Result<Json<PreprocessResponse>, (StatusCode, Json<ErrorResponse>)> {
    let run_id = Uuid::new_v4();
    log::debug!("run {}: preprocessing {} request(s)", run_id, payload.requests.len());

    match Preprocessor::run_for(payload.requests, &state.store, &state.operations).await {
        Ok(preprocessor) => Ok(Json(PreprocessResponse {
            run_id,
            image_count: preprocessor.image_count(),
            container_count: preprocessor.container_count(),
            requests: preprocessor.into_requests(),
            processed_at: chrono::Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            let status = error_status(&e);
            // include the query service's cause, if any
            let message = format!("{:#}", anyhow::Error::new(e));
            log::warn!("run {}: preprocessing aborted: {}", run_id, message);
            Err((status, Json(ErrorResponse::new(&message))))
        }
    }
}
