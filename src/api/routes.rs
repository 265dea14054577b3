use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{self, AppState};
use crate::store::traits::ContainmentQuery;

pub fn create_router<Q: ContainmentQuery + 'static>() -> Router<Arc<AppState<Q>>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Batch rewriting
        .route("/preprocess", post(handlers::preprocess_batch::<Q>))
}
