pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export error types
pub use error::{PreprocessError, Result};

// Export logic types
pub use logic::{
    ContainmentCache, ContainmentEdge, ContainmentSchema, FilesetReconciler, FilesetRewrite,
    Preprocessor, QueryTemplate, ReferencedTargets, RequestTransformer, TargetCollector,
};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{ContainmentQuery, InMemoryContainmentStore, PostgresContainmentStore};

/// Initialise logging with an `info` default, keeping sqlx quiet.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("sqlx", log::LevelFilter::Warn)
        .try_init();
}
