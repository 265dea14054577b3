use axum::serve;
use fileset_preprocessor::api::handlers::AppState;
use fileset_preprocessor::api::routes::create_router;
use fileset_preprocessor::config::{AppConfig, StoreBackend};
use fileset_preprocessor::seed;
use fileset_preprocessor::store::{ContainmentQuery, InMemoryContainmentStore, PostgresContainmentStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    fileset_preprocessor::init_logging();

    println!("Fileset preprocessor: graph request batch rewriting");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{} store={:?} operations={:?}",
        config.server.host, config.server.port, config.store.backend, config.preprocess.operations
    );

    match config.store.backend {
        StoreBackend::Postgres => {
            println!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let store = PostgresContainmentStore::new(&database_url, config.max_connections()).await?;
            run_server(store, &config).await
        }
        StoreBackend::Memory => {
            let store = InMemoryContainmentStore::new();
            if config.store.load_seed_data {
                println!("Loading seed data...");
                seed::load_seed_data(&store);
                println!("Seed data loaded: {} containment links", store.link_count());
            }
            run_server(store, &config).await
        }
    }
}

async fn run_server<Q: ContainmentQuery + 'static>(store: Q, config: &AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(store, config.preprocess.operations.clone()));
    let app = create_router::<Q>()
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("Fileset preprocessor running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
