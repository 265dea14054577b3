use anyhow::{bail, Context, Result};
use fileset_preprocessor::config::{AppConfig, StoreBackend};
use fileset_preprocessor::logic::Preprocessor;
use fileset_preprocessor::model::Request;
use fileset_preprocessor::seed;
use fileset_preprocessor::store::{ContainmentQuery, InMemoryContainmentStore, PostgresContainmentStore};

/// Read a JSON array of requests from `path`
fn read_batch(path: &str) -> Result<Vec<Request>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let requests: Vec<Request> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse request batch in {}", path))?;
    Ok(requests)
}

async fn preprocess<Q: ContainmentQuery>(requests: Vec<Request>, store: &Q, config: &AppConfig) -> Result<()> {
    let preprocessor = Preprocessor::run_for(requests, store, &config.preprocess.operations)
        .await
        .context("Preprocessing aborted")?;

    eprintln!(
        "Resolved {} image(s) and {} container(s)",
        preprocessor.image_count(),
        preprocessor.container_count()
    );
    println!("{}", serde_json::to_string_pretty(&preprocessor.requests())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fileset_preprocessor::init_logging();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: preprocess-batch <requests.json>");
    };
    let requests = read_batch(&path)?;
    let config = AppConfig::load()?;

    match config.store.backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url()?;
            let store = PostgresContainmentStore::new(&database_url, config.max_connections()).await?;
            preprocess(requests, &store, &config).await
        }
        StoreBackend::Memory => {
            let store = InMemoryContainmentStore::new();
            if config.store.load_seed_data {
                seed::load_seed_data(&store);
            }
            preprocess(requests, &store, &config).await
        }
    }
}
