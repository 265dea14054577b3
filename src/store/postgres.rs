use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::logic::schema::QueryTemplate;
use crate::store::traits::ContainmentQuery;

#[derive(Debug, Clone)]
pub struct PostgresContainmentStore {
    pool: PgPool,
}

impl PostgresContainmentStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ContainmentQuery for PostgresContainmentStore {
    async fn projection(&self, template: &QueryTemplate, id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(template.sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to run containment query {}", template.name))?;

        Ok(ids)
    }
}
