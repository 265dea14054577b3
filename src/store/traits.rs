use anyhow::Result;

use crate::logic::schema::QueryTemplate;

/// Backing query service for containment lookups.
///
/// Each call runs one declared template with its single id parameter and
/// returns the ids of the related entities, one per result row.
#[async_trait::async_trait]
pub trait ContainmentQuery: Send + Sync {
    async fn projection(&self, template: &QueryTemplate, id: i64) -> Result<Vec<i64>>;
}
