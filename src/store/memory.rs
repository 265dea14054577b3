use anyhow::{anyhow, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashSet};

use crate::logic::schema::{Direction, QueryTemplate};
use crate::model::Target;
use crate::store::traits::ContainmentQuery;

/// Containment links held in memory. Answers any template by walking the
/// stored `(container, contained)` pairs and keeps a log of issued queries.
#[derive(Debug, Default)]
pub struct InMemoryContainmentStore {
    links: RwLock<BTreeSet<(Target, Target)>>,
    issued: Mutex<Vec<(&'static str, i64)>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryContainmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `container` directly contains `contained`.
    pub fn link(&self, container: Target, contained: Target) {
        self.links.write().insert((container, contained));
    }

    pub fn link_all(&self, container: Target, contained: impl IntoIterator<Item = Target>) {
        let mut links = self.links.write();
        for target in contained {
            links.insert((container, target));
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.read().len()
    }

    /// Make every later projection of the named template fail.
    pub fn fail_on(&self, template_name: &str) {
        self.failing.write().insert(template_name.to_string());
    }

    pub fn query_count(&self) -> usize {
        self.issued.lock().len()
    }

    /// Ids the named template was issued with, in issue order.
    pub fn queries_for(&self, template_name: &str) -> Vec<i64> {
        self.issued
            .lock()
            .iter()
            .filter(|(name, _)| *name == template_name)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn issued_queries(&self) -> Vec<(&'static str, i64)> {
        self.issued.lock().clone()
    }

    pub fn reset_queries(&self) {
        self.issued.lock().clear();
    }
}

#[async_trait::async_trait]
impl ContainmentQuery for InMemoryContainmentStore {
    async fn projection(&self, template: &QueryTemplate, id: i64) -> Result<Vec<i64>> {
        self.issued.lock().push((template.name, id));

        if self.failing.read().contains(template.name) {
            return Err(anyhow!("query {} unavailable", template.name));
        }

        let from = Target::new(template.from, id);
        let links = self.links.read();
        let ids = match template.direction {
            Direction::Contained => links
                .iter()
                .filter(|(container, contained)| *container == from && contained.is_kind(template.to))
                .map(|(_, contained)| contained.id)
                .collect(),
            Direction::Container => links
                .iter()
                .filter(|(container, contained)| *contained == from && container.is_kind(template.to))
                .map(|(container, _)| container.id)
                .collect(),
        };
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::schema::ContainmentSchema;
    use crate::model::EntityKind;

    #[tokio::test]
    async fn test_projection_follows_template_direction() {
        let store = InMemoryContainmentStore::new();
        let well = Target::new(EntityKind::Well, 4);
        store.link_all(well, [Target::image(1), Target::image(2)]);
        store.link(Target::new(EntityKind::Plate, 9), well);

        let schema = ContainmentSchema::standard();
        let down = schema.template(EntityKind::Well, EntityKind::Image).unwrap();
        let up = schema.template(EntityKind::Well, EntityKind::Plate).unwrap();
        let image_up = schema.template(EntityKind::Image, EntityKind::Well).unwrap();

        assert_eq!(store.projection(down, 4).await.unwrap(), vec![1, 2]);
        assert_eq!(store.projection(up, 4).await.unwrap(), vec![9]);
        assert_eq!(store.projection(image_up, 2).await.unwrap(), vec![4]);
        assert_eq!(store.query_count(), 3);
        assert_eq!(store.queries_for("well_images"), vec![4]);
    }

    #[tokio::test]
    async fn test_failing_template() {
        let store = InMemoryContainmentStore::new();
        store.fail_on("plate_wells");
        let schema = ContainmentSchema::standard();
        let template = schema.template(EntityKind::Plate, EntityKind::Well).unwrap();

        assert!(store.projection(template, 1).await.is_err());
        // failed attempts still count as issued
        assert_eq!(store.issued_queries(), vec![("plate_wells", 1)]);
        store.reset_queries();
        assert_eq!(store.query_count(), 0);
    }
}
