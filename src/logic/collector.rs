use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::logic::cache::ContainmentCache;
use crate::model::{EntityKind, OperationKind, Request, Target};
use crate::store::traits::ContainmentQuery;

/// Targets a batch touches for one operation kind, directly or through
/// containment, grouped by entity kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferencedTargets {
    by_kind: BTreeMap<EntityKind, BTreeSet<Target>>,
}

impl ReferencedTargets {
    pub fn insert(&mut self, target: Target) {
        self.by_kind.entry(target.kind).or_default().insert(target);
    }

    pub fn of_kind(&self, kind: EntityKind) -> BTreeSet<Target> {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }

    pub fn images(&self) -> BTreeSet<Target> {
        self.of_kind(EntityKind::Image)
    }

    pub fn contains(&self, target: &Target) -> bool {
        self.by_kind
            .get(&target.kind)
            .map_or(false, |targets| targets.contains(target))
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct TargetCollector;

impl TargetCollector {
    /// Collect the targets of the `kind` requests in `requests`, expand them
    /// down the containment hierarchy, and make sure the fileset of every
    /// reached image is cached.
    pub async fn collect<Q: ContainmentQuery + ?Sized>(
        requests: &[Request],
        kind: OperationKind,
        cache: &mut ContainmentCache,
        query: &Q,
    ) -> Result<ReferencedTargets> {
        let mut targets = Self::direct_targets(requests, kind);

        // one pass suffices: each container kind is complete before it is expanded
        for edge in cache.schema().hierarchy() {
            for container in targets.of_kind(edge.container) {
                cache.lookup_contained(query, edge.contained, container).await?;
                for contained in cache.contained(&container) {
                    if contained.is_kind(edge.contained) {
                        targets.insert(contained);
                    }
                }
            }
        }

        for image in targets.images() {
            cache.lookup_container(query, EntityKind::Fileset, image).await?;
        }

        Ok(targets)
    }

    /// Targets named by `kind` requests. Requests on unknown entity kinds are skipped.
    pub fn direct_targets(requests: &[Request], kind: OperationKind) -> ReferencedTargets {
        let mut targets = ReferencedTargets::default();
        for target in requests.iter().filter_map(|request| request.relevant_target(kind)) {
            targets.insert(target);
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Delete;
    use crate::store::memory::InMemoryContainmentStore;

    fn project(id: i64) -> Target {
        Target::new(EntityKind::Project, id)
    }

    fn dataset(id: i64) -> Target {
        Target::new(EntityKind::Dataset, id)
    }

    fn fixture() -> InMemoryContainmentStore {
        let store = InMemoryContainmentStore::new();
        store.link_all(project(1), [dataset(10), dataset(11)]);
        store.link_all(dataset(10), [Target::image(100), Target::image(101)]);
        store.link(dataset(11), Target::image(102));
        store.link_all(Target::fileset(500), [Target::image(100), Target::image(101)]);
        store.link(Target::new(EntityKind::Screen, 2), Target::new(EntityKind::Plate, 20));
        store.link(Target::new(EntityKind::Plate, 20), Target::new(EntityKind::Well, 200));
        store.link(Target::new(EntityKind::Well, 200), Target::image(300));
        store
    }

    #[test]
    fn test_direct_targets_skip_other_operations_and_unknown_kinds() {
        let requests = vec![
            Request::delete(Target::image(1)),
            Request::chgrp(Target::image(2), 7),
            Request::other("chmod"),
            Request::Delete(Delete {
                target_type: "/Roi".to_string(),
                id: 3,
                options: Default::default(),
            }),
            Request::delete(dataset(4)),
        ];

        let targets = TargetCollector::direct_targets(&requests, OperationKind::Delete);

        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&Target::image(1)));
        assert!(targets.contains(&dataset(4)));
        assert!(!targets.contains(&Target::image(2)));
    }

    #[tokio::test]
    async fn test_project_reference_reaches_images() {
        let store = fixture();
        let mut cache = ContainmentCache::new();
        let requests = vec![Request::delete(project(1))];

        let targets = TargetCollector::collect(&requests, OperationKind::Delete, &mut cache, &store)
            .await
            .unwrap();

        assert_eq!(targets.of_kind(EntityKind::Dataset), BTreeSet::from([dataset(10), dataset(11)]));
        assert_eq!(
            targets.images(),
            BTreeSet::from([Target::image(100), Target::image(101), Target::image(102)])
        );
        // filesets are cached but not themselves referenced
        assert!(!targets.contains(&Target::fileset(500)));
        assert_eq!(
            cache.containers_of_kind(&Target::image(100), EntityKind::Fileset),
            vec![Target::fileset(500)]
        );
    }

    #[tokio::test]
    async fn test_screen_reference_reaches_well_images() {
        let store = fixture();
        let mut cache = ContainmentCache::new();
        let requests = vec![Request::chgrp(Target::new(EntityKind::Screen, 2), 3)];

        let targets = TargetCollector::collect(&requests, OperationKind::Chgrp, &mut cache, &store)
            .await
            .unwrap();

        assert!(targets.contains(&Target::new(EntityKind::Plate, 20)));
        assert!(targets.contains(&Target::new(EntityKind::Well, 200)));
        assert_eq!(targets.images(), BTreeSet::from([Target::image(300)]));
    }

    #[tokio::test]
    async fn test_fileset_reference_reaches_its_images() {
        let store = fixture();
        let mut cache = ContainmentCache::new();
        let requests = vec![Request::delete(Target::fileset(500))];

        let targets = TargetCollector::collect(&requests, OperationKind::Delete, &mut cache, &store)
            .await
            .unwrap();

        assert_eq!(targets.images(), BTreeSet::from([Target::image(100), Target::image(101)]));
    }

    #[tokio::test]
    async fn test_batch_without_relevant_requests_issues_no_queries() {
        let store = fixture();
        let mut cache = ContainmentCache::new();
        let requests = vec![Request::other("chmod"), Request::chgrp(project(1), 2)];

        let targets = TargetCollector::collect(&requests, OperationKind::Delete, &mut cache, &store)
            .await
            .unwrap();

        assert!(targets.is_empty());
        assert_eq!(store.query_count(), 0);
    }
}
