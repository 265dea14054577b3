use log::debug;
use std::collections::BTreeSet;

use crate::error::{PreprocessError, Result};
use crate::logic::cache::ContainmentCache;
use crate::logic::collector::ReferencedTargets;
use crate::model::{EntityKind, Target};

/// Replacement of a fileset's image requests by one request on the fileset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesetRewrite {
    pub fileset: Target,
    /// Targets whose first request must be preceded by the fileset request.
    pub prohibited_prefixes: BTreeSet<Target>,
    /// Targets whose requests are dropped once the fileset request is in place.
    pub prohibited_suffixes: BTreeSet<Target>,
}

/// Finds the filesets whose images are all referenced by a batch.
pub struct FilesetReconciler<'a> {
    cache: &'a ContainmentCache,
}

impl<'a> FilesetReconciler<'a> {
    pub fn new(cache: &'a ContainmentCache) -> Self {
        Self { cache }
    }

    /// Plan one rewrite per multi-image fileset that `targets` references completely.
    ///
    /// Expects the fileset of every referenced image to be cached already, as
    /// [`TargetCollector::collect`](crate::logic::TargetCollector::collect) leaves it.
    pub fn reconcile(&self, targets: &ReferencedTargets) -> Result<Vec<FilesetRewrite>> {
        let referenced = targets.images();
        let mut remaining = referenced.clone();
        let mut rewrites = Vec::new();

        while let Some(image) = remaining.pop_first() {
            let filesets = self.cache.containers_of_kind(&image, EntityKind::Fileset);
            let fileset = match filesets.len() {
                0 => continue, // image predates filesets
                1 => filesets[0],
                _ => {
                    return Err(PreprocessError::MultipleFilesets { image, filesets });
                }
            };

            let members = self.cache.contained(&fileset);
            for member in &members {
                if !member.is_kind(EntityKind::Image) {
                    return Err(PreprocessError::NonImageInFileset {
                        fileset,
                        member: *member,
                    });
                }
                // siblings are settled below without being picked, so check them here
                let filesets = self.cache.containers_of_kind(member, EntityKind::Fileset);
                if filesets.len() > 1 {
                    return Err(PreprocessError::MultipleFilesets {
                        image: *member,
                        filesets,
                    });
                }
            }

            // this fileset is settled either way
            for member in &members {
                remaining.remove(member);
            }

            let complete = members.is_subset(&referenced);
            if members.len() < 2 || !complete {
                debug!(
                    "fileset {} left alone ({} images, complete: {})",
                    fileset,
                    members.len(),
                    complete
                );
                continue;
            }

            rewrites.push(self.plan(fileset, members));
        }

        Ok(rewrites)
    }

    fn plan(&self, fileset: Target, images: BTreeSet<Target>) -> FilesetRewrite {
        let mut prohibited_prefixes = images.clone();
        for image in &images {
            prohibited_prefixes.extend(self.cache.all_containers(image));
        }

        let mut prohibited_suffixes = images;
        prohibited_suffixes.insert(fileset);

        FilesetRewrite {
            fileset,
            prohibited_prefixes,
            prohibited_suffixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::schema::{ContainmentSchema, Direction, QueryTemplate, STANDARD_TEMPLATES};
    use crate::logic::TargetCollector;
    use crate::model::{OperationKind, Request};
    use crate::store::memory::InMemoryContainmentStore;

    fn dataset(id: i64) -> Target {
        Target::new(EntityKind::Dataset, id)
    }

    async fn plan_for(
        store: &InMemoryContainmentStore,
        requests: &[Request],
    ) -> Result<Vec<FilesetRewrite>> {
        let mut cache = ContainmentCache::new();
        let targets =
            TargetCollector::collect(requests, OperationKind::Delete, &mut cache, store).await?;
        FilesetReconciler::new(&cache).reconcile(&targets)
    }

    #[tokio::test]
    async fn test_complete_fileset_is_planned() {
        let store = InMemoryContainmentStore::new();
        store.link_all(Target::fileset(1), [Target::image(1), Target::image(2)]);
        store.link(dataset(9), Target::image(1));

        let rewrites = plan_for(&store, &[Request::delete(dataset(9)), Request::delete(Target::image(2))])
            .await
            .unwrap();

        assert_eq!(rewrites.len(), 1);
        let rewrite = &rewrites[0];
        assert_eq!(rewrite.fileset, Target::fileset(1));
        assert_eq!(
            rewrite.prohibited_suffixes,
            BTreeSet::from([Target::image(1), Target::image(2), Target::fileset(1)])
        );
        assert_eq!(
            rewrite.prohibited_prefixes,
            BTreeSet::from([Target::image(1), Target::image(2), Target::fileset(1), dataset(9)])
        );
    }

    #[tokio::test]
    async fn test_incomplete_and_single_image_filesets_are_skipped() {
        let store = InMemoryContainmentStore::new();
        store.link_all(Target::fileset(1), [Target::image(1), Target::image(2), Target::image(3)]);
        store.link(Target::fileset(2), Target::image(4));

        let rewrites = plan_for(
            &store,
            &[
                Request::delete(Target::image(1)),
                Request::delete(Target::image(2)),
                Request::delete(Target::image(4)),
                Request::delete(Target::image(5)),
            ],
        )
        .await
        .unwrap();

        assert!(rewrites.is_empty());
    }

    #[tokio::test]
    async fn test_each_complete_fileset_is_planned_once() {
        let store = InMemoryContainmentStore::new();
        store.link_all(Target::fileset(1), [Target::image(1), Target::image(2)]);
        store.link_all(Target::fileset(2), [Target::image(3), Target::image(4)]);
        store.link_all(dataset(9), (1..=4).map(Target::image));

        let rewrites = plan_for(&store, &[Request::delete(dataset(9))]).await.unwrap();

        let filesets: Vec<Target> = rewrites.iter().map(|r| r.fileset).collect();
        assert_eq!(filesets, vec![Target::fileset(1), Target::fileset(2)]);
    }

    #[tokio::test]
    async fn test_image_in_two_filesets_is_fatal() {
        let store = InMemoryContainmentStore::new();
        store.link_all(Target::fileset(1), [Target::image(1), Target::image(2)]);
        store.link(Target::fileset(2), Target::image(2));

        let result = plan_for(&store, &[Request::delete(Target::image(2))]).await;

        match result {
            Err(PreprocessError::MultipleFilesets { image, filesets }) => {
                assert_eq!(image, Target::image(2));
                assert_eq!(filesets, vec![Target::fileset(1), Target::fileset(2)]);
            }
            other => panic!("expected multiple filesets error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_image_member_is_fatal() {
        let store = InMemoryContainmentStore::new();
        store.link_all(Target::fileset(1), [Target::image(1), dataset(5)]);
        let schema = ContainmentSchema::from_templates(STANDARD_TEMPLATES.into_iter().chain([QueryTemplate {
            name: "fileset_datasets",
            from: EntityKind::Fileset,
            to: EntityKind::Dataset,
            direction: Direction::Contained,
            sql: "SELECT dataset FROM filesetdataset WHERE fileset = $1",
        }]));
        let mut cache = ContainmentCache::with_schema(schema);
        let requests = [Request::delete(Target::image(1))];
        let targets = TargetCollector::collect(&requests, OperationKind::Delete, &mut cache, &store)
            .await
            .unwrap();
        cache
            .lookup_contained(&store, EntityKind::Dataset, Target::fileset(1))
            .await
            .unwrap();

        let result = FilesetReconciler::new(&cache).reconcile(&targets);

        assert!(matches!(
            result,
            Err(PreprocessError::NonImageInFileset { member, .. }) if member == dataset(5)
        ));
    }
}
