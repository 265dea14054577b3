use log::debug;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::Result;
use crate::logic::schema::ContainmentSchema;
use crate::model::{EntityKind, Target};
use crate::store::traits::ContainmentQuery;

/// Memoized containment relationships discovered during one preprocessing run.
///
/// Both maps are filled together, so every cached pair is reachable from
/// either end. The ledgers record which `(kind, target)` lookups were already
/// issued in each direction; a lookup is sent to the query service at most
/// once per cache.
#[derive(Debug, Default)]
pub struct ContainmentCache {
    schema: ContainmentSchema,
    contained_by_container: HashMap<Target, BTreeSet<Target>>,
    container_by_contained: HashMap<Target, BTreeSet<Target>>,
    lookup_contained_done: HashSet<(EntityKind, Target)>,
    lookup_container_done: HashSet<(EntityKind, Target)>,
}

impl ContainmentCache {
    pub fn new() -> Self {
        Self::with_schema(ContainmentSchema::standard())
    }

    pub fn with_schema(schema: ContainmentSchema) -> Self {
        Self {
            schema,
            contained_by_container: HashMap::new(),
            container_by_contained: HashMap::new(),
            lookup_contained_done: HashSet::new(),
            lookup_container_done: HashSet::new(),
        }
    }

    pub fn schema(&self) -> &ContainmentSchema {
        &self.schema
    }

    /// Cache the `contained_kind` entities inside `container`.
    pub async fn lookup_contained<Q: ContainmentQuery + ?Sized>(
        &mut self,
        query: &Q,
        contained_kind: EntityKind,
        container: Target,
    ) -> Result<()> {
        if self.lookup_contained_done.contains(&(contained_kind, container)) {
            return Ok(());
        }
        let template = *self.schema.template(container.kind, contained_kind)?;
        self.lookup_contained_done.insert((contained_kind, container));

        let ids = template.issue(query, container.id).await?;
        debug!("{}({}) -> {} {}", template.name, container.id, ids.len(), contained_kind);

        for id in ids {
            self.record(container, Target::new(contained_kind, id));
        }
        Ok(())
    }

    /// Cache the `container_kind` entities holding `contained`, together with
    /// everything of `contained`'s kind inside each of them.
    pub async fn lookup_container<Q: ContainmentQuery + ?Sized>(
        &mut self,
        query: &Q,
        container_kind: EntityKind,
        contained: Target,
    ) -> Result<()> {
        if self.lookup_container_done.contains(&(container_kind, contained)) {
            return Ok(());
        }
        let template = *self.schema.template(contained.kind, container_kind)?;
        self.lookup_container_done.insert((container_kind, contained));

        let ids = template.issue(query, contained.id).await?;
        debug!("{}({}) -> {} {}", template.name, contained.id, ids.len(), container_kind);

        for id in ids {
            self.lookup_contained(query, contained.kind, Target::new(container_kind, id))
                .await?;
        }
        Ok(())
    }

    fn record(&mut self, container: Target, contained: Target) {
        self.contained_by_container
            .entry(container)
            .or_default()
            .insert(contained);
        self.container_by_contained
            .entry(contained)
            .or_default()
            .insert(container);
    }

    /// Cached direct contents of `container`, of any kind.
    pub fn contained(&self, container: &Target) -> BTreeSet<Target> {
        self.contained_by_container
            .get(container)
            .cloned()
            .unwrap_or_default()
    }

    /// Cached direct containers of `contained`, of any kind.
    pub fn containers(&self, contained: &Target) -> BTreeSet<Target> {
        self.container_by_contained
            .get(contained)
            .cloned()
            .unwrap_or_default()
    }

    pub fn containers_of_kind(&self, contained: &Target, kind: EntityKind) -> Vec<Target> {
        self.container_by_contained
            .get(contained)
            .map(|containers| containers.iter().copied().filter(|c| c.is_kind(kind)).collect())
            .unwrap_or_default()
    }

    /// Every direct and indirect container of `target` already in the cache.
    /// Issues no queries.
    pub fn all_containers(&self, target: &Target) -> BTreeSet<Target> {
        let mut all = BTreeSet::new();
        let mut pending = VecDeque::from([*target]);
        while let Some(next) = pending.pop_front() {
            if let Some(containers) = self.container_by_contained.get(&next) {
                for container in containers {
                    if all.insert(*container) {
                        pending.push_back(*container);
                    }
                }
            }
        }
        all
    }

    /// Number of distinct entities cached on the contained side.
    pub fn image_count(&self) -> usize {
        self.container_by_contained.len()
    }

    /// Number of distinct entities cached on the container side.
    pub fn container_count(&self) -> usize {
        self.contained_by_container.len()
    }
}
