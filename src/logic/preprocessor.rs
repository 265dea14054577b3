use log::info;

use crate::error::Result;
use crate::logic::cache::ContainmentCache;
use crate::logic::collector::TargetCollector;
use crate::logic::reconciler::FilesetReconciler;
use crate::logic::transform::RequestTransformer;
use crate::model::{OperationKind, Request};
use crate::store::traits::ContainmentQuery;

/// Rewrites a request batch so that no graph operation splits a fileset.
///
/// Wherever a batch's requests of one operation kind together reach every
/// image of a multi-image fileset, those image requests are replaced by a
/// single request on the fileset, placed before anything else in the batch
/// that touches the fileset's images or their containers.
///
/// A preprocessor belongs to one batch. Its containment cache is shared by the
/// passes over each operation kind and dropped with it.
pub struct Preprocessor<'q, Q: ContainmentQuery + ?Sized> {
    query: &'q Q,
    requests: Vec<Request>,
    cache: ContainmentCache,
}

impl<'q, Q: ContainmentQuery + ?Sized> Preprocessor<'q, Q> {
    /// Preprocess `requests` for every supported operation kind.
    pub async fn run(requests: Vec<Request>, query: &'q Q) -> Result<Self> {
        Self::run_for(requests, query, &OperationKind::ALL).await
    }

    /// Preprocess `requests` for the given operation kinds, in order.
    pub async fn run_for(
        requests: Vec<Request>,
        query: &'q Q,
        operations: &[OperationKind],
    ) -> Result<Self> {
        let mut preprocessor = Self {
            query,
            requests,
            cache: ContainmentCache::new(),
        };
        preprocessor.process(operations).await?;
        Ok(preprocessor)
    }

    async fn process(&mut self, operations: &[OperationKind]) -> Result<()> {
        // the batch is only replaced once every pass succeeded
        let mut working = self.requests.clone();
        let mut rewritten = 0;

        for &kind in operations {
            let targets =
                TargetCollector::collect(&working, kind, &mut self.cache, self.query).await?;
            let rewrites = FilesetReconciler::new(&self.cache).reconcile(&targets)?;

            let transformer = RequestTransformer::new(kind);
            for rewrite in &rewrites {
                transformer.apply(&mut working, rewrite)?;
            }
            rewritten += rewrites.len();
        }

        info!(
            "preprocessed {} request(s) into {}: {} fileset(s) substituted, {} image(s) and {} container(s) cached",
            self.requests.len(),
            working.len(),
            rewritten,
            self.image_count(),
            self.container_count()
        );
        self.requests = working;
        Ok(())
    }

    /// A copy of the (rewritten) batch.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.clone()
    }

    pub fn into_requests(self) -> Vec<Request> {
        self.requests
    }

    /// Distinct entities resolved on the contained side of the cache.
    pub fn image_count(&self) -> usize {
        self.cache.image_count()
    }

    /// Distinct entities resolved on the container side of the cache.
    pub fn container_count(&self) -> usize {
        self.cache.container_count()
    }
}
