use itertools::Itertools;
use log::info;

use crate::error::{PreprocessError, Result};
use crate::logic::reconciler::FilesetRewrite;
use crate::model::{OperationKind, Request};

/// Applies fileset rewrites to the requests of one operation kind.
pub struct RequestTransformer {
    kind: OperationKind,
}

impl RequestTransformer {
    pub fn new(kind: OperationKind) -> Self {
        Self { kind }
    }

    /// Insert a request on `rewrite.fileset` just before the first relevant
    /// request on a prohibited prefix, copying that request's settings, and
    /// drop every later relevant request on a prohibited suffix.
    ///
    /// Requests of other operations, and requests on unknown entity kinds,
    /// keep their relative order. `requests` is left unchanged on error.
    pub fn apply(&self, requests: &mut Vec<Request>, rewrite: &FilesetRewrite) -> Result<()> {
        let mut rewritten = Vec::with_capacity(requests.len() + 1);
        let mut dropped = Vec::new();
        let mut inserted = false;

        for request in requests.iter() {
            let Some(target) = request.relevant_target(self.kind) else {
                rewritten.push(request.clone());
                continue;
            };

            if !inserted && rewrite.prohibited_prefixes.contains(&target) {
                if let Some(replacement) = request.with_target(rewrite.fileset) {
                    rewritten.push(replacement);
                    inserted = true;
                }
            }

            if rewrite.prohibited_suffixes.contains(&target) {
                if !inserted {
                    return Err(PreprocessError::SuffixBeforePrefix {
                        fileset: rewrite.fileset,
                        target,
                    });
                }
                dropped.push(target);
                continue;
            }

            rewritten.push(request.clone());
        }

        if !inserted {
            return Err(PreprocessError::NoPrefixFound {
                fileset: rewrite.fileset,
            });
        }

        info!(
            "{} of fileset {} replaces {} request(s): [{}]",
            self.kind,
            rewrite.fileset,
            dropped.len(),
            dropped.iter().join(", ")
        );
        *requests = rewritten;
        Ok(())
    }
}
