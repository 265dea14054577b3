use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{EntityKind, Target};

/// The graph operations whose batches get rewritten, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Move entities into another group.
    Chgrp,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 2] = [OperationKind::Chgrp, OperationKind::Delete];
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Chgrp => f.write_str("chgrp"),
            OperationKind::Delete => f.write_str("delete"),
        }
    }
}

/// Cascading delete of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    #[serde(rename = "type")]
    pub target_type: String,
    pub id: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl Delete {
    pub fn new(target: Target) -> Self {
        Self {
            target_type: target.kind.external_name().to_string(),
            id: target.id,
            options: BTreeMap::new(),
        }
    }

    pub fn with_target(&self, target: Target) -> Self {
        Self {
            target_type: target.kind.external_name().to_string(),
            id: target.id,
            options: self.options.clone(),
        }
    }
}

/// Move of one target, and what it cascades to, into group `group_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chgrp {
    #[serde(rename = "type")]
    pub target_type: String,
    pub id: i64,
    pub group_id: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl Chgrp {
    pub fn new(target: Target, group_id: i64) -> Self {
        Self {
            target_type: target.kind.external_name().to_string(),
            id: target.id,
            group_id,
            options: BTreeMap::new(),
        }
    }

    pub fn with_target(&self, target: Target) -> Self {
        Self {
            target_type: target.kind.external_name().to_string(),
            id: target.id,
            group_id: self.group_id,
            options: self.options.clone(),
        }
    }
}

/// Any request that is not a graph modification; never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueRequest {
    pub name: String,
}

/// One entry of a request batch. Batch order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "lowercase")]
pub enum Request {
    Delete(Delete),
    Chgrp(Chgrp),
    Other(OpaqueRequest),
}

impl Request {
    pub fn delete(target: Target) -> Self {
        Request::Delete(Delete::new(target))
    }

    pub fn chgrp(target: Target, group_id: i64) -> Self {
        Request::Chgrp(Chgrp::new(target, group_id))
    }

    pub fn other(name: &str) -> Self {
        Request::Other(OpaqueRequest {
            name: name.to_string(),
        })
    }

    /// The graph operation this request performs, if it is one.
    pub fn operation(&self) -> Option<OperationKind> {
        match self {
            Request::Delete(_) => Some(OperationKind::Delete),
            Request::Chgrp(_) => Some(OperationKind::Chgrp),
            Request::Other(_) => None,
        }
    }

    /// The request's target, or `None` when its type name is not a known kind.
    pub fn target(&self) -> Option<Target> {
        let (target_type, id) = match self {
            Request::Delete(delete) => (delete.target_type.as_str(), delete.id),
            Request::Chgrp(chgrp) => (chgrp.target_type.as_str(), chgrp.id),
            Request::Other(_) => return None,
        };
        EntityKind::from_external_name(target_type).map(|kind| Target::new(kind, id))
    }

    /// The target of this request if it is a `kind` operation on a known entity kind.
    pub fn relevant_target(&self, kind: OperationKind) -> Option<Target> {
        if self.operation() != Some(kind) {
            return None;
        }
        self.target()
    }

    /// Same operation with every setting carried over, aimed at `target` instead.
    pub fn with_target(&self, target: Target) -> Option<Self> {
        match self {
            Request::Delete(delete) => Some(Request::Delete(delete.with_target(target))),
            Request::Chgrp(chgrp) => Some(Request::Chgrp(chgrp.with_target(target))),
            Request::Other(_) => None,
        }
    }
}
