use thiserror::Error;

use crate::model::{EntityKind, Target};

pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Failures that abort preprocessing of a batch. None of them are retried.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("no containment query is declared from {from} to {to}")]
    UndeclaredEdge { from: EntityKind, to: EntityKind },

    #[error("image {image} is contained in multiple filesets: {filesets:?}")]
    MultipleFilesets { image: Target, filesets: Vec<Target> },

    #[error("non-image {member} found in fileset {fileset}")]
    NonImageInFileset { fileset: Target, member: Target },

    #[error("request for {target} precedes every prohibited prefix of fileset {fileset}")]
    SuffixBeforePrefix { fileset: Target, target: Target },

    #[error("no prohibited prefix of fileset {fileset} is among the requests")]
    NoPrefixFound { fileset: Target },

    #[error("containment query {template} failed for id {id}")]
    Query {
        template: &'static str,
        id: i64,
        #[source]
        source: anyhow::Error,
    },
}

impl PreprocessError {
    /// True for schema, data or ordering violations; false for collaborator failures.
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, PreprocessError::Query { .. })
    }
}
