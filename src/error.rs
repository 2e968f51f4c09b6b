//! Error types shared by the grove library.

use thiserror::Error;

/// Reasons an import (or a stored blob) could not be turned into a forest.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unexpected JSON format: expected an array of nodes or an object with a `nodes` array")]
    UnrecognizedShape,
    #[error("record {at} is not an object")]
    NotAnObject { at: String },
    #[error("record {at} is missing required field `{field}`")]
    MissingField { at: String, field: &'static str },
    #[error("record {at} is malformed: {source}")]
    Malformed {
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate id `{0}`")]
    DuplicateId(String),
    #[error("parent links form a cycle through `{0}`")]
    Cycle(String),
}

/// Structural violations raised by tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} not found")]
    NotFound(String),
    #[error("a node with id {0} already exists")]
    DuplicateId(String),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("cannot move {node} into its own subtree ({target})")]
    Cycle { node: String, target: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Umbrella error for library callers that mix stages.
#[derive(Debug, Error)]
pub enum GroveError {
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
