use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Record is missing required field '{field}': {record}")]
    MissingField {
        field: String,
        record: String,
    },

    #[error("Duplicate id {0} in record list")]
    DuplicateId(String),

    #[error("No root record found (every record names a parent)")]
    NoRoot,

    #[error("Multiple root records found: {0} and {1}")]
    MultipleRoots(String, String),

    #[error("Record {id} is not reachable from the root (parent: {parent})")]
    Orphan {
        id: String,
        parent: String,
    },

    #[error("Invalid input in {path}: {reason}")]
    InvalidInput {
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {message}")]
    Config {
        message: String,
    },
}

pub type TreeResult<T> = Result<T, TreeError>;
