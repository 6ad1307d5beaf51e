//! CLI-level errors (wraps tree errors)

use thiserror::Error;

use crate::errors::TreeError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("no node with {field} = {value}")]
    NotFound { field: String, value: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::NotFound { .. } => crate::exitcode::NOT_FOUND,
            CliError::Tree(e) => match e {
                TreeError::Io(_) => crate::exitcode::NOINPUT,
                TreeError::Config { .. } => crate::exitcode::CONFIG,
                TreeError::Json(_)
                | TreeError::InvalidInput { .. }
                | TreeError::MissingField { .. }
                | TreeError::DuplicateId(_)
                | TreeError::NoRoot
                | TreeError::MultipleRoots(..)
                | TreeError::Orphan { .. } => crate::exitcode::DATAERR,
            },
        }
    }
}
