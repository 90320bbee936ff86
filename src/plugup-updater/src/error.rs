use plugup_core::host::{FilesError, SourceError};
use thiserror::Error;

/// Why a check or an update did not go through. Callers of the public
/// operations only see a bool; the error goes to the log.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to fetch remote plugin: {0}")]
    Fetch(#[from] SourceError),
    #[error("remote plugin has no metadata header")]
    MissingHeader,
    #[error("remote plugin header declares no name")]
    MissingName,
    #[error("plugin metadata has no {field}")]
    MissingField { field: &'static str },
    #[error(transparent)]
    Files(#[from] FilesError),
}

pub type UpdateResult<T> = Result<T, UpdateError>;
