use thiserror::Error;

/// Failure kinds surfaced by the registry's core operations.
///
/// Row-level malformation during CSV import is deliberately absent here:
/// malformed rows are skipped, never surfaced to the caller.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("device not found")]
    NotFound,

    #[error("upload is not valid UTF-8")]
    InvalidEncoding,

    #[error("failed to read device records: {0}")]
    StorageReadFailure(anyhow::Error),

    #[error("failed to write device records: {0}")]
    PersistenceFailure(anyhow::Error),

    #[error("failed to delete photo asset: {0}")]
    AssetDeletionFailure(anyhow::Error),
}
