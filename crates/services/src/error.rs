//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;
use trail_core::model::{NoteError, ProgressError};

/// Rejections from `ProgressStore`. Storage failures are never reported
/// here; they come back as `SaveStatus::Unpersisted`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    InvalidStatus(#[from] ProgressError),
    #[error(transparent)]
    Note(#[from] NoteError),
}

/// Errors from a remote roadmap catalog. `HttpCatalog` logs these and falls
/// back to builtin data, so they do not reach its callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("catalog returned no data")]
    Empty,
    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
