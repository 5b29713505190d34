//! Error taxonomy shared by both tools.
//!
//! Only [`TidyError::Connectivity`] is fatal; the cleanup loop reports every
//! other variant and keeps accepting commands. Per-file read problems in the
//! viewer are not errors at all: they become
//! [`FileContent`](crate::models::FileContent) sentinels.

use std::path::PathBuf;

use thiserror::Error;

use crate::guard::CancelReason;

#[derive(Debug, Error)]
pub enum TidyError {
    /// The initial ping failed. The process exits with a non-zero status.
    #[error("Could not connect to MongoDB: {cause}")]
    Connectivity {
        /// The address that was tried.
        uri: String,
        cause: String,
    },

    /// The named database is not in the live catalog.
    #[error("Database '{0}' does not exist.")]
    NotFound(String),

    /// The user declined at step one or mistyped the name at step two.
    #[error("{reason}")]
    ConfirmationRejected {
        namespace: String,
        reason: CancelReason,
    },

    /// The store rejected the drop. Store state follows the driver's own
    /// atomicity; nothing is retried.
    #[error("Error dropping database '{namespace}': {cause}")]
    DeletionFailure { namespace: String, cause: String },

    /// A read-only catalog query failed.
    #[error("Error querying database '{namespace}': {cause}")]
    Query { namespace: String, cause: String },

    /// Folder mode was pointed at something that is not a directory.
    #[error("Folder does not exist or is not a directory: {}", .0.display())]
    FolderUnavailable(PathBuf),

    /// The folder exists but its listing could not be read.
    #[error("Could not read folder {}: {cause}", .path.display())]
    FolderUnreadable { path: PathBuf, cause: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TidyError {
    /// True for errors that must terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TidyError::Connectivity { .. })
    }
}
