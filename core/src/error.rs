//! Error taxonomy for catalog operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Coarse classification used by the presentation layer to pick user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected before touching the filesystem.
    Validation,
    /// A filesystem call failed.
    Io,
    /// The file or folder vanished between listing and action.
    NotFound,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid folder name {0:?}")]
    InvalidFolderName(String),

    #[error("folder {0:?} already exists")]
    FolderExists(String),

    #[error("{} already exists", .0.display())]
    DestinationExists(PathBuf),

    #[error("{} is not a photo inside the catalog", .0.display())]
    NotInCatalog(PathBuf),

    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("copy of {} does not match its source", .0.display())]
    CopyMismatch(PathBuf),

    #[error("capture writer is no longer running")]
    WorkerStopped,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    /// Wrap an I/O failure on `path`, folding `NotFound` into [`CatalogError::NotFound`].
    pub(crate) fn io(action: &str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::NotFound(path.to_path_buf());
        }
        Self::Io { context: format!("{action} {}", path.display()), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFolderName(_)
            | Self::FolderExists(_)
            | Self::DestinationExists(_)
            | Self::NotInCatalog(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::CopyMismatch(_) | Self::WorkerStopped | Self::Io { .. } => ErrorKind::Io,
        }
    }
}
