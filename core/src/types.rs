//! Shared data structures exchanged between the catalog, the capture writer, and the shell.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A directory directly under the catalog root that groups photos.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Folder {
    pub path: PathBuf,
    pub name: String,
}

impl Folder {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read-derived view over an image file inside a [`Folder`].
///
/// Photos are rebuilt from the filesystem on every listing; holding one does not keep the
/// underlying file alive or locked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Photo {
    pub path: PathBuf,
    pub name: String,
    pub folder_name: String,
    pub modified: SystemTime,
}

impl Photo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Milliseconds since the Unix epoch, clamped to zero for pre-epoch timestamps.
    pub fn modified_ms(&self) -> u64 {
        self.modified
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Persisted presentation preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_folder: Option<PathBuf>,
}
