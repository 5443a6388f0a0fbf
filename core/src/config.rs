//! Where the catalog lives on disk and what its fallback folder is called.

use std::path::PathBuf;

use directories::{ProjectDirs, UserDirs};

/// Name of the always-present fallback folder.
pub const DEFAULT_FOLDER_NAME: &str = "Default";

const ROOT_ENV_VAR: &str = "PHOTO_SHELF_ROOT";
const APP_FOLDER: &str = "PhotoShelf";

const APP_QUALIFIER: &str = "com";
const APP_ORGANISATION: &str = "PhotoShelf";
const APP_NAME: &str = "photo-shelf";

/// Configuration for a [`crate::catalog::Catalog`] and its companion stores.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Directory holding one subdirectory per folder.
    pub root: PathBuf,
    /// Name of the fallback folder created on demand under `root`.
    pub default_folder: String,
    /// JSON file backing the preference store.
    pub preferences_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let root = std::env::var_os(ROOT_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_root);

        Self {
            root,
            default_folder: DEFAULT_FOLDER_NAME.to_string(),
            preferences_path: data_dir().join("state").join("preferences.json"),
        }
    }
}

impl CatalogConfig {
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_default_folder<S: Into<String>>(mut self, name: S) -> Self {
        self.default_folder = name.into();
        self
    }

    pub fn with_preferences_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.preferences_path = path.into();
        self
    }
}

/// Per-user application data directory, falling back to the system temp dir.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANISATION, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join(APP_NAME))
}

fn default_root() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.picture_dir().map(|pictures| pictures.join(APP_FOLDER)))
        .unwrap_or_else(|| data_dir().join("photos"))
}
