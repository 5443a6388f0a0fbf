//! Presentation preferences persisted as a small JSON document.
//!
//! The store is an explicit value: the shell opens it at startup, reads the last-selected folder
//! once, and writes the selection back through [`PreferenceStore::save_last_selected_folder`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::types::{Folder, Preferences};

use super::Result;

#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored preferences; a missing file yields the defaults.
    pub fn load(&self) -> Result<Preferences> {
        let _guard = self.lock.lock();
        self.read_file()
    }

    /// The remembered folder, only if it still exists and is a directory.
    pub fn last_selected_folder(&self) -> Result<Option<PathBuf>> {
        let prefs = self.load()?;
        Ok(prefs.last_selected_folder.filter(|path| path.is_dir()))
    }

    pub fn save_last_selected_folder(&self, folder: &Folder) -> Result<()> {
        let _guard = self.lock.lock();
        let mut prefs = self.read_file()?;
        prefs.last_selected_folder = Some(absolute(folder.path()));
        self.write_file(&prefs)?;
        debug!(folder = %folder.name, "remembered selected folder");
        Ok(())
    }

    fn read_file(&self) -> Result<Preferences> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing preferences at {}", self.path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_file(&self, prefs: &Preferences) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            anyhow!("preferences path {} does not have a parent directory", self.path.display())
        })?;
        fs::create_dir_all(parent)
            .with_context(|| format!("creating preferences directory at {}", parent.display()))?;

        let data = serde_json::to_vec_pretty(prefs)?;
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(&data)?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|err| anyhow!(err.error)).map(|_| ())
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
        assert!(store.last_selected_folder().unwrap().is_none());
    }

    #[test]
    fn remembers_existing_folder_only() {
        let dir = tempfile::tempdir().unwrap();
        let folder_path = dir.path().join("Trips");
        fs::create_dir(&folder_path).unwrap();
        let store = PreferenceStore::open(dir.path().join("state").join("prefs.json"));

        store.save_last_selected_folder(&Folder::new(&folder_path, "Trips")).unwrap();
        assert_eq!(store.last_selected_folder().unwrap(), Some(folder_path.clone()));

        fs::remove_dir(&folder_path).unwrap();
        assert!(store.last_selected_folder().unwrap().is_none());
        assert_eq!(store.load().unwrap().last_selected_folder, Some(folder_path));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, b"{not json").unwrap();
        let err = PreferenceStore::open(&path).load().unwrap_err();
        assert!(err.to_string().contains("parsing preferences"));
    }
}
