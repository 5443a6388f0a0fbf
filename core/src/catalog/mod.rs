//! Directory-backed catalog of photos grouped into folders.
//!
//! The catalog keeps no records between calls. Every query re-reads the root directory, so
//! there is nothing to invalidate; the only staleness is whatever the filesystem itself races.
//! Listing operations never fail: unreadable directories are logged and contribute nothing.
//! Mutations return a [`CatalogResult`] the presentation layer turns into user feedback.

pub mod naming;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::config::{CatalogConfig, DEFAULT_FOLDER_NAME};
use crate::error::{CatalogError, CatalogResult};
use crate::fs::{self as catalog_fs, transfer};
use crate::types::{Folder, Photo};

#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    default_name: String,
}

impl Catalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            root: absolute_root(config.root.clone()),
            default_name: config.default_folder.clone(),
        }
    }

    /// Catalog rooted at `root` with the standard fallback folder name.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: absolute_root(root.into()), default_name: DEFAULT_FOLDER_NAME.to_string() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_folder_name(&self) -> &str {
        &self.default_name
    }

    /// The fallback folder, created on disk if it is missing.
    pub fn default_folder(&self) -> Folder {
        let path = self.root.join(&self.default_name);
        if let Err(err) = fs::create_dir_all(&path) {
            warn!(path = %path.display(), error = %err, "could not create default folder");
        }
        Folder::new(path, self.default_name.clone())
    }

    /// All folders under the root, sorted by name.
    pub fn list_folders(&self) -> Vec<Folder> {
        self.default_folder();

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(root = %self.root.display(), error = %err, "could not read catalog root");
                return Vec::new();
            }
        };

        let mut folders = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %self.root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = catalog_fs::file_name(&path) else {
                debug!(path = %path.display(), "skipping folder with non UTF-8 name");
                continue;
            };
            folders.push(Folder::new(path, name));
        }

        folders.sort_by(|a, b| a.name.cmp(&b.name));
        folders
    }

    /// Look up an existing folder by name.
    pub fn folder(&self, name: &str) -> Option<Folder> {
        catalog_fs::validate_folder_name(name).ok()?;
        if name == self.default_name {
            return Some(self.default_folder());
        }
        let path = self.root.join(name);
        path.is_dir().then(|| Folder::new(path, name))
    }

    pub fn create_folder(&self, name: &str) -> CatalogResult<Folder> {
        catalog_fs::validate_folder_name(name)
            .inspect_err(|err| debug!(error = %err, "rejected folder name"))?;

        fs::create_dir_all(&self.root)
            .map_err(|err| CatalogError::io("creating catalog root", &self.root, err))?;

        let path = self.root.join(name);
        match fs::create_dir(&path) {
            Ok(()) => {
                info!(folder = name, "created folder");
                Ok(Folder::new(path, name))
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(folder = name, "folder already exists");
                Err(CatalogError::FolderExists(name.to_string()))
            }
            Err(err) => {
                warn!(folder = name, error = %err, "could not create folder");
                Err(CatalogError::io("creating folder", &path, err))
            }
        }
    }

    /// Photos directly inside `folder`, newest first.
    pub fn list_photos(&self, folder: &Folder) -> Vec<Photo> {
        let entries = match fs::read_dir(folder.path()) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(folder = %folder.name, error = %err, "could not read folder");
                return Vec::new();
            }
        };

        let mut photos = Vec::new();
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            if !catalog_fs::is_supported_image(&path) {
                continue;
            }

            // Follows symlinks; an entry may also vanish between read_dir and here.
            let meta = match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "entry vanished while listing");
                    continue;
                }
            };
            let Some(name) = catalog_fs::file_name(&path) else {
                continue;
            };

            photos.push(Photo {
                path,
                name,
                folder_name: folder.name.clone(),
                modified: catalog_fs::modified_time(&meta),
            });
        }

        sort_newest_first(&mut photos);
        photos
    }

    /// Photos of every folder merged into one newest-first sequence.
    pub fn list_all_photos(&self) -> Vec<Photo> {
        let mut photos: Vec<Photo> = self
            .list_folders()
            .iter()
            .flat_map(|folder| self.list_photos(folder))
            .collect();
        sort_newest_first(&mut photos);
        photos
    }

    pub fn delete_photo(&self, photo: &Photo) -> CatalogResult<()> {
        fs::remove_file(photo.path())
            .map_err(|err| CatalogError::io("deleting", photo.path(), err))
            .inspect_err(|err| warn!(photo = %photo.name, error = %err, "delete failed"))?;
        info!(photo = %photo.name, folder = %photo.folder_name, "deleted photo");
        Ok(())
    }

    /// Relocate `photo` into `target` under its current name.
    ///
    /// Fails without touching either folder when `target` already holds a file of that name.
    pub fn move_photo(&self, photo: &Photo, target: &Folder) -> CatalogResult<Photo> {
        let destination = target.path().join(&photo.name);
        transfer::move_verified(photo.path(), &destination).inspect_err(|err| {
            warn!(photo = %photo.name, target = %target.name, error = %err, "move failed")
        })?;
        info!(photo = %photo.name, from = %photo.folder_name, to = %target.name, "moved photo");

        let modified = fs::metadata(&destination)
            .map(|meta| catalog_fs::modified_time(&meta))
            .unwrap_or(photo.modified);
        Ok(Photo {
            path: destination,
            name: photo.name.clone(),
            folder_name: target.name.clone(),
            modified,
        })
    }

    /// Fresh `IMG_<yyyyMMdd_HHmmss>.jpg` path in `folder` stamped with the current local time.
    pub fn new_capture_target(&self, folder: &Folder) -> PathBuf {
        self.capture_target_at(folder, Local::now().naive_local())
    }

    pub fn capture_target_at(&self, folder: &Folder, at: NaiveDateTime) -> PathBuf {
        naming::unused_capture_path(folder.path(), at)
    }

    /// Resolve a file path into a [`Photo`] if it is an image directly inside a catalog folder.
    pub fn photo_at(&self, path: &Path) -> CatalogResult<Photo> {
        let meta = fs::metadata(path).map_err(|err| CatalogError::io("inspecting", path, err))?;
        let not_in_catalog = || CatalogError::NotInCatalog(path.to_path_buf());

        if !meta.is_file() || !catalog_fs::is_supported_image(path) {
            return Err(not_in_catalog());
        }
        let folder_dir = path.parent().ok_or_else(not_in_catalog)?;
        if !self.is_folder_dir(folder_dir) {
            return Err(not_in_catalog());
        }
        let folder_name = catalog_fs::file_name(folder_dir).ok_or_else(not_in_catalog)?;
        let name = catalog_fs::file_name(path).ok_or_else(not_in_catalog)?;

        Ok(Photo {
            path: self.root.join(&folder_name).join(&name),
            name,
            folder_name,
            modified: catalog_fs::modified_time(&meta),
        })
    }

    /// `last` when it is still an existing folder of this catalog, else the default folder.
    pub fn preferred_folder(&self, last: Option<&Path>) -> Folder {
        last.filter(|path| path.is_dir() && self.is_folder_dir(path))
            .and_then(catalog_fs::file_name)
            .and_then(|name| self.folder(&name))
            .unwrap_or_else(|| self.default_folder())
    }

    fn is_folder_dir(&self, dir: &Path) -> bool {
        let Some(parent) = dir.parent() else {
            return false;
        };
        match (parent.canonicalize(), self.root.canonicalize()) {
            (Ok(parent), Ok(root)) => parent == root,
            _ => false,
        }
    }
}

/// Anchor a relative root at the working directory so every folder and photo path is absolute.
fn absolute_root(root: PathBuf) -> PathBuf {
    std::path::absolute(&root).unwrap_or(root)
}

fn sort_newest_first(photos: &mut [Photo]) {
    photos.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.path.cmp(&b.path))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn touch(path: &Path, secs: u64) {
        fs::write(path, b"img").unwrap();
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        fs::File::options().write(true).open(path).unwrap().set_modified(stamp).unwrap();
    }

    #[test]
    fn listing_creates_default_folder() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("catalog");
        let catalog = Catalog::open(&root);

        let folders = catalog.list_folders();

        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, DEFAULT_FOLDER_NAME);
        assert!(root.join(DEFAULT_FOLDER_NAME).is_dir());
    }

    #[test]
    fn folders_sort_by_name_and_ignore_files() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::open(dir.path());
        for name in ["Trips", "Animals", "Zoo"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("stray.jpg"), b"x").unwrap();

        let names: Vec<String> = catalog.list_folders().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Animals", "Default", "Trips", "Zoo"]);
    }

    #[test]
    fn photos_sort_newest_first_with_name_tiebreak() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::open(dir.path());
        let folder = catalog.default_folder();
        touch(&folder.path().join("b.jpg"), 200);
        touch(&folder.path().join("a.png"), 200);
        touch(&folder.path().join("old.gif"), 100);
        touch(&folder.path().join("new.webp"), 300);
        fs::create_dir(folder.path().join("nested.jpg")).unwrap();

        let names: Vec<String> = catalog.list_photos(&folder).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["new.webp", "a.png", "b.jpg", "old.gif"]);
    }

    #[test]
    fn photo_at_rejects_paths_outside_folders() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::open(dir.path());
        let folder = catalog.default_folder();
        let inside = folder.path().join("x.jpg");
        touch(&inside, 10);
        let loose = dir.path().join("loose.jpg");
        touch(&loose, 10);
        let text = folder.path().join("notes.txt");
        fs::write(&text, b"hi").unwrap();

        let photo = catalog.photo_at(&inside).expect("photo inside default");
        assert_eq!(photo.folder_name, DEFAULT_FOLDER_NAME);
        assert_eq!(photo.name, "x.jpg");

        assert!(matches!(catalog.photo_at(&loose), Err(CatalogError::NotInCatalog(_))));
        assert!(matches!(catalog.photo_at(&text), Err(CatalogError::NotInCatalog(_))));
        assert!(matches!(
            catalog.photo_at(&folder.path().join("gone.jpg")),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn preferred_folder_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::open(dir.path());
        let trips = catalog.create_folder("Trips").unwrap();

        assert_eq!(catalog.preferred_folder(Some(trips.path())).name, "Trips");
        assert_eq!(catalog.preferred_folder(None).name, DEFAULT_FOLDER_NAME);

        fs::remove_dir(trips.path()).unwrap();
        assert_eq!(catalog.preferred_folder(Some(trips.path())).name, DEFAULT_FOLDER_NAME);

        let elsewhere = tempdir().unwrap();
        assert_eq!(catalog.preferred_folder(Some(elsewhere.path())).name, DEFAULT_FOLDER_NAME);
    }
}
