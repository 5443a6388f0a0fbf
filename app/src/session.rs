use anyhow::{Context, anyhow};
use photo_core::store::PreferenceStore;
use photo_core::{Catalog, Folder};
use tracing::warn;

/// Presentation state for one run: the catalog, its preference store, and the selected folder.
///
/// The remembered folder is read once in [`Session::start`] and written back only through
/// [`Session::select`].
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    prefs: PreferenceStore,
    selected: Folder,
}

impl Session {
    pub fn start(catalog: Catalog, prefs: PreferenceStore) -> Self {
        let last = prefs.last_selected_folder().unwrap_or_else(|err| {
            warn!(path = %prefs.path().display(), error = %err, "ignoring unreadable preferences");
            None
        });
        let selected = catalog.preferred_folder(last.as_deref());
        Self { catalog, prefs, selected }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected(&self) -> &Folder {
        &self.selected
    }

    /// Make `name` the selected folder and remember it for the next run.
    pub fn select(&mut self, name: &str) -> anyhow::Result<&Folder> {
        let folder = self.folder(name)?;
        self.prefs.save_last_selected_folder(&folder).context("saving selected folder")?;
        self.selected = folder;
        Ok(&self.selected)
    }

    /// The named folder, or the selected one when no name is given.
    pub fn resolve(&self, name: Option<&str>) -> anyhow::Result<Folder> {
        match name {
            Some(name) => self.folder(name),
            None => Ok(self.selected.clone()),
        }
    }

    fn folder(&self, name: &str) -> anyhow::Result<Folder> {
        self.catalog.folder(name).ok_or_else(|| anyhow!("no folder named {name:?}"))
    }
}
