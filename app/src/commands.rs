//! Command handlers rendering catalog state as text or JSON.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Local};
use photo_core::capture::{CaptureWriter, FileSource};
use photo_core::{CatalogError, Folder, Photo};
use serde::Serialize;

use crate::cli::Command;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    pub name: String,
    pub path: String,
    pub photo_count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    pub name: String,
    pub path: String,
    pub folder_name: String,
    pub modified_ms: u64,
}

impl From<&Photo> for PhotoView {
    fn from(photo: &Photo) -> Self {
        Self {
            name: photo.name.clone(),
            path: photo.path.to_string_lossy().into_owned(),
            folder_name: photo.folder_name.clone(),
            modified_ms: photo.modified_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Notice {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Output sink shared by every handler.
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn folders(&mut self, views: &[FolderView]) -> anyhow::Result<()> {
        if self.json {
            return self.json_line(views);
        }
        for view in views {
            let marker = if view.selected { '*' } else { ' ' };
            writeln!(self.out, "{marker} {}\t{} photos", view.name, view.photo_count)?;
        }
        Ok(())
    }

    fn photos(&mut self, photos: &[Photo]) -> anyhow::Result<()> {
        if self.json {
            let views: Vec<PhotoView> = photos.iter().map(PhotoView::from).collect();
            return self.json_line(&views);
        }
        if photos.is_empty() {
            writeln!(self.out, "no photos")?;
        }
        for photo in photos {
            writeln!(self.out, "{}\t{}\t{}", local_time(photo), photo.folder_name, photo.name)?;
        }
        Ok(())
    }

    fn photo(&mut self, photo: &Photo) -> anyhow::Result<()> {
        if self.json {
            return self.json_line(&PhotoView::from(photo));
        }
        writeln!(self.out, "name:     {}", photo.name)?;
        writeln!(self.out, "folder:   {}", photo.folder_name)?;
        writeln!(self.out, "modified: {}", local_time(photo))?;
        writeln!(self.out, "path:     {}", photo.path.display())?;
        Ok(())
    }

    fn notice(&mut self, message: impl Into<String>, path: Option<&Path>) -> anyhow::Result<()> {
        let notice = Notice {
            message: message.into(),
            path: path.map(|path| path.to_string_lossy().into_owned()),
        };
        if self.json {
            return self.json_line(&notice);
        }
        match &notice.path {
            Some(path) => writeln!(self.out, "{}: {path}", notice.message)?,
            None => writeln!(self.out, "{}", notice.message)?,
        }
        Ok(())
    }

    fn json_line<T: Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }
}

pub fn execute<W: Write>(
    command: Command,
    session: &mut Session,
    out: &mut Renderer<W>,
) -> anyhow::Result<()> {
    match command {
        Command::Folders => {
            let selected = session.selected().path().to_path_buf();
            let views: Vec<FolderView> = session
                .catalog()
                .list_folders()
                .into_iter()
                .map(|folder| folder_view(session, folder, &selected))
                .collect();
            out.folders(&views)
        }
        Command::CreateFolder { name, select } => {
            let folder = session.catalog().create_folder(&name).map_err(rejected)?;
            if select {
                session.select(&folder.name)?;
            }
            out.notice(format!("folder created: {}", folder.name), Some(folder.path()))
        }
        Command::Photos { folder } => {
            let photos = match folder {
                Some(name) => {
                    let folder = session.resolve(Some(&name))?;
                    session.catalog().list_photos(&folder)
                }
                None => session.catalog().list_all_photos(),
            };
            out.photos(&photos)
        }
        Command::Show { path } => {
            let photo = session.catalog().photo_at(&path).map_err(rejected)?;
            out.photo(&photo)
        }
        Command::Delete { path } => {
            let catalog = session.catalog();
            let photo = catalog.photo_at(&path).map_err(rejected)?;
            catalog.delete_photo(&photo).map_err(rejected)?;
            out.notice(format!("deleted {}", photo.name), None)
        }
        Command::Move { path, folder } => {
            let target = session.resolve(Some(&folder))?;
            let catalog = session.catalog();
            let photo = catalog.photo_at(&path).map_err(rejected)?;
            let moved = catalog.move_photo(&photo, &target).map_err(rejected)?;
            out.notice(format!("moved {} to {}", moved.name, target.name), Some(moved.path()))
        }
        Command::Select { folder } => {
            let selected = session.select(&folder)?;
            out.notice(format!("current folder: {}", selected.name), Some(selected.path()))
        }
        Command::Capture { from, folder } => {
            let folder = session.resolve(folder.as_deref())?;
            let target = session.catalog().new_capture_target(&folder);
            let writer = CaptureWriter::spawn()?;
            let ticket = writer
                .capture(&mut FileSource::new(&from), target)
                .with_context(|| format!("capturing from {}", from.display()))?;
            let saved = ticket.wait().map_err(rejected)?;
            writer.shutdown();
            out.notice("photo saved", Some(&saved))
        }
        Command::Target { folder } => {
            let folder = session.resolve(folder.as_deref())?;
            let target = session.catalog().new_capture_target(&folder);
            out.notice("next capture", Some(&target))
        }
    }
}

fn folder_view(session: &Session, folder: Folder, selected: &Path) -> FolderView {
    FolderView {
        photo_count: session.catalog().list_photos(&folder).len(),
        selected: folder.path() == selected,
        path: folder.path.to_string_lossy().into_owned(),
        name: folder.name,
    }
}

/// Attach the user-facing reason for a rejected action.
fn rejected(err: CatalogError) -> anyhow::Error {
    let reason = match &err {
        CatalogError::InvalidFolderName(_) => "invalid folder name",
        CatalogError::FolderExists(_) => "folder already exists",
        CatalogError::DestinationExists(_) => "a photo with that name is already there",
        CatalogError::NotInCatalog(_) => "not a photo in the catalog",
        CatalogError::NotFound(_) => "photo no longer exists",
        CatalogError::CopyMismatch(_) | CatalogError::WorkerStopped | CatalogError::Io { .. } => {
            "file operation failed"
        }
    };
    anyhow::Error::new(err).context(reason)
}

fn local_time(photo: &Photo) -> String {
    DateTime::<Local>::from(photo.modified).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_core::Catalog;
    use photo_core::store::PreferenceStore;
    use std::fs;
    use tempfile::TempDir;

    fn session() -> (TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::start(
            Catalog::open(dir.path().join("shelf")),
            PreferenceStore::open(dir.path().join("prefs.json")),
        );
        (dir, session)
    }

    fn run(session: &mut Session, command: Command, json: bool) -> anyhow::Result<String> {
        let mut out = Renderer::new(Vec::new(), json);
        execute(command, session, &mut out)?;
        Ok(String::from_utf8(out.into_inner()).unwrap())
    }

    #[test]
    fn folders_mark_the_selection() {
        let (_dir, mut session) = session();
        run(&mut session, Command::CreateFolder { name: "Trips".into(), select: true }, false)
            .unwrap();

        let text = run(&mut session, Command::Folders, false).unwrap();
        assert_eq!(text, "  Default\t0 photos\n* Trips\t0 photos\n");
    }

    #[test]
    fn duplicate_folder_is_rejected_with_reason() {
        let (_dir, mut session) = session();
        let create = || Command::CreateFolder { name: "Trips".into(), select: false };
        run(&mut session, create(), false).unwrap();

        let err = run(&mut session, create(), false).unwrap_err();
        assert_eq!(err.to_string(), "folder already exists");
    }

    #[test]
    fn capture_then_move_then_delete() {
        let (dir, mut session) = session();
        let frame = dir.path().join("frame.png");
        fs::write(&frame, b"png").unwrap();
        run(&mut session, Command::CreateFolder { name: "Trips".into(), select: false }, false)
            .unwrap();

        run(&mut session, Command::Capture { from: frame, folder: None }, false).unwrap();
        let listed = session.catalog().list_all_photos();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].folder_name, "Default");

        let moved_path = session.catalog().root().join("Trips").join(&listed[0].name);
        let relocate = Command::Move { path: listed[0].path.clone(), folder: "Trips".into() };
        run(&mut session, relocate, false).unwrap();
        assert!(moved_path.exists());
        assert!(!listed[0].path.exists());

        run(&mut session, Command::Delete { path: moved_path.clone() }, false).unwrap();
        assert!(session.catalog().list_all_photos().is_empty());

        let err = run(&mut session, Command::Delete { path: moved_path }, false).unwrap_err();
        assert_eq!(err.to_string(), "photo no longer exists");
    }

    #[test]
    fn photos_render_as_json() {
        let (_dir, mut session) = session();
        let folder = session.selected().clone();
        fs::write(folder.path().join("a.jpg"), b"a").unwrap();

        let json = run(&mut session, Command::Photos { folder: None }, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
        assert_eq!(parsed[0]["name"], "a.jpg");
        assert_eq!(parsed[0]["folderName"], "Default");
        assert!(parsed[0]["modifiedMs"].as_u64().unwrap() > 0);
    }
}
