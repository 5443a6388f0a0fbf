//! Staged writes and verified relocation of photo files.
//!
//! Every write lands in a hidden temporary sibling first and is published under its final name
//! only once complete, without replacing anything already there. A reader listing the folder
//! therefore sees either no file or the whole file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};

/// Write `bytes` to `target`, failing with [`CatalogError::DestinationExists`] if it is taken.
pub fn write_new(target: &Path, bytes: &[u8]) -> CatalogResult<()> {
    let parent = parent_of(target)?;
    let mut staged = stage_in(parent)?;
    staged.write_all(bytes).map_err(|err| CatalogError::io("writing", target, err))?;
    staged.as_file().sync_all().map_err(|err| CatalogError::io("syncing", target, err))?;
    publish(staged, target)
}

/// Relocate `source` to `target` by copy, verify, publish, then delete.
///
/// The source is left untouched unless the copy has been verified and published. If the source
/// cannot be removed afterwards the published copy is withdrawn again, so a failure never leaves
/// the photo in two folders. A crash between publishing and removal can.
pub fn move_verified(source: &Path, target: &Path) -> CatalogResult<()> {
    if target.exists() {
        return Err(CatalogError::DestinationExists(target.to_path_buf()));
    }
    let parent = parent_of(target)?;

    let mut input = File::open(source).map_err(|err| CatalogError::io("opening", source, err))?;
    let modified = input
        .metadata()
        .and_then(|meta| meta.modified())
        .map_err(|err| CatalogError::io("reading metadata of", source, err))?;

    let mut staged = stage_in(parent)?;
    io::copy(&mut input, staged.as_file_mut())
        .map_err(|err| CatalogError::io("copying", source, err))?;
    staged
        .as_file()
        .set_modified(modified)
        .map_err(|err| CatalogError::io("stamping", staged.path(), err))?;
    staged.as_file().sync_all().map_err(|err| CatalogError::io("syncing", staged.path(), err))?;

    let expected = digest(source)?;
    let actual = digest(staged.path())?;
    if expected != actual {
        return Err(CatalogError::CopyMismatch(source.to_path_buf()));
    }
    debug!(source = %source.display(), digest = %expected.to_hex(), "copy verified");

    publish(staged, target)?;

    match fs::remove_file(source) {
        Ok(()) => Ok(()),
        // Someone else removed the original meanwhile; the published copy is now the only one.
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            if let Err(rollback) = fs::remove_file(target) {
                warn!(
                    target = %target.display(),
                    error = %rollback,
                    "could not withdraw copy after failed move; photo is duplicated"
                );
            }
            Err(CatalogError::io("removing", source, err))
        }
    }
}

fn stage_in(parent: &Path) -> CatalogResult<NamedTempFile> {
    NamedTempFile::new_in(parent).map_err(|err| CatalogError::io("staging a file in", parent, err))
}

fn publish(staged: NamedTempFile, target: &Path) -> CatalogResult<()> {
    match staged.persist_noclobber(target) {
        Ok(_) => Ok(()),
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
            Err(CatalogError::DestinationExists(target.to_path_buf()))
        }
        Err(err) => Err(CatalogError::io("publishing", target, err.error)),
    }
}

fn parent_of(path: &Path) -> CatalogResult<&Path> {
    match path.parent() {
        Some(parent) if parent.is_dir() => Ok(parent),
        Some(parent) => Err(CatalogError::NotFound(parent.to_path_buf())),
        None => Err(CatalogError::NotFound(path.to_path_buf())),
    }
}

fn digest(path: &Path) -> CatalogResult<blake3::Hash> {
    let mut file = File::open(path).map_err(|err| CatalogError::io("opening", path, err))?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher).map_err(|err| CatalogError::io("hashing", path, err))?;
    Ok(hasher.finalize())
}
