use std::ffi::OsStr;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{CatalogError, CatalogResult};

/// Recognised photo file extensions (lowercase, without the dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

const FOLDER_NAME_FORBIDDEN: &[char] = &['/', '\\', '\0'];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Reject names that are blank, navigate the tree, or would escape a single path segment.
pub fn validate_folder_name(name: &str) -> CatalogResult<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(FOLDER_NAME_FORBIDDEN);
    if invalid { Err(CatalogError::InvalidFolderName(name.to_string())) } else { Ok(()) }
}

/// Final path segment as UTF-8, if it has one.
pub fn file_name(path: &Path) -> Option<String> {
    path.file_name().and_then(OsStr::to_str).map(str::to_string)
}

pub fn modified_time(meta: &Metadata) -> SystemTime {
    meta.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_case_insensitive() {
        for name in ["a.jpg", "b.JPEG", "c.Png", "d.gif", "e.BMP", "f.webp"] {
            assert!(is_supported_image(Path::new(name)), "{name} should be an image");
        }
        for name in ["notes.txt", "raw.cr2", "noext", ".jpg.tmp", "anim.avif"] {
            assert!(!is_supported_image(Path::new(name)), "{name} should be skipped");
        }
    }

    #[test]
    fn folder_names_must_be_single_segments() {
        for name in ["", "   ", "a/b", "a\\b", ".", "..", "nul\0byte"] {
            assert!(validate_folder_name(name).is_err(), "{name:?} should be rejected");
        }
        for name in ["Trips", "2024 Summer", ".hidden", "Café"] {
            assert!(validate_folder_name(name).is_ok(), "{name:?} should be accepted");
        }
    }
}
