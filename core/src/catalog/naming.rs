//! Capture file naming.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

const CAPTURE_PREFIX: &str = "IMG_";
const CAPTURE_EXTENSION: &str = "jpg";
const CAPTURE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `IMG_<yyyyMMdd_HHmmss>` for the given local time, without extension.
pub fn capture_stem(at: NaiveDateTime) -> String {
    format!("{CAPTURE_PREFIX}{}", at.format(CAPTURE_STAMP_FORMAT))
}

/// First unused `IMG_<stamp>.jpg` path in `folder`, adding `_1`, `_2`, ... on collisions.
pub fn unused_capture_path(folder: &Path, at: NaiveDateTime) -> PathBuf {
    let stem = capture_stem(at);
    let first = folder.join(format!("{stem}.{CAPTURE_EXTENSION}"));
    if !first.exists() {
        return first;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = folder.join(format!("{stem}_{counter}.{CAPTURE_EXTENSION}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(11, 0, 5).unwrap()
    }

    #[test]
    fn stem_uses_compact_local_stamp() {
        assert_eq!(capture_stem(noon()), "IMG_20240102_110005");
    }

    #[test]
    fn collisions_get_counter_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = unused_capture_path(dir.path(), noon());
        assert_eq!(first.file_name().unwrap(), "IMG_20240102_110005.jpg");

        fs::write(&first, b"a").unwrap();
        let second = unused_capture_path(dir.path(), noon());
        assert_eq!(second.file_name().unwrap(), "IMG_20240102_110005_1.jpg");

        fs::write(&second, b"b").unwrap();
        let third = unused_capture_path(dir.path(), noon());
        assert_eq!(third.file_name().unwrap(), "IMG_20240102_110005_2.jpg");
        assert!(!third.exists());
    }

    #[test]
    fn gaps_in_the_sequence_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["IMG_20240102_110005.jpg", "IMG_20240102_110005_2.jpg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let next = unused_capture_path(dir.path(), noon());
        assert_eq!(next.file_name().unwrap(), "IMG_20240102_110005_1.jpg");
        assert!(!next.exists());
    }
}
