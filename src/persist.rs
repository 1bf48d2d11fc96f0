//! Operator snapshots.
//!
//! Snapshots land in a single directory as `img_<unix_seconds>.jpg`. Two saves
//! within the same second write the same path; the later one wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageFormat;
use thiserror::Error;

use crate::decode::DecodedImage;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create snapshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("system clock is before the unix epoch")]
    Clock(#[from] std::time::SystemTimeError),
}

/// Where saved frames go.
pub trait PersistenceSink {
    fn save(&mut self, image: &DecodedImage) -> Result<PathBuf, PersistError>;
}

/// Saves JPEG snapshots into one directory, created on first use.
#[derive(Clone, Debug)]
pub struct SnapshotDir {
    dir: PathBuf,
}

impl SnapshotDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PersistenceSink for SnapshotDir {
    fn save(&mut self, image: &DecodedImage) -> Result<PathBuf, PersistError> {
        save_snapshot(image, &self.dir)
    }
}

/// Save `image` under `dir` using the current wall-clock second.
pub fn save_snapshot(image: &DecodedImage, dir: &Path) -> Result<PathBuf, PersistError> {
    save_snapshot_at(image, dir, SystemTime::now())
}

pub fn save_snapshot_at(
    image: &DecodedImage,
    dir: &Path,
    at: SystemTime,
) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(snapshot_file_name(at)?);
    image
        .save_with_format(&path, ImageFormat::Jpeg)
        .map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

pub fn snapshot_file_name(at: SystemTime) -> Result<String, PersistError> {
    let secs = at.duration_since(UNIX_EPOCH)?.as_secs();
    Ok(format!("img_{}.jpg", secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::time::Duration;

    fn sample() -> DecodedImage {
        DecodedImage::from_pixel(16, 12, Rgb([10, 200, 10]))
    }

    #[test]
    fn file_name_uses_unix_seconds() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_900);
        assert_eq!(snapshot_file_name(at).unwrap(), "img_1700000000.jpg");
    }

    #[test]
    fn save_creates_missing_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("nested").join("snaps");
        let path = save_snapshot(&sample(), &dir).expect("save");

        assert!(path.starts_with(&dir));
        let written = image::open(&path).expect("reopen snapshot");
        assert_eq!(written.to_rgb8().dimensions(), (16, 12));
    }

    #[test]
    fn same_second_overwrites() {
        let root = tempfile::tempdir().expect("tempdir");
        let at = UNIX_EPOCH + Duration::from_secs(42);
        let first = save_snapshot_at(&sample(), root.path(), at).expect("first save");
        let second = save_snapshot_at(&sample(), root.path(), at).expect("second save");
        assert_eq!(first, second);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let root = tempfile::tempdir().expect("tempdir");
        let blocker = root.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();
        let err = save_snapshot(&sample(), &blocker.join("snaps")).unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }
}
