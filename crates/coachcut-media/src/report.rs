//! Collects coach folders and thumbnails for the coverage report.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::debug;

use coachcut_models::{thumbnail_number, CoachRecord};

use crate::error::{MediaError, MediaResult};

/// One record per sub-directory of `root`, ordered by folder name.
///
/// Images are the `.jpg` files of each folder ordered by their thumbnail
/// number, with unnumbered files last and ties broken by name.
///
/// # Errors
/// `FileNotFound` when `root` does not exist, `Io` when it cannot be listed.
pub fn collect_coach_data(root: impl AsRef<Path>) -> MediaResult<Vec<CoachRecord>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(MediaError::FileNotFound(root.to_path_buf()));
    }

    let mut folders: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        folders.push((name, entry.path()));
    }
    folders.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records = Vec::with_capacity(folders.len());
    for (name, folder) in folders {
        let images = list_thumbnails(&folder)?;
        debug!(coach = %name, images = images.len(), "Collected coach folder");
        records.push(CoachRecord { name, images });
    }

    Ok(records)
}

fn list_thumbnails(folder: &Path) -> MediaResult<Vec<PathBuf>> {
    let mut images: Vec<(Option<u32>, String, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_jpeg(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        images.push((thumbnail_number(&name), name, path));
    }

    images.sort_by(|a, b| by_thumbnail_number(a.0, b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(images.into_iter().map(|(_, _, path)| path).collect())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg"))
}

fn by_thumbnail_number(a: Option<u32>, b: Option<u32>) -> Ordering {
    a.unwrap_or(u32::MAX).cmp(&b.unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"jpg").unwrap();
    }

    #[test]
    fn test_missing_root() {
        let err = collect_coach_data("/no/such/output/root").unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[test]
    fn test_folders_sorted_and_files_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["12309_2", "12309_1"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        touch(&dir.path().join("stray.jpg"));
        touch(&dir.path().join("12309_1").join("12309_1_1.jpg"));
        touch(&dir.path().join("12309_1").join("12309_1.mp4"));
        touch(&dir.path().join("12309_2").join("12309_2_1.JPG"));

        let records = collect_coach_data(dir.path()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["12309_1", "12309_2"]);
        assert_eq!(records[0].images.len(), 1);
        assert_eq!(records[1].images.len(), 1);
    }

    #[test]
    fn test_images_in_numeric_order() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("12309_1");
        fs::create_dir(&folder).unwrap();
        for n in [10, 2, 1] {
            touch(&folder.join(format!("12309_1_{n}.jpg")));
        }
        touch(&folder.join("cover.jpg"));

        let records = collect_coach_data(dir.path()).unwrap();
        let files: Vec<_> = records[0]
            .images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            files,
            vec!["12309_1_1.jpg", "12309_1_2.jpg", "12309_1_10.jpg", "cover.jpg"]
        );
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        assert!(collect_coach_data(dir.path()).unwrap().is_empty());
    }
}
