use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Paths of the per-run intermediate files.
///
/// Names derive from the input stem so concurrent runs on different
/// inputs do not collide. Files not marked as kept are removed when the
/// value is dropped, including on error paths.
#[derive(Debug)]
pub struct Intermediates {
    pub geometry: PathBuf,
    pub descriptors: PathBuf,
    keep_geometry: bool,
    keep_descriptors: bool,
}

impl Intermediates {
    pub fn new(dir: &Path, input: &Path, keep_geometry: bool, keep_descriptors: bool) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        Self {
            geometry: dir.join(format!("{stem}_b3clf_geometry.sdf")),
            descriptors: dir.join(format!("{stem}_b3clf_descriptors.csv")),
            keep_geometry,
            keep_descriptors,
        }
    }

    /// Intermediate files that exist and will survive the run.
    pub fn kept(&self) -> Vec<PathBuf> {
        [
            (&self.geometry, self.keep_geometry),
            (&self.descriptors, self.keep_descriptors),
        ]
        .into_iter()
        .filter(|(path, keep)| *keep && path.exists())
        .map(|(path, _)| path.clone())
        .collect()
    }
}

impl Drop for Intermediates {
    fn drop(&mut self) {
        for (path, keep) in [
            (&self.geometry, self.keep_geometry),
            (&self.descriptors, self.keep_descriptors),
        ] {
            if keep || !path.exists() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed intermediate"),
                Err(err) => warn!(path = %path.display(), "could not remove intermediate: {err}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_input_stem() {
        let dir = tempfile::tempdir().unwrap();
        let files = Intermediates::new(dir.path(), Path::new("/data/screen.smi"), false, false);
        assert_eq!(files.geometry, dir.path().join("screen_b3clf_geometry.sdf"));
        assert_eq!(files.descriptors, dir.path().join("screen_b3clf_descriptors.csv"));
    }

    #[test]
    fn only_unkept_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let files = Intermediates::new(dir.path(), Path::new("in.smi"), true, false);
        fs::write(&files.geometry, "x").unwrap();
        fs::write(&files.descriptors, "x").unwrap();
        let (geometry, descriptors) = (files.geometry.clone(), files.descriptors.clone());
        assert_eq!(files.kept(), vec![geometry.clone()]);
        drop(files);
        assert!(geometry.exists());
        assert!(!descriptors.exists());
    }
}
