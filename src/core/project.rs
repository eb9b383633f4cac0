//! Project-local version file lookup

use std::path::{Path, PathBuf};

use crate::core::{ChnodeError, ChnodeResult, VersionSpec};

/// Find `file_name` in `start` or the nearest ancestor directory
pub fn find_version_file(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Resolve the version pinned for the project containing `start`
pub fn project_version(start: &Path, file_name: &str) -> ChnodeResult<(VersionSpec, PathBuf)> {
    let path = find_version_file(start, file_name).ok_or_else(|| {
        ChnodeError::VersionFileNotFound {
            name: file_name.to_string(),
            start: start.to_path_buf(),
        }
    })?;

    tracing::debug!("Reading version from {}", path.display());
    let version = VersionSpec::from_file(&path)?;
    Ok((version, path))
}
