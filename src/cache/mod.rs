//! Inspection and removal of cached versions

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::paths::RELEASE_DIR_NAME;
use crate::core::{ChnodeError, ChnodeResult, VersionSpec};

/// A version directory in the cache root
#[derive(Debug, Clone, Serialize)]
pub struct CachedVersion {
    pub version: String,
    pub path: PathBuf,
    /// Total size of the version directory in bytes
    pub size: u64,
    /// Whether the release tree contains a node binary
    pub complete: bool,
}

/// View over the per-user version cache
pub struct VersionCache {
    /// Cache root directory
    root: PathBuf,
}

impl VersionCache {
    /// Create a cache view rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `version`
    pub fn version_dir(&self, version: &VersionSpec) -> PathBuf {
        self.root.join(version.to_string())
    }

    /// List cached versions, newest first
    pub fn list(&self) -> ChnodeResult<Vec<CachedVersion>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if VersionSpec::parse(&name).is_err() {
                continue;
            }

            let path = entry.path();
            versions.push(CachedVersion {
                complete: path.join(RELEASE_DIR_NAME).join("bin").join("node").exists(),
                size: dir_size(&path),
                version: name,
                path,
            });
        }

        versions.sort_by(|a, b| compare_versions(&b.version, &a.version));
        Ok(versions)
    }

    /// Remove a cached version, returning the bytes freed
    pub fn remove(&self, version: &VersionSpec) -> ChnodeResult<u64> {
        let dir = self.version_dir(version);
        if !dir.is_dir() {
            return Err(ChnodeError::NotInstalled(version.to_string()));
        }

        let size = dir_size(&dir);
        std::fs::remove_dir_all(&dir)?;
        tracing::info!("Removed {}", dir.display());
        Ok(size)
    }

    /// The cached version the global `node` symlink points into, if any
    pub fn active_version(&self, bin_dir: &Path) -> Option<VersionSpec> {
        let target = std::fs::read_link(bin_dir.join("node")).ok()?;
        let relative = target.strip_prefix(&self.root).ok()?;
        let name = relative.components().next()?.as_os_str().to_str()?;
        VersionSpec::parse(name).ok()
    }
}

/// Numeric versions compare as semver; anything else sorts below them by name
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| VersionSpec::parse(s).ok().and_then(|v| v.to_semver());
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

fn dir_size(path: &Path) -> u64 {
    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.metadata().map(|m| m.len()).unwrap_or(0))
        .sum()
}
