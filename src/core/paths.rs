//! Filesystem and remote locations derived from a version

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::core::{ChnodeError, ChnodeResult, Config, VersionSpec};

/// Name of the checksum manifest published next to every release
pub const MANIFEST_NAME: &str = "SHASUMS256.txt";

/// Name of the extracted tree inside a version directory
pub const RELEASE_DIR_NAME: &str = "release";

/// The binaries managed through the global symlink set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Binary {
    Node,
    Npm,
    Npx,
}

impl Binary {
    /// All managed binaries, in link order
    pub const ALL: [Binary; 3] = [Binary::Node, Binary::Npm, Binary::Npx];

    /// File name inside a `bin` directory
    pub fn name(self) -> &'static str {
        match self {
            Binary::Node => "node",
            Binary::Npm => "npm",
            Binary::Npx => "npx",
        }
    }

    /// Whether this binary is probed after activation
    pub fn is_smoke_tested(self) -> bool {
        matches!(self, Binary::Node | Binary::Npm)
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One managed symlink: `destination` points at `source`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLink {
    pub binary: Binary,
    /// Binary inside the release tree
    pub source: PathBuf,
    /// Symlink in the global `bin` directory
    pub destination: PathBuf,
}

impl BinaryLink {
    /// Build the link for `binary` between a release and a global bin directory
    pub fn new(binary: Binary, release_dir: &Path, global_bin: &Path) -> Self {
        Self {
            binary,
            source: release_dir.join("bin").join(binary.name()),
            destination: global_bin.join(binary.name()),
        }
    }
}

/// Every path and URI needed to install and activate one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationPaths {
    pub cache_root: PathBuf,
    pub version_dir: PathBuf,
    pub release_dir: PathBuf,
    pub archive_name: String,
    pub archive: PathBuf,
    pub manifest: PathBuf,
    pub archive_uri: Url,
    pub manifest_uri: Url,
    pub links: [BinaryLink; 3],
}

impl InstallationPaths {
    /// Resolve all locations for `version` under `config`
    pub fn resolve(version: &VersionSpec, config: &Config) -> ChnodeResult<Self> {
        let cache_root = config.cache_root()?;
        let platform = config.platform()?;
        let dist = config.dist_url()?;

        let version_dir = cache_root.join(version.to_string());
        let release_dir = version_dir.join(RELEASE_DIR_NAME);

        let archive_name = format!("node-v{}-{}.tar.gz", version, platform);
        let archive = version_dir.join(&archive_name);
        let manifest = version_dir.join(MANIFEST_NAME);

        let release_base = dist
            .join(&format!("v{}/", version))
            .map_err(|e| ChnodeError::path(format!("release URI for v{}: {}", version, e)))?;
        let archive_uri = release_base
            .join(&archive_name)
            .map_err(|e| ChnodeError::path(format!("archive URI for v{}: {}", version, e)))?;
        let manifest_uri = release_base
            .join(MANIFEST_NAME)
            .map_err(|e| ChnodeError::path(format!("manifest URI for v{}: {}", version, e)))?;

        let global_bin = config.global_bin_dir();
        let links = Binary::ALL.map(|binary| BinaryLink::new(binary, &release_dir, &global_bin));

        Ok(Self {
            cache_root,
            version_dir,
            release_dir,
            archive_name,
            archive,
            manifest,
            archive_uri,
            manifest_uri,
            links,
        })
    }
}

/// Outcome of [`ensure_dir`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirState {
    Exists,
    Created,
}

/// Create `path` if it is missing.
///
/// Losing a creation race to another process counts as success.
pub fn ensure_dir(path: &Path) -> ChnodeResult<DirState> {
    let mut builder = std::fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o770);
    }

    match builder.create(path) {
        Ok(()) => {
            tracing::debug!("Created {}", path.display());
            Ok(DirState::Created)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(DirState::Exists),
        Err(source) => Err(ChnodeError::Directory {
            path: path.to_path_buf(),
            source,
        }),
    }
}
