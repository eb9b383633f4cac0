//! Global symlink management (`<prefix>/bin/{node,npm,npx}`)

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{Binary, BinaryLink, ChnodeError, ChnodeResult};

/// Current state of one global symlink
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatus {
    pub binary: Binary,
    pub path: PathBuf,
    /// Where the symlink points, if it is a symlink
    pub target: Option<PathBuf>,
    /// Whether the target resolves to an existing file
    pub resolves: bool,
}

/// Remove the current global symlinks.
///
/// Missing entries are fine. Returns how many were removed.
pub fn unlink_all(links: &[BinaryLink]) -> ChnodeResult<usize> {
    let mut removed = 0;

    for link in links {
        match std::fs::remove_file(&link.destination) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ChnodeError::Symlink {
                    path: link.destination.clone(),
                    source,
                })
            }
        }
    }

    Ok(removed)
}

/// Point every destination at its release binary
pub fn link_all(links: &[BinaryLink]) -> ChnodeResult<()> {
    for link in links {
        create_symlink(&link.source, &link.destination).map_err(|source| ChnodeError::Symlink {
            path: link.destination.clone(),
            source,
        })?;
        tracing::debug!(
            "Linked {} -> {}",
            link.destination.display(),
            link.source.display()
        );
    }

    Ok(())
}

/// Replace the global symlink set with `links`
pub fn relink(links: &[BinaryLink]) -> ChnodeResult<()> {
    if let Some(bin_dir) = links.first().and_then(|l| l.destination.parent()) {
        std::fs::create_dir_all(bin_dir).map_err(|source| ChnodeError::Symlink {
            path: bin_dir.to_path_buf(),
            source,
        })?;
    }

    let removed = unlink_all(links)?;
    tracing::debug!("Removed {} previous symlinks", removed);
    link_all(links)
}

/// Inspect the managed symlinks in `bin_dir`
pub fn inspect(bin_dir: &Path) -> Vec<LinkStatus> {
    Binary::ALL
        .iter()
        .map(|&binary| {
            let path = bin_dir.join(binary.name());
            let target = std::fs::read_link(&path).ok();
            let resolves = path.is_file();
            LinkStatus {
                binary,
                path,
                target,
                resolves,
            }
        })
        .collect()
}

#[cfg(unix)]
fn create_symlink(source: &Path, destination: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, destination)
}

#[cfg(not(unix))]
fn create_symlink(_source: &Path, _destination: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "global symlinks require a unix platform",
    ))
}
