//! Release tarball extraction

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, Entry, EntryType};

use crate::core::{ChnodeError, ChnodeResult, InstallationPaths};
use crate::installer::guard::StopFlag;
use crate::installer::ActivationMode;

/// Extract the verified archive into the release directory.
///
/// Does nothing when restoring. Returns the number of entries unpacked.
/// Stops with [`ChnodeError::Interrupted`] once `stop` is raised.
pub fn install(paths: &InstallationPaths, mode: ActivationMode, stop: &StopFlag) -> ChnodeResult<usize> {
    if mode == ActivationMode::Restoring {
        return Ok(0);
    }

    let count = extract_release(&paths.archive, &paths.release_dir, stop)?;
    tracing::info!("Extracted {} entries to {}", count, paths.release_dir.display());
    Ok(count)
}

/// Unpack a gzip tarball into `dest`, dropping its single top-level directory
pub fn extract_release(archive_path: &Path, dest: &Path, stop: &StopFlag) -> ChnodeResult<usize> {
    if stop.is_stopped() {
        return Err(ChnodeError::Interrupted);
    }

    let file = File::open(archive_path).map_err(|e| ChnodeError::extract(archive_path, e))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let mut count = 0;

    let entries = archive
        .entries()
        .map_err(|e| ChnodeError::extract(archive_path, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ChnodeError::extract(archive_path, e))?;
        let entry_path = entry
            .path()
            .map_err(|e| ChnodeError::extract(archive_path, e))?
            .into_owned();

        let Some(relative) = strip_top_level(&entry_path) else {
            tracing::debug!("Skipping top-level entry {}", entry_path.display());
            continue;
        };
        check_path(&relative, archive_path)?;

        stop.run(|| unpack_entry(&mut entry, &relative, dest, archive_path))
            .ok_or(ChnodeError::Interrupted)??;

        count += 1;
    }

    if count == 0 {
        return Err(ChnodeError::extract(archive_path, "archive contains no release files"));
    }

    Ok(count)
}

fn unpack_entry<R: io::Read>(
    entry: &mut Entry<'_, R>,
    relative: &Path,
    dest: &Path,
    archive_path: &Path,
) -> ChnodeResult<()> {
    let entry_type = entry.header().entry_type();

    // Directories are merged into whatever sits at their path, so the leaf counts too
    check_inside(dest, relative, entry_type == EntryType::Directory, archive_path)?;

    let target = dest.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ChnodeError::extract(archive_path, e))?;
    }

    match entry_type {
        EntryType::Link => {
            // Hard link names are archive paths too, so they need re-rooting
            let link_name = entry
                .link_name()
                .map_err(|e| ChnodeError::extract(archive_path, e))?
                .ok_or_else(|| ChnodeError::extract(archive_path, "hard link without target"))?;
            let source = strip_top_level(&link_name).ok_or_else(|| {
                ChnodeError::extract(archive_path, "hard link outside release root")
            })?;
            check_path(&source, archive_path)?;
            check_inside(dest, &source, false, archive_path)?;
            std::fs::hard_link(dest.join(source), &target)
                .map_err(|e| ChnodeError::extract(archive_path, e))?;
        }
        _ => {
            entry
                .unpack(&target)
                .map_err(|e| ChnodeError::extract(archive_path, format!("{}: {}", relative.display(), e)))?;
        }
    }

    Ok(())
}

/// Drop the first path component, or `None` if nothing remains
fn strip_top_level(path: &Path) -> Option<PathBuf> {
    let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
    components.next()?;
    let rest: PathBuf = components.collect();
    if rest.as_os_str().is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Reject entries that would land outside the release directory
fn check_path(path: &Path, archive: &Path) -> ChnodeResult<()> {
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

    if escapes || path.to_string_lossy().contains('\0') {
        return Err(ChnodeError::extract(
            archive,
            format!("unsafe path in archive: {}", path.display()),
        ));
    }

    Ok(())
}

/// Reject `relative` when a directory on its way down from `dest` is a symlink.
///
/// An earlier entry may have planted a symlink pointing anywhere; writing
/// through it would land outside `dest`.
fn check_inside(dest: &Path, relative: &Path, include_leaf: bool, archive: &Path) -> ChnodeResult<()> {
    let components: Vec<Component<'_>> = relative.components().collect();
    let depth = if include_leaf {
        components.len()
    } else {
        components.len().saturating_sub(1)
    };

    let mut current = dest.to_path_buf();
    for component in &components[..depth] {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(ChnodeError::extract(
                    archive,
                    format!("{} passes through symlink {}", relative.display(), current.display()),
                ));
            }
            Ok(_) => {}
            // Everything below a missing directory is created fresh
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => return Err(ChnodeError::extract(archive, e)),
        }
    }

    Ok(())
}
