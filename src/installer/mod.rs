//! Version installation and activation
//!
//! An activation runs these steps in order:
//! cache root, version directory, release directory, download + verify,
//! extract, relink, smoke test.
//! Versions already in the cache skip download and extraction but are
//! still relinked and smoke-tested.

pub mod downloader;
pub mod extractor;
pub mod guard;
pub mod linker;
pub mod smoke;

use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::{
    ensure_dir, ChnodeError, ChnodeResult, Config, DirState, InstallationPaths, VersionSpec,
};

pub use downloader::{Fetch, HttpFetcher};
pub use guard::PendingInstall;
pub use smoke::SmokeReport;

/// Whether the version directory existed when activation began
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    Installing,
    Restoring,
}

/// Activation progress, reported to the observer as each step completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    DirectoryResolved,
    Installing,
    Restoring,
    Acquired,
    Extracted,
    Relinked,
    Verified,
    Done,
}

impl Stage {
    /// Short description for progress output
    pub fn describe(self) -> &'static str {
        match self {
            Stage::Start => "Starting",
            Stage::DirectoryResolved => "Checking for an existing installation",
            Stage::Installing => "Downloading release",
            Stage::Restoring => "Restoring from cache",
            Stage::Acquired => "Extracting release",
            Stage::Extracted => "Linking binaries",
            Stage::Relinked => "Verifying binaries",
            Stage::Verified => "Finishing",
            Stage::Done => "Done",
        }
    }
}

/// A successful activation
#[derive(Debug, Clone, Serialize)]
pub struct Activation {
    pub version: String,
    pub mode: ActivationMode,
    pub release_dir: PathBuf,
    pub bytes_downloaded: u64,
    pub smoke: SmokeReport,
}

type StageObserver<'a> = Box<dyn Fn(Stage) + Send + Sync + 'a>;

/// Drives one version from request to verified global symlinks
pub struct Activator<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetch,
    observer: Option<StageObserver<'a>>,
}

impl<'a> Activator<'a> {
    /// Create a new activator
    pub fn new(config: &'a Config, fetcher: &'a dyn Fetch) -> Self {
        Self {
            config,
            fetcher,
            observer: None,
        }
    }

    /// Report every stage transition to `observer`
    pub fn with_observer(mut self, observer: impl Fn(Stage) + Send + Sync + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn enter(&self, stage: Stage) {
        tracing::debug!(?stage, "activation stage");
        if let Some(ref observer) = self.observer {
            observer(stage);
        }
    }

    /// Install `version` if needed and make it the active version
    pub async fn activate(&self, version: &VersionSpec) -> ChnodeResult<Activation> {
        self.enter(Stage::Start);
        let paths = InstallationPaths::resolve(version, self.config)?;

        if ensure_dir(&paths.cache_root)? == DirState::Created {
            tracing::info!("Created cache root {}", paths.cache_root.display());
        }
        self.enter(Stage::DirectoryResolved);

        let (mode, pending) = claim_version_dir(&paths)?;
        self.enter(match mode {
            ActivationMode::Installing => Stage::Installing,
            ActivationMode::Restoring => Stage::Restoring,
        });

        ensure_dir(&paths.release_dir)?;

        let bytes_downloaded = downloader::acquire(self.fetcher, &paths, mode).await?;
        self.enter(Stage::Acquired);

        // Off the async thread so a Ctrl-C lands before the commit below
        let stop = pending
            .as_ref()
            .map(PendingInstall::stop_flag)
            .unwrap_or_default();
        let extract_paths = paths.clone();
        tokio::task::spawn_blocking(move || extractor::install(&extract_paths, mode, &stop))
            .await
            .map_err(|e| ChnodeError::extract(&paths.archive, format!("extraction task failed: {}", e)))??;
        self.enter(Stage::Extracted);

        // The release is complete; later failures must not remove it
        if let Some(pending) = pending {
            pending.commit();
        }

        linker::relink(&paths.links)?;
        self.enter(Stage::Relinked);

        let smoke = smoke::verify(&paths.links).await?;
        self.enter(Stage::Verified);

        self.enter(Stage::Done);
        Ok(Activation {
            version: version.to_string(),
            mode,
            release_dir: paths.release_dir,
            bytes_downloaded,
            smoke,
        })
    }
}

/// Decide between install and restore, creating the version directory if needed.
///
/// A fresh directory comes back wrapped in a cleanup guard.
fn claim_version_dir(
    paths: &InstallationPaths,
) -> ChnodeResult<(ActivationMode, Option<PendingInstall>)> {
    match std::fs::metadata(&paths.version_dir) {
        Ok(_) => {
            tracing::info!("Found cached {}", paths.version_dir.display());
            Ok((ActivationMode::Restoring, None))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            ensure_dir(&paths.version_dir)?;
            tracing::info!("Installing into {}", paths.version_dir.display());
            Ok((
                ActivationMode::Installing,
                Some(PendingInstall::new(paths.version_dir.clone())),
            ))
        }
        Err(source) => Err(ChnodeError::Directory {
            path: paths.version_dir.clone(),
            source,
        }),
    }
}
