//! Release downloads and checksum verification

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::cli::output;
use crate::core::config::NetworkConfig;
use crate::core::{ChnodeError, ChnodeResult, InstallationPaths};
use crate::installer::ActivationMode;
use crate::security::integrity;

/// Transfers a remote resource into a local file
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Download `uri` into `dest`, returning the number of bytes written.
    ///
    /// Either `dest` holds the complete body afterwards or it was not created.
    async fn fetch(&self, uri: &Url, dest: &Path) -> ChnodeResult<u64>;
}

/// HTTP(S) fetcher backed by reqwest
pub struct HttpFetcher {
    /// HTTP client
    client: reqwest::Client,

    /// Draw a progress bar per download
    progress: bool,
}

impl HttpFetcher {
    /// Create a new fetcher
    pub fn new(config: &NetworkConfig) -> ChnodeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("chnode/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            progress: config.progress,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, uri: &Url, dest: &Path) -> ChnodeResult<u64> {
        tracing::debug!("GET {}", uri);

        let response = self
            .client
            .get(uri.clone())
            .send()
            .await
            .map_err(|e| ChnodeError::download(uri, e))?;

        if !response.status().is_success() {
            return Err(ChnodeError::download(
                uri,
                format!("HTTP {}", response.status()),
            ));
        }

        let bar = match (self.progress, response.content_length()) {
            (true, Some(total)) => Some(output::download_progress(total)),
            _ => None,
        };

        let part = part_path(dest);
        let result = stream_to_file(response, &part, bar.as_ref()).await;

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        match result {
            Ok(written) => {
                tokio::fs::rename(&part, dest).await?;
                tracing::debug!("Wrote {} bytes to {}", written, dest.display());
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(ChnodeError::download(uri, e))
            }
        }
    }
}

/// Temporary name used while a download is in flight
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    bar: Option<&indicatif::ProgressBar>,
) -> Result<u64, String> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| format!("cannot create {}: {}", path.display(), e))?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        file.write_all(&chunk).await.map_err(|e| e.to_string())?;
        written += chunk.len() as u64;
        if let Some(bar) = bar {
            bar.set_position(written);
        }
    }

    file.flush().await.map_err(|e| e.to_string())?;
    Ok(written)
}

/// Download and verify the release archive for a version being installed.
///
/// Does nothing when restoring: a cached version never touches the network.
pub async fn acquire(
    fetcher: &dyn Fetch,
    paths: &InstallationPaths,
    mode: ActivationMode,
) -> ChnodeResult<u64> {
    if mode == ActivationMode::Restoring {
        return Ok(0);
    }

    tracing::info!("Downloading {}", paths.archive_uri);
    let archive_bytes = fetcher.fetch(&paths.archive_uri, &paths.archive).await?;

    tracing::info!("Downloading {}", paths.manifest_uri);
    let manifest_bytes = fetcher.fetch(&paths.manifest_uri, &paths.manifest).await?;

    let (archive, manifest, name) = (
        paths.archive.clone(),
        paths.manifest.clone(),
        paths.archive_name.clone(),
    );
    tokio::task::spawn_blocking(move || integrity::verify_archive(&archive, &manifest, &name))
        .await
        .map_err(|e| ChnodeError::other(format!("checksum task failed: {}", e)))??;

    Ok(archive_bytes + manifest_bytes)
}
