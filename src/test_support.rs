//! Test fixtures shared by the unit tests
//!
//! - `config` - a `Config` rooted in a temporary directory
//! - `release_tarball` - a gzip tarball shaped like a Node.js release
//! - `StubFetcher` / `FailingFetcher` - in-memory `Fetch` implementations

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use url::Url;

use crate::core::{ChnodeError, ChnodeResult, Config};
use crate::installer::Fetch;

/// Configuration rooted in `root` with a fixed linux-x64 platform
pub fn config(root: &Path) -> Config {
    let mut config = Config::default();
    config.dirs.cache_dir = Some(root.join("cache"));
    config.dirs.prefix = root.join("prefix");
    config.dist.url = "https://dist.test/".to_string();
    config.dist.os = Some("linux".to_string());
    config.dist.arch = Some("x64".to_string());
    config.network.progress = false;
    config
}

/// Archive file name for `version` on the test platform
pub fn archive_name(version: &str) -> String {
    format!("node-v{}-linux-x64.tar.gz", version)
}

/// Build a release tarball whose binaries are shell scripts running `body`
pub fn release_tarball(version: &str, body: &str) -> Vec<u8> {
    let root = format!("node-v{}-linux-x64", version);
    let script = format!("#!/bin/sh\n{}\n", body);
    let mut builder = tar::Builder::new(Vec::new());

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_mode(0o755);
    dir.set_size(0);
    builder
        .append_data(&mut dir, format!("{}/", root), std::io::empty())
        .unwrap();

    for file in [
        "bin/node",
        "lib/node_modules/npm/bin/npm-cli.js",
        "lib/node_modules/npm/bin/npx-cli.js",
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(script.len() as u64);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, format!("{}/{}", root, file), script.as_bytes())
            .unwrap();
    }

    for (name, target) in [
        ("bin/npm", "../lib/node_modules/npm/bin/npm-cli.js"),
        ("bin/npx", "../lib/node_modules/npm/bin/npx-cli.js"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        builder
            .append_link(&mut header, format!("{}/{}", root, name), target)
            .unwrap();
    }

    let tar_data = builder.into_inner().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_data).unwrap();
    encoder.finish().unwrap()
}

/// SHASUMS256 manifest listing `data` under `file_name`
pub fn manifest_for(file_name: &str, data: &[u8]) -> String {
    format!(
        "{}  node-v0.0.0-headers.tar.gz\n{}  {}\n",
        "0".repeat(64),
        hex::encode(Sha256::digest(data)),
        file_name
    )
}

/// Serves fixed bodies keyed by the last URI path segment
pub struct StubFetcher {
    files: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    /// A well-formed release for `version` with a matching manifest
    pub fn release(version: &str, body: &str) -> Self {
        Self::with_archive(version, release_tarball(version, body))
    }

    /// Serve `archive` for `version`, with a manifest that matches it
    pub fn with_archive(version: &str, archive: Vec<u8>) -> Self {
        let name = archive_name(version);
        let manifest = manifest_for(&name, &archive);

        let mut files = HashMap::new();
        files.insert(name, archive);
        files.insert("SHASUMS256.txt".to_string(), manifest.into_bytes());

        Self {
            files,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the manifest with one listing a different checksum
    pub fn with_wrong_checksum(mut self) -> Self {
        let name = self
            .files
            .keys()
            .find(|k| k.ends_with(".tar.gz"))
            .cloned()
            .unwrap();
        let manifest = manifest_for(&name, b"some other archive");
        self.files
            .insert("SHASUMS256.txt".to_string(), manifest.into_bytes());
        self
    }

    /// Number of fetches performed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for StubFetcher {
    async fn fetch(&self, uri: &Url, dest: &Path) -> ChnodeResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = uri.path_segments().and_then(|s| s.last()).unwrap_or_default();

        let body = self
            .files
            .get(name)
            .ok_or_else(|| ChnodeError::download(uri, "HTTP 404 Not Found"))?;
        std::fs::write(dest, body)?;
        Ok(body.len() as u64)
    }
}

/// Fails every request, as if offline
pub struct FailingFetcher;

#[async_trait]
impl Fetch for FailingFetcher {
    async fn fetch(&self, uri: &Url, _dest: &Path) -> ChnodeResult<u64> {
        Err(ChnodeError::download(uri, "network unreachable"))
    }
}
