//! Release checksum verification against a SHASUMS256 manifest

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::{ChnodeError, ChnodeResult};

/// Parsed `sha256sum`-style manifest: one `<hex>  <file name>` per line
#[derive(Debug, Clone, Default)]
pub struct ChecksumManifest {
    entries: Vec<(String, String)>,
}

impl ChecksumManifest {
    /// Parse manifest text, skipping lines that are not checksum entries
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let hash = parts.next()?;
                let name = parts.next()?;
                if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                    return None;
                }
                // `*` marks binary mode in sha256sum output
                let name = name.strip_prefix('*').unwrap_or(name);
                Some((name.to_string(), hash.to_ascii_lowercase()))
            })
            .collect();

        Self { entries }
    }

    /// Load and parse a manifest file
    pub fn load(path: &Path) -> ChnodeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Expected checksum for `file_name`
    pub fn checksum_for(&self, file_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, hash)| hash.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Compute the hex SHA-256 of a file without loading it into memory
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Verify `archive` against its entry in the manifest at `manifest_path`
pub fn verify_archive(archive: &Path, manifest_path: &Path, file_name: &str) -> ChnodeResult<()> {
    let manifest = ChecksumManifest::load(manifest_path)?;
    tracing::debug!(
        "Loaded {} checksum entries from {}",
        manifest.len(),
        manifest_path.display()
    );

    let expected = manifest
        .checksum_for(file_name)
        .ok_or_else(|| ChnodeError::ChecksumMissing {
            file: file_name.to_string(),
        })?;

    let actual = sha256_file(archive)?;
    if actual != expected {
        return Err(ChnodeError::ChecksumMismatch {
            file: file_name.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    tracing::debug!("{} matches sha256 {}", file_name, actual);
    Ok(())
}
