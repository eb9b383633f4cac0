//! Error types for chnode

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chnode operations
pub type ChnodeResult<T> = Result<T, ChnodeError>;

/// Main error type for chnode
#[derive(Error, Debug)]
pub enum ChnodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse version number '{0}' (expected major.minor.patch)")]
    InvalidVersion(String),

    #[error("Version input is too large ({size} bytes, limit is {limit})")]
    InputTooLarge { size: usize, limit: usize },

    #[error("No {name} file found in {start} or any parent directory")]
    VersionFileNotFound { name: String, start: PathBuf },

    #[error("Failed to construct path: {0}")]
    Path(String),

    #[error("Failed to ensure directory {path} exists: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download {uri}: {reason}")]
    Download { uri: String, reason: String },

    #[error("Failed to verify release signatures for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Checksum manifest has no entry for {file}")]
    ChecksumMissing { file: String },

    #[error("Failed to extract {archive}: {reason}")]
    Extract { archive: PathBuf, reason: String },

    #[error("Failed to update symlink {path}: {source}")]
    Symlink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Smoke test failed: {0}")]
    SmokeTest(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("v{0} is not installed")]
    NotInstalled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interrupted")]
    Interrupted,

    #[error("{0}")]
    Other(String),
}

impl ChnodeError {
    /// Create a generic error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ChnodeError::Other(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ChnodeError::Config(msg.into())
    }

    /// Create a path construction error
    pub fn path<S: Into<String>>(msg: S) -> Self {
        ChnodeError::Path(msg.into())
    }

    /// Create a download error
    pub fn download<U: ToString, R: ToString>(uri: U, reason: R) -> Self {
        ChnodeError::Download {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an extraction error
    pub fn extract<R: ToString>(archive: impl Into<PathBuf>, reason: R) -> Self {
        ChnodeError::Extract {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable failure category
    pub fn category(&self) -> &'static str {
        match self {
            ChnodeError::InvalidVersion(_)
            | ChnodeError::InputTooLarge { .. }
            | ChnodeError::VersionFileNotFound { .. } => "parse",
            ChnodeError::Path(_) | ChnodeError::UnsupportedPlatform(_) => "path",
            ChnodeError::Directory { .. } => "directory",
            ChnodeError::Download { .. } | ChnodeError::Http(_) => "fetch",
            ChnodeError::ChecksumMismatch { .. } | ChnodeError::ChecksumMissing { .. } => "verify",
            ChnodeError::Extract { .. } => "extract",
            ChnodeError::Symlink { .. } => "symlink",
            ChnodeError::SmokeTest(_) => "smoke-test",
            ChnodeError::Config(_) | ChnodeError::Toml(_) => "config",
            ChnodeError::NotInstalled(_) => "cache",
            ChnodeError::Interrupted => "interrupted",
            ChnodeError::Io(_) | ChnodeError::Json(_) | ChnodeError::Other(_) => "io",
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ChnodeError::Interrupted => 130,
            _ => 1,
        }
    }
}
