//! Configuration handling for chnode
//!
//! Settings come from built-in defaults, an optional `config.toml`,
//! `CHNODE_*` environment variables and finally command-line flags.

use std::env;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::platform::Platform;
use crate::core::{ChnodeError, ChnodeResult};

/// Name of the per-user cache directory under `$HOME`
pub const CACHE_DIR_NAME: &str = ".chnode";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem locations
    pub dirs: DirsConfig,

    /// Release distribution
    pub dist: DistConfig,

    /// Network configuration
    pub network: NetworkConfig,

    /// Project version file lookup
    pub project: ProjectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirsConfig {
    /// Cache root holding one directory per installed version
    pub cache_dir: Option<PathBuf>,

    /// Global prefix whose `bin` directory receives the symlinks
    pub prefix: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistConfig {
    /// Base URL of the release distribution
    pub url: String,

    /// Override the detected operating system name
    pub os: Option<String>,

    /// Override the detected architecture name
    pub arch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout: u64,

    /// Show a progress bar while downloading
    pub progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// File name looked up by `chnode use`
    pub version_file: String,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            prefix: PathBuf::from("/usr/local"),
        }
    }
}

impl Default for DistConfig {
    fn default() -> Self {
        Self {
            url: "https://nodejs.org/dist/".to_string(),
            os: None,
            arch: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 300,
            progress: true,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version_file: ".node-version".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file and environment
    pub fn load() -> ChnodeResult<Self> {
        let path = match env::var_os("CHNODE_CONFIG") {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        };

        let config = match path {
            Some(ref path) if path.exists() => Self::from_file(path)?,
            _ => Config::default(),
        };

        config.apply_env_overrides().validate()
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> ChnodeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Platform config file location (e.g. `~/.config/chnode/config.toml`)
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "chnode").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(prefix) = env::var("CHNODE_PREFIX") {
            self.dirs.prefix = PathBuf::from(prefix);
        }

        if let Ok(cache_dir) = env::var("CHNODE_DIR") {
            self.dirs.cache_dir = Some(PathBuf::from(cache_dir));
        }

        if let Ok(url) = env::var("CHNODE_DIST_URL") {
            self.dist.url = url;
        }

        if let Ok(os) = env::var("CHNODE_OS") {
            self.dist.os = Some(os);
        }

        if let Ok(arch) = env::var("CHNODE_ARCH") {
            self.dist.arch = Some(arch);
        }

        if let Ok(timeout) = env::var("CHNODE_TIMEOUT") {
            match timeout.parse() {
                Ok(n) => self.network.timeout = n,
                Err(_) => tracing::warn!("Ignoring invalid CHNODE_TIMEOUT: {}", timeout),
            }
        }

        self
    }

    /// Reject settings no activation could work with
    fn validate(self) -> ChnodeResult<Self> {
        let name = &self.project.version_file;
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ChnodeError::config(format!(
                "project.version_file must be a plain file name, got '{}'",
                name
            )));
        }

        if self.network.timeout == 0 {
            return Err(ChnodeError::config("network.timeout must be at least 1 second"));
        }

        Ok(self)
    }

    /// Cache root, defaulting to `$HOME/.chnode`
    pub fn cache_root(&self) -> ChnodeResult<PathBuf> {
        if let Some(ref dir) = self.dirs.cache_dir {
            return Ok(dir.clone());
        }

        let home = env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
            .ok_or_else(|| ChnodeError::path("could not determine the home directory"))?;

        Ok(home.join(CACHE_DIR_NAME))
    }

    /// Directory holding the global symlinks
    pub fn global_bin_dir(&self) -> PathBuf {
        self.dirs.prefix.join("bin")
    }

    /// Distribution base URL, always with a trailing slash so joins append
    pub fn dist_url(&self) -> ChnodeResult<Url> {
        let mut raw = self.dist.url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        Url::parse(&raw)
            .map_err(|e| ChnodeError::path(format!("invalid distribution URL '{}': {}", raw, e)))
    }

    /// Target platform for release archives
    pub fn platform(&self) -> ChnodeResult<Platform> {
        Platform::resolve(self.dist.os.as_deref(), self.dist.arch.as_deref())
    }
}
