//! Platform and architecture naming as used by the Node.js distribution

use std::fmt;

use crate::core::{ChnodeError, ChnodeResult};

/// An OS/architecture pair in distribution naming (e.g. `linux` / `x64`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Create a platform from explicit names
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the platform, letting either half be overridden
    pub fn resolve(os: Option<&str>, arch: Option<&str>) -> ChnodeResult<Self> {
        let os = match os {
            Some(os) => os,
            None => detect_os()?,
        };
        let arch = match arch {
            Some(arch) => arch,
            None => detect_arch()?,
        };

        Ok(Self::new(os, arch))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn detect_os() -> ChnodeResult<&'static str> {
    if cfg!(target_os = "linux") {
        Ok("linux")
    } else if cfg!(target_os = "macos") {
        Ok("darwin")
    } else {
        Err(ChnodeError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

fn detect_arch() -> ChnodeResult<&'static str> {
    if cfg!(target_arch = "x86_64") {
        Ok("x64")
    } else if cfg!(target_arch = "aarch64") {
        Ok("arm64")
    } else if cfg!(target_arch = "arm") {
        Ok("armv7l")
    } else if cfg!(target_arch = "powerpc64") {
        Ok("ppc64le")
    } else if cfg!(target_arch = "s390x") {
        Ok("s390x")
    } else {
        Err(ChnodeError::UnsupportedPlatform(
            std::env::consts::ARCH.to_string(),
        ))
    }
}
