//! Core module for chnode
//!
//! Version parsing, configuration, path resolution and error types.

pub mod config;
pub mod error;
pub mod paths;
pub mod platform;
pub mod project;
pub mod version;

pub use config::Config;
pub use error::{ChnodeError, ChnodeResult};
pub use paths::{ensure_dir, Binary, BinaryLink, DirState, InstallationPaths};
pub use version::VersionSpec;
