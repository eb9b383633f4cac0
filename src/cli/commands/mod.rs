//! CLI command implementations

pub mod activate;
pub mod current;
pub mod help;
pub mod list;
pub mod remove;
pub mod use_file;
