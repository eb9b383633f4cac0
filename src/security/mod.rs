//! Release verification

pub mod integrity;
