//! Configuration-error taxonomy (spec §7, first bullet).
//!
//! Anything in here is a setup-time failure: the process has not started
//! executing guest code yet and exits without a partial start. Runtime
//! hardware misuse never reaches this type — see `bus` and the individual
//! device modules for the fail-soft handling of those.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: {source}")]
    RomNotFound { path: PathBuf, #[source] source: std::io::Error },

    #[error("{path}: short rom (need at least 8 bytes)")]
    RomTooShort { path: PathBuf },

    #[error("{path}: {source}")]
    IdeImageNotFound { path: PathBuf, #[source] source: std::io::Error },
}

impl ConfigError {
    /// Process exit code per spec §6: 1 on device-setup failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
