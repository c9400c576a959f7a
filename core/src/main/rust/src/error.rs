// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Error types.
//!
//! `ProbeError` never leaves the crate's public evaluation API: every probe
//! failure is absorbed by [`crate::probe::run_probe`] and turned into "signal
//! absent". `ConfigError` is returned from configuration loading only.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while gathering a single piece of evidence.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not available on this host")]
    Unavailable(&'static str),

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },
}

impl ProbeError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            ProbeError::PermissionDenied { path }
        } else {
            ProbeError::Io { path, source }
        }
    }
}

/// Failure while loading a [`crate::config::TrustConfig`] or a policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown policy preset '{0}' (expected permissive, moderate or strict)")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_classified() {
        let err = ProbeError::from_io(
            "/data/adb/magisk",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, ProbeError::PermissionDenied { .. }));
        assert_eq!(err.to_string(), "permission denied: /data/adb/magisk");
    }

    #[test]
    fn test_other_io_errors_keep_source() {
        let err = ProbeError::from_io("/proc/self/maps", io::Error::from(io::ErrorKind::Other));
        assert!(matches!(err, ProbeError::Io { .. }));
    }
}
