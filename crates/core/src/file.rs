//! Filesystem touchpoints: one synchronous read or write, no retry.

use std::path::{Path, PathBuf};

use crate::error::{DecodeError, EncodeError};

/// Expand a leading `~` or `~/` to `$HOME`. Other paths come back unchanged,
/// as does any path when `HOME` is unset.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Create or overwrite the file at `path` (tilde-expanded) with `bytes`.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), EncodeError> {
    let path = expand_tilde(path);
    match std::fs::write(&path, bytes) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote encoded json");
            Ok(())
        }
        Err(source) => {
            tracing::debug!(
                path = %path.display(),
                error = %source,
                "failed to write encoded json"
            );
            Err(EncodeError::FailedToCreateFile { path, source })
        }
    }
}

/// Read the whole file at `path` (tilde-expanded).
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, DecodeError> {
    let path = expand_tilde(path);
    match std::fs::read(&path) {
        Ok(bytes) => {
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "read json file");
            Ok(bytes)
        }
        Err(source) => {
            tracing::debug!(path = %path.display(), error = %source, "json file unreadable");
            Err(DecodeError::FileNotFound { path, source })
        }
    }
}
