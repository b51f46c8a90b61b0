//! Error conversion utilities

use super::types::{CacheError, RecoveryHint, SerializationOp};
use std::path::PathBuf;
use std::time::Duration;

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let recovery_hint = match error.kind() {
            ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions {
                path: PathBuf::from("."),
            },
            ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
                RecoveryHint::Retry {
                    after: Duration::from_millis(100),
                }
            }
            _ => RecoveryHint::Manual {
                instructions: "Inspect the cache directory".to_string(),
            },
        };

        Self::Io {
            path: PathBuf::from("."),
            operation: "unknown",
            source: error,
            recovery_hint,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            key: String::new(),
            operation: SerializationOp::Decode,
            source: error,
            recovery_hint: RecoveryHint::ClearAndRetry,
        }
    }
}

impl CacheError {
    /// Build an I/O error with the hint the engine uses for the given failure
    pub(crate) fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        let path = path.into();
        let recovery_hint = match source.kind() {
            std::io::ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions { path: path.clone() },
            _ => RecoveryHint::Retry {
                after: Duration::from_millis(100),
            },
        };
        Self::Io {
            path,
            operation,
            source,
            recovery_hint,
        }
    }

    /// Build a serialization error for a specific key
    pub(crate) fn serialization(key: &str, operation: SerializationOp, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.to_string(),
            operation,
            source,
            recovery_hint: RecoveryHint::ClearAndRetry,
        }
    }
}
