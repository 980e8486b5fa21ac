//! Error types for sidecar lifecycle management.

use thiserror::Error;

/// Result type for sidecar operations.
pub type Result<T> = std::result::Result<T, SidecarError>;

/// Errors that can occur while resolving, launching, or awaiting the sidecar.
///
/// Variants are `Clone` because a failed startup attempt is cached for the
/// lifetime of the manager and replayed to every later caller.
#[derive(Debug, Clone, Error)]
pub enum SidecarError {
    /// Configuration is invalid or points at something that does not exist.
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for error.
        reason: String,
    },

    /// No sidecar binary is published for this OS/architecture pair.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// OS family reported by the host.
        os: String,
        /// CPU architecture reported by the host.
        arch: String,
    },

    /// The platform-resolved binary is not installed where expected.
    #[error("Hook binary not found at: {path}")]
    BinaryNotFound {
        /// Path that was checked.
        path: String,
    },

    /// The OS could not create the sidecar process.
    #[error("Failed to spawn sidecar '{binary}': {reason}")]
    Spawn {
        /// Binary that was launched.
        binary: String,
        /// Reason for failure.
        reason: String,
    },

    /// The sidecar never accepted connections within the startup timeout.
    #[error("Sidecar failed to become ready within {timeout:?}")]
    Timeout {
        /// Timeout that elapsed.
        timeout: std::time::Duration,
    },

    /// The sidecar exited before it was observed ready.
    #[error("Sidecar exited during startup{}", exit_suffix(.code))]
    ProcessExit {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },

    /// I/O error outside the categories above.
    #[error("I/O error: {reason}")]
    Io {
        /// Reason for failure.
        reason: String,
    },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with code {code}"),
        None => " (killed by signal)".to_string(),
    }
}

impl From<std::io::Error> for SidecarError {
    fn from(err: std::io::Error) -> Self {
        SidecarError::Io {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_display() {
        let exited = SidecarError::ProcessExit { code: Some(3) };
        assert_eq!(
            exited.to_string(),
            "Sidecar exited during startup with code 3"
        );

        let signalled = SidecarError::ProcessExit { code: None };
        assert_eq!(
            signalled.to_string(),
            "Sidecar exited during startup (killed by signal)"
        );
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = SidecarError::Timeout {
            timeout: std::time::Duration::from_secs(5),
        };
        let replayed = err.clone();
        assert_eq!(err.to_string(), replayed.to_string());
    }
}
