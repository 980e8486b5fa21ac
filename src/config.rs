//! Client configuration resolved from the environment.
//!
//! Everything has a sensible default; the environment only overrides.
//! [`HookConfig::from_env`] also picks up a `.env` file in the working
//! directory, matching how hosts typically carry their hook settings.

use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::sidecar::error::SidecarError;

/// Well-known local socket address the hook sidecar listens on.
///
/// Fixed for the life of the host environment; every client on the machine
/// shares it, which is what lets a second client adopt an already-running
/// sidecar instead of launching its own.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/hiphops.sock";

/// Environment variable naming an explicit sidecar binary to run.
pub const BINARY_ENV_VAR: &str = "HIPHOPS_HOOK_BIN";

/// Configuration for a hook client instance.
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Path to the sidecar's Unix socket.
    pub socket_path: PathBuf,
    /// Explicit sidecar binary path, bypassing platform resolution.
    pub binary_override: Option<PathBuf>,
    /// Directory the platform-named binary is installed under.
    pub install_dir: PathBuf,
    /// Time to wait for the sidecar to accept connections after launch.
    pub startup_timeout: Duration,
    /// Interval between readiness probes while starting.
    pub poll_interval: Duration,
    /// Upper bound on a single request round-trip.
    pub request_timeout: Duration,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            binary_override: None,
            install_dir: default_install_dir(),
            startup_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl HookConfig {
    /// Resolve configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `HIPHOPS_SOCK`, `HIPHOPS_HOOK_BIN`,
    /// `HIPHOPS_INSTALL_DIR`, `HIPHOPS_STARTUP_TIMEOUT_MS`,
    /// `HIPHOPS_POLL_INTERVAL_MS`, `HIPHOPS_REQUEST_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, SidecarError> {
        // Load .env if present; already-set variables win.
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        Ok(Self {
            socket_path: optional_env("HIPHOPS_SOCK")?
                .map(PathBuf::from)
                .unwrap_or(defaults.socket_path),
            binary_override: optional_env(BINARY_ENV_VAR)?.map(PathBuf::from),
            install_dir: optional_env("HIPHOPS_INSTALL_DIR")?
                .map(PathBuf::from)
                .unwrap_or(defaults.install_dir),
            startup_timeout: parse_optional_env::<u64>("HIPHOPS_STARTUP_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.startup_timeout),
            poll_interval: parse_optional_env::<u64>("HIPHOPS_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            request_timeout: parse_optional_env::<u64>("HIPHOPS_REQUEST_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
        })
    }
}

/// Default directory the provisioning step installs binaries under.
fn default_install_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("/usr/local/share"))
        .join("hiphops")
        .join("bin")
}

/// Read an environment variable that may be absent.
fn optional_env(key: &str) -> Result<Option<String>, SidecarError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(SidecarError::Config {
            reason: format!("{key} is not valid unicode"),
        }),
    }
}

/// Read and parse an environment variable that may be absent.
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, SidecarError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|raw| {
            raw.parse::<T>().map_err(|e| SidecarError::Config {
                reason: format!("{key}: invalid value '{raw}': {e}"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HookConfig::default();

        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert!(config.binary_override.is_none());
        assert_eq!(config.startup_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_install_dir_under_hiphops() {
        let dir = default_install_dir();
        assert!(dir.ends_with("hiphops/bin"));
    }

    #[test]
    fn test_absent_variables_fall_back() {
        let missing = parse_optional_env::<u64>("HIPHOPS_TEST_UNSET_VARIABLE").unwrap();
        assert!(missing.is_none());

        let missing = optional_env("HIPHOPS_TEST_UNSET_VARIABLE").unwrap();
        assert!(missing.is_none());
    }
}
