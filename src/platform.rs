//! Sidecar binary resolution.
//!
//! Maps the host platform onto the published binary name and locates the
//! executable on disk. Pure lookups plus existence checks; nothing here
//! launches anything.

use std::path::PathBuf;

use crate::config::{BINARY_ENV_VAR, HookConfig};
use crate::sidecar::error::{Result, SidecarError};

/// Published binary name for an OS family / CPU architecture pair.
///
/// The mapping is closed: the release pipeline only ships these five
/// artifacts, so anything else resolves to `None`. OS and architecture
/// strings follow `std::env::consts` conventions.
pub fn binary_name(os: &str, arch: &str) -> Option<&'static str> {
    match (os, arch) {
        ("windows", "x86_64") => Some("hook-windows-amd64.exe"),
        ("macos", "x86_64") => Some("hook-darwin-amd64"),
        ("macos", "aarch64") => Some("hook-darwin-arm64"),
        ("linux", "x86_64") => Some("hook-linux-amd64"),
        ("linux", "aarch64") => Some("hook-linux-arm64"),
        _ => None,
    }
}

/// Resolve the on-disk path of the sidecar executable.
///
/// An explicit override (`HIPHOPS_HOOK_BIN`) wins and is only validated for
/// existence. Otherwise the platform-named binary is expected under the
/// configured install directory, placed there by the provisioning step.
pub fn resolve_binary_path(config: &HookConfig) -> Result<PathBuf> {
    if let Some(ref override_path) = config.binary_override {
        if !override_path.exists() {
            return Err(SidecarError::Config {
                reason: format!(
                    "binary path set in {BINARY_ENV_VAR} does not exist: {}",
                    override_path.display()
                ),
            });
        }
        return Ok(override_path.clone());
    }

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    let name = binary_name(os, arch).ok_or_else(|| SidecarError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    })?;

    let path = config.install_dir.join(name);
    if !path.exists() {
        return Err(SidecarError::BinaryNotFound {
            path: path.display().to_string(),
        });
    }

    Ok(path)
}
