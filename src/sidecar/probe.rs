//! Readiness probing against the sidecar socket.

use std::path::Path;

use tokio::net::UnixStream;

/// Check whether a sidecar is accepting connections on `socket_path`.
///
/// A full connect attempt, not a file-existence test: a crashed sidecar
/// leaves its socket file behind, and that must read as not-ready. Every
/// failure mode (no file, refused, permission) maps to `false`; this never
/// errors and is safe to call repeatedly and concurrently.
pub async fn is_ready(socket_path: &Path) -> bool {
    match UnixStream::connect(socket_path).await {
        Ok(_stream) => true,
        Err(e) => {
            tracing::trace!(socket = %socket_path.display(), error = %e, "Probe: not ready");
            false
        }
    }
}

/// Whether a socket file is present at all, live or stale.
///
/// Used together with [`is_ready`] to detect stale socket files that must be
/// removed before a fresh sidecar can bind.
pub fn socket_file_present(socket_path: &Path) -> bool {
    socket_path.exists()
}
