//! Supervised sidecar process handle.
//!
//! Owns the child process when this client instance launched the sidecar
//! (adoption leaves the slot empty). The handle is kept behind a sync
//! mutex — never held across an await — so termination stays callable from
//! exit hooks and `Drop`.

use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::{Child, Command};

use crate::sidecar::error::{Result, SidecarError};

/// Launches and owns at most one sidecar child process.
#[derive(Default)]
pub struct ProcessSupervisor {
    child: Mutex<Option<Child>>,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the sidecar binary, detached from the parent's stdio.
    ///
    /// The sidecar logs through its own channels; inheriting pipes would
    /// couple the parent to the child's I/O buffers. `kill_on_drop` backs up
    /// the explicit termination paths so the child cannot outlive us.
    pub fn launch(&self, binary: &Path) -> Result<()> {
        let mut slot = self.child.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Err(SidecarError::Spawn {
                binary: binary.display().to_string(),
                reason: "sidecar already launched by this supervisor".to_string(),
            });
        }

        let child = Command::new(binary)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SidecarError::Spawn {
                binary: binary.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            pid = child.id().unwrap_or_default(),
            binary = %binary.display(),
            "Spawned sidecar process"
        );

        *slot = Some(child);
        Ok(())
    }

    /// Non-blocking early-exit check.
    ///
    /// Returns `Some(exit_code)` once the child has terminated, where the
    /// inner `None` means killed by signal. Returns `None` while the child
    /// is running, and also when nothing was launched (an adopted sidecar
    /// has no handle to observe).
    pub fn try_exited(&self) -> Option<Option<i32>> {
        let mut slot = self.child.lock().unwrap_or_else(|e| e.into_inner());
        let child = slot.as_mut()?;

        match child.try_wait() {
            Ok(Some(status)) => Some(status.code()),
            Ok(None) => None,
            Err(e) => {
                tracing::trace!(error = %e, "try_wait on sidecar child failed");
                None
            }
        }
    }

    /// Best-effort kill of the supervised child.
    ///
    /// Idempotent and safe on an already-dead or never-launched handle.
    pub fn terminate(&self) {
        let mut slot = self.child.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(child) = slot.as_mut() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Sidecar kill failed (likely already dead)");
            }
            // Reap immediately if the exit is already observable.
            let _ = child.try_wait();
            tracing::info!(pid = child.id().unwrap_or_default(), "Terminated sidecar process");
        }
    }

    /// Whether this supervisor launched a child (false on adoption).
    pub fn has_child(&self) -> bool {
        self.child
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    async fn wait_for_exit(supervisor: &ProcessSupervisor) -> Option<i32> {
        for _ in 0..100 {
            if let Some(code) = supervisor.try_exited() {
                return code;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("sidecar child never exited");
    }

    #[tokio::test]
    async fn test_launch_and_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "long-runner", "sleep 30");

        let supervisor = ProcessSupervisor::new();
        supervisor.launch(&script).unwrap();
        assert!(supervisor.has_child());
        assert!(supervisor.try_exited().is_none());

        supervisor.terminate();
        let code = wait_for_exit(&supervisor).await;
        assert_eq!(code, None, "killed child reports no exit code");
    }

    #[tokio::test]
    async fn test_early_exit_surfaces_code() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fails-fast", "exit 7");

        let supervisor = ProcessSupervisor::new();
        supervisor.launch(&script).unwrap();

        assert_eq!(wait_for_exit(&supervisor).await, Some(7));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_typed() {
        let supervisor = ProcessSupervisor::new();
        let err = supervisor
            .launch(Path::new("/nonexistent/hook-binary"))
            .unwrap_err();

        assert!(matches!(err, SidecarError::Spawn { .. }));
        assert!(!supervisor.has_child());
    }

    #[tokio::test]
    async fn test_second_launch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "long-runner", "sleep 30");

        let supervisor = ProcessSupervisor::new();
        supervisor.launch(&script).unwrap();
        let err = supervisor.launch(&script).unwrap_err();
        assert!(matches!(err, SidecarError::Spawn { .. }));

        supervisor.terminate();
    }

    #[tokio::test]
    async fn test_terminate_is_idempotent() {
        let supervisor = ProcessSupervisor::new();
        // Nothing launched: both calls are no-ops.
        supervisor.terminate();
        supervisor.terminate();
        assert!(!supervisor.has_child());
    }
}
