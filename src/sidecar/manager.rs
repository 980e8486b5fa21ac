//! Sidecar lifecycle coordination.
//!
//! [`SidecarManager::ensure_ready`] is the single entry point: adopt a
//! sidecar that is already listening, or launch one and poll until it is.
//! The startup protocol runs at most once per manager, no matter how many
//! callers race it, and its outcome — success or failure — is cached for
//! the manager's whole lifetime. A failed manager stays failed; retrying
//! means constructing a new one (in practice, a new host process).

use std::sync::{Arc, Mutex, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::config::HookConfig;
use crate::platform;
use crate::sidecar::error::{Result, SidecarError};
use crate::sidecar::probe;
use crate::sidecar::process::ProcessSupervisor;

/// Connection state of the sidecar, as observed by this manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No startup attempt has begun.
    Unstarted,
    /// The one-shot startup protocol is in flight.
    Starting,
    /// The sidecar is accepting connections.
    Ready,
    /// The startup attempt failed; terminal for this manager.
    Failed,
}

type AttemptFuture = Shared<BoxFuture<'static, std::result::Result<(), SidecarError>>>;

/// Coordinates sidecar startup and ownership for one client instance.
///
/// Cheap to clone; clones share the same state machine and supervised
/// process. State moves forward only: `Unstarted → Starting → {Ready,
/// Failed}`.
#[derive(Clone)]
pub struct SidecarManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: HookConfig,
    supervisor: ProcessSupervisor,
    state: RwLock<ConnectionState>,
    attempt: Mutex<Option<AttemptFuture>>,
}

impl SidecarManager {
    /// Create a new manager. No I/O happens until the first `ensure_ready`.
    pub fn new(config: HookConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                supervisor: ProcessSupervisor::new(),
                state: RwLock::new(ConnectionState::Unstarted),
                attempt: Mutex::new(None),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the sidecar was observed ready.
    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// The socket address requests should use.
    pub fn socket_path(&self) -> &std::path::Path {
        &self.inner.config.socket_path
    }

    /// Ensure the sidecar is running and accepting connections.
    ///
    /// Idempotent and safe to call concurrently: the first caller creates
    /// the startup attempt, everyone else — concurrent or later — awaits
    /// the same memoized outcome. The attempt itself runs on a detached
    /// task, so a caller that gives up waiting does not abort it.
    pub async fn ensure_ready(&self) -> Result<()> {
        let attempt = {
            let mut slot = self.inner.attempt.lock().unwrap_or_else(|e| e.into_inner());
            slot.get_or_insert_with(|| {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.startup().await })
                    .map(|joined| {
                        joined.unwrap_or_else(|e| {
                            Err(SidecarError::Io {
                                reason: format!("startup task failed: {e}"),
                            })
                        })
                    })
                    .boxed()
                    .shared()
            })
            .clone()
        };

        attempt.await
    }

    /// Terminate a sidecar this manager launched (no-op after adoption).
    ///
    /// For host-process teardown; the state machine is not reset, matching
    /// the no-retry rule for failed managers.
    pub fn shutdown(&self) {
        self.inner.supervisor.terminate();
    }

    /// Whether this manager launched its own sidecar process.
    pub fn launched_process(&self) -> bool {
        self.inner.supervisor.has_child()
    }
}

impl Inner {
    /// Run the one-shot startup protocol and record its outcome.
    async fn startup(&self) -> Result<()> {
        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            *state = ConnectionState::Starting;
        }

        let outcome = self.adopt_or_launch().await;

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match &outcome {
            Ok(()) => {
                *state = ConnectionState::Ready;
                tracing::info!(
                    socket = %self.config.socket_path.display(),
                    launched = self.supervisor.has_child(),
                    "Sidecar ready"
                );
            }
            Err(e) => {
                *state = ConnectionState::Failed;
                tracing::warn!(error = %e, "Sidecar startup failed");
            }
        }

        outcome
    }

    async fn adopt_or_launch(&self) -> Result<()> {
        let socket = &self.config.socket_path;

        // Another process on this machine may already own a live sidecar;
        // the socket is the mutual-exclusion signal.
        if probe::is_ready(socket).await {
            tracing::info!(socket = %socket.display(), "Adopting existing sidecar");
            return Ok(());
        }

        // A socket file that refuses connections is debris from a crashed
        // sidecar and would make the fresh bind fail.
        if probe::socket_file_present(socket) {
            tracing::debug!(socket = %socket.display(), "Removing stale socket file");
            let _ = std::fs::remove_file(socket);
        }

        let binary = platform::resolve_binary_path(&self.config)?;
        self.supervisor.launch(&binary)?;

        self.wait_for_ready().await
    }

    /// Poll until the sidecar accepts connections, it dies, or time runs out.
    async fn wait_for_ready(&self) -> Result<()> {
        let socket = &self.config.socket_path;
        let deadline = Instant::now() + self.config.startup_timeout;

        loop {
            if probe::is_ready(socket).await {
                return Ok(());
            }

            if let Some(code) = self.supervisor.try_exited() {
                // The sidecar binds the socket exclusively and exits
                // non-zero when another launcher won the race. If the
                // winner is live now, adopt it instead of failing.
                if probe::is_ready(socket).await {
                    tracing::info!(
                        socket = %socket.display(),
                        "Our launch lost the bind race; adopting the winner"
                    );
                    return Ok(());
                }
                self.supervisor.terminate();
                return Err(SidecarError::ProcessExit { code });
            }

            if Instant::now() >= deadline {
                self.supervisor.terminate();
                return Err(SidecarError::Timeout {
                    timeout: self.config.startup_timeout,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
