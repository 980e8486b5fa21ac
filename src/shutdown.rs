//! Host-exit teardown hooks.
//!
//! The supervised sidecar must not outlive the host process. Hosts create
//! one [`ShutdownHooks`] registry, let clients register their teardown, and
//! call [`ShutdownHooks::run`] on the way out (signal handler, end of
//! `main`, or both — the registry fires exactly once).

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type Hook = Box<dyn FnOnce() + Send>;

/// Registry of teardown callbacks executed exactly once at host exit.
///
/// Safe to run at any point in the client lifecycle, including before
/// startup ever completed — hooks are expected to be best-effort and
/// idempotent.
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<Hook>>,
    fired: AtomicBool,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teardown callback.
    ///
    /// If shutdown has already fired, the hook runs immediately so late
    /// registrants still get cleaned up.
    pub fn register(&self, hook: impl FnOnce() + Send + 'static) {
        if self.fired.load(Ordering::SeqCst) {
            hook();
            return;
        }

        let mut hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        // Re-check under the lock so a hook registered while `run` drains
        // cannot be silently dropped.
        if self.fired.load(Ordering::SeqCst) {
            drop(hooks);
            hook();
            return;
        }
        hooks.push(Box::new(hook));
    }

    /// Run all registered hooks. Subsequent calls are no-ops.
    pub fn run(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        let hooks = {
            let mut guard = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };

        tracing::debug!(count = hooks.len(), "Running shutdown hooks");
        for hook in hooks {
            hook();
        }
    }

    /// Whether shutdown has fired.
    pub fn has_run(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
