//! High-level hook client facade.
//!
//! [`HookClient`] wires the lifecycle manager and the request layer
//! together: every request first ensures the sidecar is ready (a no-op
//! once it is), then performs one GET over the socket.
//!
//! A host application constructs **one** client and shares it for the
//! process lifetime; there is no implicit global instance. Wire
//! [`HookClient::register_shutdown_hook`] (or call
//! [`HookClient::shutdown`]) into process teardown so a sidecar launched
//! here never outlives its host.
//!
//! # Example
//!
//! ```rust,no_run
//! use hiphops_hook::client::HookClient;
//! use hiphops_hook::shutdown::ShutdownHooks;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hooks = ShutdownHooks::new();
//! let client = HookClient::from_env()?;
//! client.register_shutdown_hook(&hooks);
//!
//! let info = client.license().await?;
//! println!("license verified: {}", info.verified);
//!
//! hooks.run();
//! # Ok(())
//! # }
//! ```

pub mod error;
mod http;

use crate::config::HookConfig;
use crate::license::LicenseInfo;
use crate::shutdown::ShutdownHooks;
use crate::sidecar::{self, SidecarManager};

pub use error::{RequestError, Result};

/// Client for the hook sidecar: lifecycle supervision plus requests.
pub struct HookClient {
    manager: SidecarManager,
    config: HookConfig,
}

impl HookClient {
    /// Create a client with explicit configuration.
    pub fn new(config: HookConfig) -> Self {
        Self {
            manager: SidecarManager::new(config.clone()),
            config,
        }
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> sidecar::Result<Self> {
        Ok(Self::new(HookConfig::from_env()?))
    }

    /// Ensure the sidecar is up without issuing a request.
    ///
    /// Useful for hosts that want startup cost paid at boot rather than on
    /// the first call.
    pub async fn ensure_ready(&self) -> sidecar::Result<()> {
        self.manager.ensure_ready().await
    }

    /// Perform `GET path` against the sidecar and return the JSON body.
    pub async fn request(&self, path: &str) -> Result<serde_json::Value> {
        self.manager.ensure_ready().await?;
        http::get_json(
            self.manager.socket_path(),
            path,
            self.config.request_timeout,
        )
        .await
    }

    /// Fetch license information from the sidecar.
    pub async fn license(&self) -> Result<LicenseInfo> {
        let body = self.request("/license").await?;
        serde_json::from_value(body).map_err(|e| RequestError::ResponseParse {
            reason: e.to_string(),
        })
    }

    /// Lifecycle state, for observability.
    pub fn state(&self) -> sidecar::ConnectionState {
        self.manager.state()
    }

    /// Terminate a sidecar this client launched. Idempotent.
    pub fn shutdown(&self) {
        self.manager.shutdown();
    }

    /// Register this client's teardown with the host's exit hooks.
    pub fn register_shutdown_hook(&self, hooks: &ShutdownHooks) {
        let manager = self.manager.clone();
        hooks.register(move || manager.shutdown());
    }
}

impl Drop for HookClient {
    fn drop(&mut self) {
        if self.manager.launched_process() {
            tracing::debug!("Hook client dropped; terminating supervised sidecar");
            self.manager.shutdown();
        }
    }
}
