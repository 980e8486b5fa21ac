//! Rust client for the HipHops `hook` sidecar.
//!
//! The hook sidecar is a separate long-running server process reached over
//! a Unix-domain socket at a well-known path. This crate makes it
//! transparent: construct one [`HookClient`], call it, and the sidecar is
//! adopted if something on the machine already runs it or launched and
//! awaited if not. Startup runs at most once per client regardless of
//! concurrent callers, failures are cached rather than retried, and a
//! sidecar launched here is torn down with the host process.
//!
//! ```rust,no_run
//! use hiphops_hook::HookClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HookClient::from_env()?;
//! let license = client.license().await?;
//! println!("verified: {}", license.verified);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod license;
pub mod platform;
pub mod shutdown;
pub mod sidecar;

pub use client::{HookClient, RequestError};
pub use config::{DEFAULT_SOCKET_PATH, HookConfig};
pub use license::{HiphopsClaims, LicenseInfo};
pub use shutdown::ShutdownHooks;
pub use sidecar::{ConnectionState, SidecarError, SidecarManager};
