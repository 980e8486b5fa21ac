//! Sidecar lifecycle supervision.
//!
//! Ensures exactly one hook sidecar is reachable on the well-known socket,
//! whether this process launched it or another one did. The sidecar is a
//! persistent local service:
//! - started on first request (lazy initialization),
//! - shared by every client on the machine via the socket address,
//! - polled for readiness after launch,
//! - cleaned up when the host process exits.
//!
//! # Architecture
//!
//! ```text
//! ensure_ready()
//!       │
//!       ▼
//! ┌─────────────┐ live ┌─────────┐
//! │ Probe socket│─────▶│  Adopt  │
//! └─────────────┘      └─────────┘
//!       │ dead
//!       ▼
//! ┌─────────────┐      ┌─────────────┐      ┌──────────────────────┐
//! │ Resolve bin │─────▶│ Spawn child │─────▶│ Poll until ready /   │
//! │ (platform)  │      │ (null stdio)│      │ exit / timeout       │
//! └─────────────┘      └─────────────┘      └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use hiphops_hook::config::HookConfig;
//! use hiphops_hook::sidecar::SidecarManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = SidecarManager::new(HookConfig::from_env()?);
//!
//! // Adopt-or-launch; at most one attempt regardless of concurrent callers.
//! manager.ensure_ready().await?;
//!
//! // Kill the child (if we launched one) on the way out.
//! manager.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod manager;
pub mod probe;
pub mod process;

pub use error::{Result, SidecarError};
pub use manager::{ConnectionState, SidecarManager};
pub use process::ProcessSupervisor;
