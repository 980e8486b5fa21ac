//! License information returned by the sidecar's `/license` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims identifying the licensed installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiphopsClaims {
    /// Identity the license was issued to.
    #[serde(default)]
    pub identity: String,
    /// Project the license applies to.
    #[serde(default)]
    pub project_id: String,
}

/// Verification outcome plus raw license claims.
///
/// `verified == false` is a normal response, not an error; `verify_failures`
/// lists the reasons (e.g. `missing_license_token`). Claim contents are kept
/// as raw JSON since their shape is owned by the license issuer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// Whether the license token verified against the public key.
    #[serde(default)]
    pub verified: bool,
    /// Machine-readable reasons verification failed.
    #[serde(default)]
    pub verify_failures: Vec<String>,
    /// License claims as issued.
    #[serde(default)]
    pub license: Map<String, Value>,
    /// Installation identity claims.
    #[serde(default)]
    pub hiphops: HiphopsClaims,
}
