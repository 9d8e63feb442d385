//! `[backend]` section configuration.
//!
//! Connection settings for the hosted REST backend. Both values are usually
//! supplied through the environment rather than committed to the config file.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[backend]` section in shopmap.toml.
///
/// # Example
/// ```toml
/// [backend]
/// url = "https://abcd.supabase.co"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Project URL (`SUPABASE_URL`).
    #[serde(default = "defaults::backend::url")]
    #[educe(Default = defaults::backend::url())]
    pub url: Option<String>,

    /// API key sent as `apikey` and bearer token (`SUPABASE_SERVICE_ROLE_KEY`).
    #[serde(default = "defaults::backend::key")]
    #[educe(Default = defaults::backend::key())]
    pub key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "defaults::backend::timeout_secs")]
    #[educe(Default = defaults::backend::timeout_secs())]
    pub timeout_secs: u64,
}
