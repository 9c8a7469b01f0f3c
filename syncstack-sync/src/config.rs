//! Client configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syncstack_types::Encoding;

/// Configuration shared by the orchestrator and the HTTP transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Parameter encoding used when a call does not pick one.
    pub default_encoding: Encoding,
    /// `User-Agent` sent by the HTTP transport.
    pub user_agent: String,
    /// Static headers added to every request.
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout honoured by the HTTP transport (ms). None waits
    /// indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_encoding: Encoding::Json,
            user_agent: concat!("syncstack/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: BTreeMap::new(),
            timeout_ms: None,
        }
    }
}

impl SyncConfig {
    /// Parses and validates a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration.
    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a static header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Checks the values a transport cannot work with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.user_agent.trim().is_empty() {
            return Err(SyncError::Config("user_agent must not be empty".into()));
        }
        if self.timeout_ms == Some(0) {
            return Err(SyncError::Config("timeout_ms must be positive".into()));
        }
        for name in self.headers.keys() {
            let valid = !name.is_empty()
                && name
                    .bytes()
                    .all(|b| b.is_ascii_graphic() && b != b':');
            if !valid {
                return Err(SyncError::Config(format!("invalid header name {name:?}")));
            }
        }
        Ok(())
    }
}
