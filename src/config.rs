// src/config.rs
//
// Session configuration. All values have defaults so the console runs with no
// config file at all; an optional TOML file overrides them. The polling limit
// is deliberately carried here rather than in a static so it is explicit,
// testable, and ready for a concurrent reimplementation.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on buffered messages per receive call and on driver-side
/// buffering.
fn default_poll_limit() -> usize {
    50_000
}

/// Maximum devices requested per enumeration.
fn default_scan_capacity() -> usize {
    99
}

/// Maximum event records requested per queue read.
fn default_event_capacity() -> usize {
    99
}

/// Devices presented by the simulated driver.
fn default_sim_devices() -> usize {
    2
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_poll_limit")]
    pub poll_limit: usize,
    #[serde(default = "default_scan_capacity")]
    pub scan_capacity: usize,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    #[serde(default = "default_sim_devices")]
    pub sim_devices: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            poll_limit: default_poll_limit(),
            scan_capacity: default_scan_capacity(),
            event_capacity: default_event_capacity(),
            sim_devices: default_sim_devices(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file. Missing keys fall back to their
    /// defaults; a missing or malformed file is an error the caller reports.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&text)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
    }
}
