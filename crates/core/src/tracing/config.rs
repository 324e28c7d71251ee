//! Configuration for tracing and instrumentation

use serde::{Deserialize, Serialize};

/// Main instrumentation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// Service name attached to emitted events
    pub service_name: String,
    /// Log level filter (e.g., "info", "debug", "hireflow_frontend_common=trace")
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            service_name: "hireflow".to_string(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}
