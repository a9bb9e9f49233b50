use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Controls how tracing is initialized at startup.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error".
    pub level: String,
    /// Output format: "json" or "console".
    pub format: String,
}
