//! Postal configuration

use std::{fmt, time::Duration};

use clap::Parser;

/// Postal connection details
#[derive(Clone, Parser)]
pub struct PostalConfig {
    /// The base URI of the Postal server
    #[arg(long = "postal-url", env = "POSTAL_ADDR")]
    pub base_uri: String,

    /// The server API key sent as `X-Server-API-Key`
    #[arg(long = "postal-token", env = "POSTAL_TOKEN", hide_env_values = true)]
    pub api_key: String,

    /// Request timeout in seconds
    #[arg(long = "postal-timeout", env = "POSTAL_TIMEOUT", default_value = "10")]
    pub timeout_secs: u64,
}

impl PostalConfig {
    /// The request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for PostalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostalConfig")
            .field("base_uri", &self.base_uri)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
