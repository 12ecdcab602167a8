#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, ZonePolicy};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_broker_url, validate_range, validate_socket_addr, Validate,
};
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_NATS_URL: &str = "nats://127.0.0.1:4222";
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 5;
pub const MAX_DISPATCH_TIMEOUT_SECS: u64 = 300;

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub listen_addr: String,
    pub nats_url: String,
    pub dispatch_timeout_secs: u64,
    pub zone_policy: ZonePolicy,
    pub flush_on_publish: bool,
    pub json_logs: bool,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            nats_url: DEFAULT_NATS_URL.to_string(),
            dispatch_timeout_secs: DEFAULT_DISPATCH_TIMEOUT_SECS,
            zone_policy: ZonePolicy::default(),
            flush_on_publish: true,
            json_logs: false,
            verbose: false,
        }
    }
}

impl ConfigProvider for Settings {
    fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    fn nats_url(&self) -> &str {
        &self.nats_url
    }

    fn dispatch_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.dispatch_timeout_secs))
    }

    fn zone_policy(&self) -> ZonePolicy {
        self.zone_policy
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("listen_addr", &self.listen_addr)?;
        validate_broker_url("nats_url", &self.nats_url)?;
        validate_range(
            "dispatch_timeout_secs",
            self.dispatch_timeout_secs,
            1,
            MAX_DISPATCH_TIMEOUT_SECS,
        )?;
        Ok(())
    }
}
