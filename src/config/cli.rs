use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::core::ZonePolicy;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "fabric-aggregator")]
#[command(about = "Accepts port provisioning requests and dispatches them to the fabric bus")]
pub struct CliConfig {
    #[arg(long, env = "LISTEN_ADDR", help = "HTTP listen address [default: 0.0.0.0:8080]")]
    pub listen_addr: Option<String>,

    #[arg(long, env = "NATS_URL", help = "NATS broker URL [default: nats://127.0.0.1:4222]")]
    pub nats_url: Option<String>,

    #[arg(
        long,
        env = "DISPATCH_TIMEOUT_SECS",
        help = "Deadline for one broker publish, in seconds [default: 5]"
    )]
    pub dispatch_timeout_secs: Option<u64>,

    #[arg(long, value_enum, help = "How fabric zones are checked before use in a subject [default: strict]")]
    pub zone_policy: Option<ZonePolicy>,

    #[arg(long, short = 'c', help = "Optional TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Layers defaults, then the config file, then flags and environment.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.to_settings(),
            None => Settings::default(),
        };

        if let Some(addr) = non_blank(&self.listen_addr) {
            settings.listen_addr = addr;
        }
        if let Some(url) = non_blank(&self.nats_url) {
            settings.nats_url = url;
        }
        if let Some(secs) = self.dispatch_timeout_secs {
            settings.dispatch_timeout_secs = secs;
        }
        if let Some(policy) = self.zone_policy {
            settings.zone_policy = policy;
        }
        settings.json_logs |= self.json_logs;
        settings.verbose |= self.verbose;

        Ok(settings)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}
