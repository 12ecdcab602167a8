use crate::config::Settings;
use crate::core::ZonePolicy;
use crate::utils::error::{AggregatorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub url: Option<String>,
    pub flush_on_publish: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub timeout_secs: Option<u64>,
    pub zone_policy: Option<ZonePolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AggregatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AggregatorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NATS_URL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AggregatorError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 將檔案中有設定的欄位覆蓋到 settings
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(addr) = &self.server.listen_addr {
            settings.listen_addr = addr.clone();
        }
        if let Some(url) = &self.broker.url {
            settings.nats_url = url.clone();
        }
        if let Some(flush) = self.broker.flush_on_publish {
            settings.flush_on_publish = flush;
        }
        if let Some(secs) = self.dispatch.timeout_secs {
            settings.dispatch_timeout_secs = secs;
        }
        if let Some(policy) = self.dispatch.zone_policy {
            settings.zone_policy = policy;
        }
        if let Some(json) = self.logging.json {
            settings.json_logs = json;
        }
        if let Some(verbose) = self.logging.verbose {
            settings.verbose = verbose;
        }
    }

    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::default();
        self.apply_to(&mut settings);
        settings
    }
}
