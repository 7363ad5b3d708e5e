use anyhow::Error;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    #[clap(long, default_value = "callpop.toml")]
    pub conf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http_addr: String,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    /// Seconds between call-history sync passes.
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Telephony cloud API settings.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_token: String,
    /// Caller id presented on click-to-call legs.
    pub did_number: String,
}

/// Settings for the agent-side notification client.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct NotifyConfig {
    /// Resource locator of the looping ringtone.
    pub sound_url: String,
    /// Base URL used to build lead record links.
    pub crm_base_url: String,
}

fn default_sync_interval() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            log_level: Some("info".to_string()),
            log_file: None,
            sync_interval_secs: default_sync_interval(),
            provider: ProviderConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudphone.example.com".to_string(),
            api_token: "".to_string(),
            did_number: "".to_string(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            sound_url: "/assets/sounds/notification.mp3".to_string(),
            crm_base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        Ok(config)
    }
}
