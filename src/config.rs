use std::collections::BTreeMap;

use chrono::TimeDelta;

const DEFAULT_INITIAL_ALERT_MINUTES: u32 = 5;
const DEFAULT_REPEAT_ALERT_MINUTES: u32 = 60;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Alert thresholds for a single monitored container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerMonitorConfig {
    pub initial_alert_minutes: u32,
    pub repeat_alert_minutes: u32,
}

impl Default for ContainerMonitorConfig {
    fn default() -> Self {
        Self {
            initial_alert_minutes: DEFAULT_INITIAL_ALERT_MINUTES,
            repeat_alert_minutes: DEFAULT_REPEAT_ALERT_MINUTES,
        }
    }
}

impl ContainerMonitorConfig {
    /// Minimum time stopped before the first alert.
    pub fn initial_alert(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.initial_alert_minutes))
    }

    /// Minimum time between alerts while still stopped.
    pub fn repeat_alert(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.repeat_alert_minutes))
    }
}

/// Monitored containers keyed by name.
pub type MonitoredContainers = BTreeMap<String, ContainerMonitorConfig>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub containers: MonitoredContainers,
    pub telegram: TelegramConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingCredential(&'static str),
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Container
    /// entries are parsed before credentials are checked so malformed
    /// entries are always reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let containers = parse_containers(&lookup);
        let telegram = TelegramConfig::from_lookup(&lookup)?;
        Ok(Self {
            containers,
            telegram,
        })
    }
}

impl TelegramConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            non_empty(lookup(key)).ok_or(ConfigError::MissingCredential(key))
        };
        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let chat_id = required("TELEGRAM_CHAT_ID")?;
        let api_url = non_empty(lookup("TELEGRAM_API_URL"))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());
        Ok(Self {
            bot_token,
            chat_id,
            api_url,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Reads `CONTAINER_1`, `CONTAINER_2`, ... until the first missing or empty
/// key. Later entries with the same name replace earlier ones.
pub fn parse_containers<F>(lookup: &F) -> MonitoredContainers
where
    F: Fn(&str) -> Option<String>,
{
    let mut containers = MonitoredContainers::new();

    for index in 1.. {
        let key = format!("CONTAINER_{index}");
        let Some(value) = non_empty(lookup(&key)) else {
            break;
        };

        match parse_container_entry(&key, &value) {
            Some((name, config)) => {
                containers.insert(name, config);
            }
            None => log::warn!("{key} has no 'name' field, skipping it"),
        }
    }

    containers
}

/// Parses a single `name=foo;initial=2;repeat=10` entry.
fn parse_container_entry(key: &str, value: &str) -> Option<(String, ContainerMonitorConfig)> {
    let mut name = None;
    let mut config = ContainerMonitorConfig::default();

    for part in value.split(';') {
        let Some((k, v)) = part.split_once('=') else {
            continue;
        };
        let v = v.trim();
        match k.trim().to_lowercase().as_str() {
            "name" => name = Some(v.to_string()),
            "initial" => {
                if let Some(minutes) = parse_minutes(key, "initial", v) {
                    config.initial_alert_minutes = minutes;
                }
            }
            "repeat" => {
                if let Some(minutes) = parse_minutes(key, "repeat", v) {
                    config.repeat_alert_minutes = minutes;
                }
            }
            _ => {}
        }
    }

    name.filter(|n| !n.is_empty()).map(|n| (n, config))
}

fn parse_minutes(key: &str, field: &str, value: &str) -> Option<u32> {
    match value.parse::<u32>() {
        Ok(minutes) if minutes > 0 => Some(minutes),
        _ => {
            log::warn!("{key}: invalid '{field}' value {value:?}, using the default");
            None
        }
    }
}
