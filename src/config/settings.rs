use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::feed::cbrf::CBRF_DAILY_URL;
use crate::notify::email_sink::DEFAULT_PREVIEW_LIMIT;
use crate::notify::log_sink::DEFAULT_LOG_PATH;
use crate::notify::summary_sink::DEFAULT_TRACKED;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url: CBRF_DAILY_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    pub log_path: String,
    pub tracked_currencies: Vec<String>,
    pub email_recipients: Vec<String>,
    pub email_preview_limit: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            log_path: DEFAULT_LOG_PATH.to_string(),
            tracked_currencies: DEFAULT_TRACKED.iter().map(|c| c.to_string()).collect(),
            email_recipients: Vec::new(),
            email_preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}
