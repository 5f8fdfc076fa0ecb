use crate::config::settings::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub feed: FeedConfig,
    pub sinks: SinkConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// `config/default`, then `config/{env}`, then `RATEWATCH__SECTION__KEY` variables.
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from("config", env)
    }

    pub fn load_from(dir: &str, env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(
                Environment::with_prefix("RATEWATCH")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sinks.tracked_currencies")
                    .with_list_parse_key("sinks.email_recipients")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.monitor.poll_interval_secs == 0 {
            return Err(Error::Config("monitor.poll_interval_secs must be positive".to_string()));
        }
        if self.feed.timeout_secs == 0 {
            return Err(Error::Config("feed.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
