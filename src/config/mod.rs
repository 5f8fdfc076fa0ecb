pub mod loader;
pub mod settings;

pub use loader::AppConfig;
pub use settings::{FeedConfig, LoggingConfig, MonitorConfig, ServerConfig, SinkConfig};
