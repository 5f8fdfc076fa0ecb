use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use crate::error::Result;
use crate::notify::NotificationSink;
use crate::types::{RateSnapshot, SinkId};

pub const DEFAULT_LOG_PATH: &str = "currency_changes.log";

#[derive(Serialize)]
struct LogRecord<'a> {
    timestamp: String,
    changes: BTreeMap<&'a str, LoggedRate<'a>>,
}

#[derive(Serialize)]
struct LoggedRate<'a> {
    name: &'a str,
    rate: f64,
    nominal: i64,
}

/// Appends one JSON line per published snapshot to a log file.
pub struct LogSink {
    id: SinkId,
    path: PathBuf,
    // Serialises appends so concurrent updates never interleave lines
    write_lock: Mutex<()>,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LogSink {
            id: SinkId::new(),
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(snapshot: &RateSnapshot) -> Result<String> {
        let record = LogRecord {
            timestamp: snapshot.taken_at().to_rfc3339(),
            changes: snapshot.rates()
                .iter()
                .map(|(code, entry)| {
                    (code.as_str(), LoggedRate {
                        name: entry.name(),
                        rate: entry.rate_per_unit(),
                        nominal: entry.nominal(),
                    })
                })
                .collect(),
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        Ok(line)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH)
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        "log"
    }

    async fn update(&self, snapshot: Arc<RateSnapshot>) -> Result<()> {
        let line = Self::render(&snapshot)?;

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(path = %self.path.display(), currencies = snapshot.len(), "Rates appended to log");
        Ok(())
    }
}
