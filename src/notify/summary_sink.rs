use std::sync::Arc;
use async_trait::async_trait;
use crate::error::Result;
use crate::notify::NotificationSink;
use crate::types::{RateSnapshot, SinkId};

pub const DEFAULT_TRACKED: [&str; 4] = ["USD", "EUR", "GBP", "CNY"];

/// Renders a fixed set of tracked currencies to the console log.
pub struct SummarySink {
    id: SinkId,
    tracked: Vec<String>,
}

impl SummarySink {
    pub fn new(tracked: Vec<String>) -> Self {
        let tracked = if tracked.is_empty() {
            DEFAULT_TRACKED.iter().map(|c| c.to_string()).collect()
        } else {
            tracked.into_iter().map(|c| c.to_uppercase()).collect()
        };

        SummarySink {
            id: SinkId::new(),
            tracked,
        }
    }

    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// One line per tracked currency present in the snapshot; absent codes are skipped.
    pub fn render(&self, snapshot: &RateSnapshot) -> Vec<String> {
        self.tracked
            .iter()
            .filter_map(|code| {
                snapshot.get(code).map(|entry| {
                    format!("{} ({}): {:.4} RUB", code, entry.name(), entry.rate_per_unit())
                })
            })
            .collect()
    }
}

impl Default for SummarySink {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl NotificationSink for SummarySink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        "summary"
    }

    async fn update(&self, snapshot: Arc<RateSnapshot>) -> Result<()> {
        tracing::info!(target: "rate_watch::display", "Rate update ({})", snapshot.taken_at().to_rfc3339());
        for line in self.render(&snapshot) {
            tracing::info!(target: "rate_watch::display", "{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_snapshot;

    #[test]
    fn test_default_tracked_set() {
        let sink = SummarySink::default();
        assert_eq!(sink.tracked(), &["USD", "EUR", "GBP", "CNY"]);
    }

    #[test]
    fn test_renders_only_tracked_codes_in_order() {
        let sink = SummarySink::new(vec!["eur".to_string(), "USD".to_string(), "JPY".to_string()]);
        let snapshot = sample_snapshot(&[("USD", 75.0, 1), ("EUR", 90.5, 1), ("GBP", 100.0, 1)]);

        let lines = sink.render(&snapshot);
        assert_eq!(lines, vec![
            "EUR (EUR name): 90.5000 RUB".to_string(),
            "USD (USD name): 75.0000 RUB".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_missing_tracked_code_is_not_an_error() {
        let sink = SummarySink::new(vec!["XAU".to_string()]);
        let snapshot = Arc::new(sample_snapshot(&[("USD", 75.0, 1)]));

        assert!(sink.render(&snapshot).is_empty());
        assert!(sink.update(snapshot).await.is_ok());
    }
}
