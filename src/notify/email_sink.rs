use std::fmt::Write;
use std::sync::Arc;
use async_trait::async_trait;
use crate::error::Result;
use crate::notify::NotificationSink;
use crate::types::{RateSnapshot, SinkId};

pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

/// Bounded-preview notifier: the message body lists at most `preview_limit`
/// currencies in feed document order. There is no mail transport; the body goes to the log.
pub struct EmailSink {
    id: SinkId,
    recipient: String,
    preview_limit: usize,
}

impl EmailSink {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self::with_preview_limit(recipient, DEFAULT_PREVIEW_LIMIT)
    }

    pub fn with_preview_limit(recipient: impl Into<String>, preview_limit: usize) -> Self {
        EmailSink {
            id: SinkId::new(),
            recipient: recipient.into(),
            preview_limit,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn compose(&self, snapshot: &RateSnapshot) -> String {
        let mut body = format!("Currency rates update at {}:\n\n", snapshot.taken_at().to_rfc3339());
        for (code, entry) in snapshot.in_feed_order().take(self.preview_limit) {
            let _ = writeln!(body, "{} ({}): {:.4} RUB", code, entry.name(), entry.rate_per_unit());
        }
        body
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        "email"
    }

    async fn update(&self, snapshot: Arc<RateSnapshot>) -> Result<()> {
        let body = self.compose(&snapshot);
        tracing::info!(recipient = %self.recipient, "Email notification:\n{}", body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_snapshot;

    #[test]
    fn test_body_is_capped_at_preview_limit() {
        let sink = EmailSink::with_preview_limit("admin@example.com", 2);
        let snapshot = sample_snapshot(&[("USD", 75.0, 1), ("EUR", 90.0, 1), ("GBP", 100.0, 1)]);

        let body = sink.compose(&snapshot);
        assert!(body.contains("USD (USD name): 75.0000 RUB"));
        assert!(body.contains("EUR (EUR name): 90.0000 RUB"));
        assert!(!body.contains("GBP"));
    }

    #[test]
    fn test_default_limit_is_five() {
        let sink = EmailSink::new("admin@example.com");
        let snapshot = sample_snapshot(&[
            ("AUD", 50.0, 1), ("CAD", 55.0, 1), ("CHF", 85.0, 1),
            ("CNY", 10.0, 1), ("EUR", 90.0, 1), ("USD", 75.0, 1),
        ]);

        let body = sink.compose(&snapshot);
        assert_eq!(body.lines().filter(|l| l.ends_with("RUB")).count(), 5);
        assert_eq!(sink.recipient(), "admin@example.com");
    }

    #[test]
    fn test_preview_follows_feed_order_not_code_order() {
        let sink = EmailSink::with_preview_limit("admin@example.com", 2);
        let snapshot = sample_snapshot(&[("USD", 75.0, 1), ("AUD", 50.0, 1), ("CAD", 55.0, 1)]);

        let lines: Vec<String> = sink.compose(&snapshot)
            .lines()
            .filter(|l| l.ends_with("RUB"))
            .map(str::to_string)
            .collect();
        assert_eq!(lines, vec!["USD (USD name): 75.0000 RUB", "AUD (AUD name): 50.0000 RUB"]);
    }
}
