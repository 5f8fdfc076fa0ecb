use std::sync::Arc;
use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, warn};
use crate::broadcast::connection::{ConnectionRegistry, PushConnection};
use crate::broadcast::message::ServerMessage;
use crate::error::Result;
use crate::notify::NotificationSink;
use crate::observability::metrics;
use crate::types::{ConnectionId, RateSnapshot, SinkId};

/// Sink that pushes every published snapshot to all open connections.
///
/// The snapshot is encoded once per update and each connection is written
/// independently. A failed write is logged and counted; the connection stays
/// registered until the transport reports it closed.
pub struct BroadcastSink {
    id: SinkId,
    source: String,
    connections: ConnectionRegistry,
}

impl BroadcastSink {
    pub fn new(source: impl Into<String>) -> Self {
        BroadcastSink {
            id: SinkId::new(),
            source: source.into(),
            connections: ConnectionRegistry::new(),
        }
    }

    pub fn add_connection(&self, connection: Arc<dyn PushConnection>) -> bool {
        let id = connection.id();
        let added = self.connections.add(connection);
        if added {
            info!(connection = %id, total = self.connections.len(), "Push client connected");
        }
        added
    }

    pub fn remove_connection(&self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(id);
        if removed {
            info!(connection = %id, total = self.connections.len(), "Push client disconnected");
        }
        removed
    }

    /// Register `connection` and replay `current` to it alone when non-empty.
    ///
    /// Returns whether a replay was attempted.
    pub async fn connect(&self, connection: Arc<dyn PushConnection>, current: &RateSnapshot) -> bool {
        self.add_connection(Arc::clone(&connection));
        if current.is_empty() {
            return false;
        }

        let message = match ServerMessage::replay(current, &self.source).to_json() {
            Ok(message) => message,
            Err(e) => {
                warn!("Replay encoding failed: {}", e);
                return false;
            }
        };

        if let Err(e) = connection.send_text(&message).await {
            metrics::CONNECTION_DELIVERY_FAILURES.inc();
            warn!(connection = %connection.id(), "Replay delivery failed: {}", e);
        }
        true
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }
}

#[async_trait]
impl NotificationSink for BroadcastSink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        "broadcast"
    }

    async fn update(&self, snapshot: Arc<RateSnapshot>) -> Result<()> {
        let targets = self.connections.snapshot();
        if targets.is_empty() {
            debug!("No push clients connected");
            return Ok(());
        }

        let message = ServerMessage::update(&snapshot, &self.source).to_json()?;

        let sends = targets.iter().map(|conn| {
            let message = message.as_str();
            async move { (conn.id(), conn.send_text(message).await) }
        });

        let mut failed = 0;
        for (id, result) in join_all(sends).await {
            if let Err(e) = result {
                failed += 1;
                metrics::CONNECTION_DELIVERY_FAILURES.inc();
                warn!(connection = %id, "Push delivery failed: {}", e);
            }
        }

        info!(clients = targets.len(), failed, "Snapshot pushed to clients");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_snapshot, RecordingConnection};

    #[tokio::test]
    async fn test_update_without_connections_is_noop() {
        let sink = BroadcastSink::new("CBRF");
        assert!(sink.update(Arc::new(sample_snapshot(&[("USD", 75.0, 1)]))).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_connection_does_not_stop_others() {
        let sink = BroadcastSink::new("CBRF");
        let a = Arc::new(RecordingConnection::failing());
        let b = Arc::new(RecordingConnection::new());
        sink.add_connection(a.clone());
        sink.add_connection(b.clone());

        sink.update(Arc::new(sample_snapshot(&[("USD", 75.0, 1)]))).await.unwrap();

        assert_eq!(a.sent().len(), 1);
        assert_eq!(b.sent().len(), 1);
        assert_eq!(a.sent(), b.sent());
        // failure alone does not deregister
        assert_eq!(sink.connection_count(), 2);
    }

    #[tokio::test]
    async fn test_connect_replays_current_to_new_connection_only() {
        let sink = BroadcastSink::new("CBRF");
        let existing = Arc::new(RecordingConnection::new());
        let joining = Arc::new(RecordingConnection::new());
        sink.add_connection(existing.clone());

        let current = sample_snapshot(&[("USD", 75.0, 1)]);
        assert!(sink.connect(joining.clone(), &current).await);

        assert!(existing.sent().is_empty());
        let sent = joining.sent();
        assert_eq!(sent.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["data"]["date"], "текущие");
        assert_eq!(sink.connection_count(), 2);
    }

    #[tokio::test]
    async fn test_connect_with_empty_snapshot_sends_nothing() {
        let sink = BroadcastSink::new("CBRF");
        let joining = Arc::new(RecordingConnection::new());

        assert!(!sink.connect(joining.clone(), &RateSnapshot::empty()).await);
        assert!(joining.sent().is_empty());
        assert_eq!(sink.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_removed_connection_gets_no_updates() {
        let sink = BroadcastSink::new("CBRF");
        let conn = Arc::new(RecordingConnection::new());
        sink.add_connection(conn.clone());
        assert!(sink.remove_connection(conn.id()));
        assert!(!sink.remove_connection(conn.id()));

        sink.update(Arc::new(sample_snapshot(&[("USD", 75.0, 1)]))).await.unwrap();
        assert!(conn.sent().is_empty());
    }
}
