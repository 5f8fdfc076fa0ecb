use std::sync::Arc;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::types::ConnectionId;

/// A live push channel to one subscriber.
#[async_trait]
pub trait PushConnection: Send + Sync {
    fn id(&self) -> ConnectionId;
    async fn send_text(&self, text: &str) -> Result<()>;
}

/// Connection backed by a bounded queue that a per-socket writer task drains.
///
/// A full queue means the subscriber is not keeping up; the message is dropped
/// and reported as a delivery failure rather than stalling the broadcast.
pub struct ChannelConnection {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl ChannelConnection {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        ChannelConnection {
            id: ConnectionId::new(),
            tx,
        }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl PushConnection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.tx.try_send(text.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => Error::delivery(self.id.to_string(), "outbound queue full"),
            TrySendError::Closed(_) => Error::delivery(self.id.to_string(), "connection closed"),
        })
    }
}

/// Set of open connections keyed by id.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<dyn PushConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry {
            connections: DashMap::new(),
        }
    }

    /// Returns false if the connection was already registered.
    pub fn add(&self, connection: Arc<dyn PushConnection>) -> bool {
        let added = self.connections.insert(connection.id(), connection).is_none();
        metrics::OPEN_CONNECTIONS.set(self.connections.len() as i64);
        added
    }

    pub fn remove(&self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();
        metrics::OPEN_CONNECTIONS.set(self.connections.len() as i64);
        removed
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Point-in-time copy, so no shard lock is held across a send.
    pub fn snapshot(&self) -> Vec<Arc<dyn PushConnection>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}
