//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::Utc;
use crate::broadcast::connection::PushConnection;
use crate::error::{Error, Result};
use crate::feed::RateFeed;
use crate::notify::NotificationSink;
use crate::types::{ConnectionId, RateEntry, RateSnapshot, SinkId};

pub fn sample_snapshot(rates: &[(&str, f64, i64)]) -> RateSnapshot {
    let rates = rates.iter().map(|(code, value, nominal)| {
        let entry = RateEntry::new(code, format!("{} name", code), *nominal, *value, value.to_string())
            .unwrap();
        (code.to_string(), entry)
    });
    RateSnapshot::from_feed_order(Utc::now(), "19.10.2026", rates)
}

pub struct RecordingSink {
    id: SinkId,
    name: String,
    received: Mutex<Vec<Arc<RateSnapshot>>>,
}

impl RecordingSink {
    pub fn new(name: &str) -> Self {
        RecordingSink {
            id: SinkId::new(),
            name: name.to_string(),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<Arc<RateSnapshot>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn update(&self, snapshot: Arc<RateSnapshot>) -> Result<()> {
        self.received.lock().unwrap().push(snapshot);
        Ok(())
    }
}

pub struct FailingSink {
    id: SinkId,
}

impl FailingSink {
    pub fn new() -> Self {
        FailingSink { id: SinkId::new() }
    }
}

#[async_trait]
impl NotificationSink for FailingSink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        "failing"
    }

    async fn update(&self, _snapshot: Arc<RateSnapshot>) -> Result<()> {
        Err(Error::delivery("failing", "sink unavailable"))
    }
}

pub struct PanickingSink {
    id: SinkId,
}

impl PanickingSink {
    pub fn new() -> Self {
        PanickingSink { id: SinkId::new() }
    }
}

#[async_trait]
impl NotificationSink for PanickingSink {
    fn id(&self) -> SinkId {
        self.id
    }

    fn name(&self) -> &str {
        "panicking"
    }

    async fn update(&self, _snapshot: Arc<RateSnapshot>) -> Result<()> {
        panic!("sink exploded");
    }
}

/// Feed that replays a fixed script of results, then keeps failing.
pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<RateSnapshot>>>,
    calls: Mutex<usize>,
}

impl ScriptedFeed {
    pub fn new(script: Vec<Result<RateSnapshot>>) -> Self {
        ScriptedFeed {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RateFeed for ScriptedFeed {
    async fn fetch(&self) -> Result<RateSnapshot> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Fetch("script exhausted".to_string())))
    }

    fn source(&self) -> &str {
        "scripted"
    }
}

/// Connection that records every message, optionally failing each send.
pub struct RecordingConnection {
    id: ConnectionId,
    fail: bool,
    sent: Mutex<Vec<String>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        RecordingConnection {
            id: ConnectionId::new(),
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        RecordingConnection {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushConnection for RecordingConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::delivery(self.id.to_string(), "socket closed"));
        }
        Ok(())
    }
}
