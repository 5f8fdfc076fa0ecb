use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::types::RateSnapshot;

/// `date` value marking an on-connect replay of the current snapshot.
pub const REPLAY_DATE_SENTINEL: &str = "текущие";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireRate {
    pub rate: f64,
    pub name: String,
    pub nominal: i64,
    pub value: f64,
    pub original_value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrencyUpdateData {
    pub timestamp: String,
    pub date: String,
    pub rates: BTreeMap<String, WireRate>,
    pub source: String,
    pub total_currencies: usize,
}

impl CurrencyUpdateData {
    pub fn from_snapshot(snapshot: &RateSnapshot, source: &str) -> Self {
        CurrencyUpdateData {
            timestamp: snapshot.taken_at().to_rfc3339(),
            date: snapshot.source_date().to_string(),
            rates: snapshot.rates()
                .iter()
                .map(|(code, entry)| {
                    (code.clone(), WireRate {
                        rate: entry.rate_per_unit(),
                        name: entry.name().to_string(),
                        nominal: entry.nominal(),
                        value: entry.raw_value(),
                        original_value: entry.raw_value_text().to_string(),
                    })
                })
                .collect(),
            source: source.to_string(),
            total_currencies: snapshot.len(),
        }
    }
}

/// Messages pushed to subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    CurrencyUpdate { data: CurrencyUpdateData },
    Subscribed { message: String },
}

impl ServerMessage {
    pub fn update(snapshot: &RateSnapshot, source: &str) -> Self {
        ServerMessage::CurrencyUpdate {
            data: CurrencyUpdateData::from_snapshot(snapshot, source),
        }
    }

    pub fn replay(snapshot: &RateSnapshot, source: &str) -> Self {
        let mut data = CurrencyUpdateData::from_snapshot(snapshot, source);
        data.date = REPLAY_DATE_SENTINEL.to_string();
        ServerMessage::CurrencyUpdate { data }
    }

    pub fn subscribed() -> Self {
        ServerMessage::Subscribed {
            message: "Subscribed to currency updates".to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Control messages accepted from subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe,
    ForceUpdate,
}

impl ClientMessage {
    /// `None` for anything that is not a known control message.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}
