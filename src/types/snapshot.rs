use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::error::{Error, Result};

/// One currency quote as published by the feed.
///
/// `rate_per_unit` is always `raw_value / nominal`; both inputs are checked at
/// construction so a snapshot can never carry a zero or negative nominal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RateEntry {
    rate_per_unit: f64,
    name: String,
    nominal: i64,
    raw_value: f64,
    raw_value_text: String,
}

impl RateEntry {
    pub fn new(
        code: &str,
        name: impl Into<String>,
        nominal: i64,
        raw_value: f64,
        raw_value_text: impl Into<String>,
    ) -> Result<Self> {
        if nominal <= 0 {
            return Err(Error::InvalidRateEntry {
                code: code.to_string(),
                reason: format!("nominal must be positive, got {}", nominal),
            });
        }
        if !raw_value.is_finite() || raw_value <= 0.0 {
            return Err(Error::InvalidRateEntry {
                code: code.to_string(),
                reason: format!("value must be positive, got {}", raw_value),
            });
        }

        Ok(RateEntry {
            rate_per_unit: raw_value / nominal as f64,
            name: name.into(),
            nominal,
            raw_value,
            raw_value_text: raw_value_text.into(),
        })
    }

    pub fn rate_per_unit(&self) -> f64 {
        self.rate_per_unit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nominal(&self) -> i64 {
        self.nominal
    }

    pub fn raw_value(&self) -> f64 {
        self.raw_value
    }

    pub fn raw_value_text(&self) -> &str {
        &self.raw_value_text
    }
}

/// Immutable point-in-time record of every known currency rate.
///
/// Snapshots are shared as `Arc<RateSnapshot>` and replaced wholesale, never
/// edited. An empty snapshot stands for "nothing fetched yet" or a failed fetch.
/// Lookups go through a code-keyed map; `feed_order` keeps document order.
#[derive(Clone, Debug, PartialEq)]
pub struct RateSnapshot {
    taken_at: DateTime<Utc>,
    source_date: String,
    rates: BTreeMap<String, RateEntry>,
    feed_order: Vec<String>,
}

impl RateSnapshot {
    pub fn new(
        taken_at: DateTime<Utc>,
        source_date: impl Into<String>,
        rates: BTreeMap<String, RateEntry>,
    ) -> Self {
        RateSnapshot {
            taken_at,
            source_date: source_date.into(),
            feed_order: rates.keys().cloned().collect(),
            rates,
        }
    }

    /// Build from entries in document order. A repeated code keeps its first
    /// position and its last value.
    pub fn from_feed_order(
        taken_at: DateTime<Utc>,
        source_date: impl Into<String>,
        entries: impl IntoIterator<Item = (String, RateEntry)>,
    ) -> Self {
        let mut rates = BTreeMap::new();
        let mut feed_order = Vec::new();
        for (code, entry) in entries {
            if rates.insert(code.clone(), entry).is_none() {
                feed_order.push(code);
            }
        }

        RateSnapshot {
            taken_at,
            source_date: source_date.into(),
            rates,
            feed_order,
        }
    }

    pub fn empty() -> Self {
        RateSnapshot::new(Utc::now(), String::new(), BTreeMap::new())
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn source_date(&self) -> &str {
        &self.source_date
    }

    pub fn rates(&self) -> &BTreeMap<String, RateEntry> {
        &self.rates
    }

    pub fn in_feed_order(&self) -> impl Iterator<Item = (&str, &RateEntry)> {
        self.feed_order
            .iter()
            .filter_map(|code| self.rates.get_key_value(code))
            .map(|(code, entry)| (code.as_str(), entry))
    }

    pub fn get(&self, code: &str) -> Option<&RateEntry> {
        self.rates.get(code)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }
}

impl Default for RateSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
