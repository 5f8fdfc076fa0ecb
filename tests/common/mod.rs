#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use async_trait::async_trait;
use chrono::Utc;
use rate_watch::error::{Error, Result};
use rate_watch::feed::{parse_daily_xml, RateFeed};
use rate_watch::types::RateSnapshot;

/// Daily document with a single USD quote.
pub fn usd_document(value: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="windows-1251"?>
<ValCurs Date="19.10.2026" name="Foreign Currency Market">
    <Valute ID="R01235">
        <NumCode>840</NumCode>
        <CharCode>USD</CharCode>
        <Nominal>1</Nominal>
        <Name>Доллар США</Name>
        <Value>{}</Value>
    </Valute>
</ValCurs>"#,
        value
    )
}

pub enum Step {
    Document(String),
    Timeout,
}

/// Feed that parses scripted documents, or fails like a timed-out request.
pub struct ScriptedFeed {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<usize>,
}

impl ScriptedFeed {
    pub fn new(steps: Vec<Step>) -> Self {
        ScriptedFeed {
            steps: Mutex::new(steps.into()),
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
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Document(xml)) => parse_daily_xml(&xml, Utc::now()),
            Some(Step::Timeout) | None => Err(Error::Fetch("request timed out".to_string())),
        }
    }

    fn source(&self) -> &str {
        "CBRF"
    }
}
