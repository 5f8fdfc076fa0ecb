use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use crate::error::{Error, Result};
use crate::feed::parser::parse_daily_xml;
use crate::feed::RateFeed;
use crate::types::RateSnapshot;

pub const CBRF_DAILY_URL: &str = "https://www.cbr.ru/scripts/XML_daily.asp";
pub const CBRF_SOURCE: &str = "CBRF";

/// HTTP client for the central bank daily rates document.
pub struct CbrFeedClient {
    url: String,
    client: reqwest::Client,
}

impl CbrFeedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("rate-watch/0.1")
            .build()
            .map_err(|e| Error::Config(format!("HTTP client setup failed: {}", e)))?;

        Ok(CbrFeedClient {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateFeed for CbrFeedClient {
    async fn fetch(&self) -> Result<RateSnapshot> {
        let response = self.client.get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Fetch(format!("request timed out: {}", e))
                } else if e.is_connect() {
                    Error::Fetch(format!("connection failed: {}", e))
                } else {
                    Error::Fetch(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        // reqwest decodes the declared charset (windows-1251 for this feed)
        let body = response.text()
            .await
            .map_err(|e| Error::Fetch(format!("reading body failed: {}", e)))?;
        tracing::debug!(bytes = body.len(), "Feed document received");

        parse_daily_xml(&body, Utc::now())
    }

    fn source(&self) -> &str {
        CBRF_SOURCE
    }
}
