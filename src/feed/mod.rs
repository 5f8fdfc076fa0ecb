pub mod cbrf;
pub mod parser;

use async_trait::async_trait;
use crate::error::Result;
use crate::types::RateSnapshot;

pub use cbrf::CbrFeedClient;
pub use parser::parse_daily_xml;

/// Source of rate snapshots polled by the monitor.
///
/// Implementations bound their own latency; a timeout must surface as an
/// `Err`, never as a hang. An `Ok` with no entries is treated as a failed fetch.
#[async_trait]
pub trait RateFeed: Send + Sync {
    async fn fetch(&self) -> Result<RateSnapshot>;
    fn source(&self) -> &str;
}
