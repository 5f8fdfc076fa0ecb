pub mod ids;
pub mod snapshot;

pub use ids::{ConnectionId, SinkId};
pub use snapshot::{RateEntry, RateSnapshot};
