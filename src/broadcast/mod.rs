pub mod connection;
pub mod message;
pub mod sink;

pub use connection::{ChannelConnection, ConnectionRegistry, PushConnection};
pub use message::{ClientMessage, ServerMessage, REPLAY_DATE_SENTINEL};
pub use sink::BroadcastSink;
