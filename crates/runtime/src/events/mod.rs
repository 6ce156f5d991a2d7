//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Every session additionally owns a private stream of
//! its own events, handed out through its handle.

mod bus;
mod types;

pub use bus::{Event, EventBus, EventStream, Topic};
pub use types::{BattleEvent, HandshakeEvent};
