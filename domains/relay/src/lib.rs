//! Relay domain: Slack event routing and thread/conversation correlation

pub mod api;
pub mod domain;

// Re-export domain types at the crate root for convenience
pub use domain::events::{EventEnvelope, InboundMessage, MentionFilter, MessageEvent, Rejection};
pub use domain::router::{Ack, EventRouter, RelayOutcome, ReplySource};

// Re-export API types
pub use api::routes;
pub use api::RelayState;
