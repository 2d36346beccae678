//! Route definitions for Relay domain API

use axum::{routing::post, Router};

use super::handlers::events;
use super::middleware::RelayState;

/// Create all Relay domain API routes
pub fn routes() -> Router<RelayState> {
    Router::new().route("/slack/events", post(events::slack_events))
}
