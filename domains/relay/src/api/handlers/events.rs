//! Slack Events API handler

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use threadbridge_common::JsonBody;

use crate::api::middleware::RelayState;
use crate::domain::events::EventEnvelope;
use crate::domain::router::Ack;

/// Set by Slack on redeliveries of an unacknowledged event
pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";

/// Receive one Events API delivery.
///
/// Always answers 200 once the body parsed; relay failures only show up in
/// the logs.
pub async fn slack_events(
    State(state): State<RelayState>,
    headers: HeaderMap,
    JsonBody(envelope): JsonBody<EventEnvelope>,
) -> Response {
    let retry_num = headers
        .get(RETRY_NUM_HEADER)
        .map(|v| v.to_str().unwrap_or_default());

    match state.router.route(retry_num, envelope).await {
        Ack::Challenge(challenge) => (StatusCode::OK, challenge).into_response(),
        Ack::RetryIgnored => (StatusCode::OK, "Retry ignored").into_response(),
        Ack::Ignored(_) => StatusCode::OK.into_response(),
        Ack::Relayed(outcome) => {
            tracing::debug!(?outcome, "Event relayed");
            StatusCode::OK.into_response()
        }
    }
}
