//! Inbound Slack Events API payloads
//!
//! Only the fields the relay reads are modelled; everything else in the
//! payload is ignored.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Payload type of the Events API handshake
pub const URL_VERIFICATION: &str = "url_verification";

/// Outer Events API body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub event: Option<MessageEvent>,
}

impl EventEnvelope {
    pub fn is_url_verification(&self) -> bool {
        self.kind.as_deref() == Some(URL_VERIFICATION)
    }
}

/// A message or app_mention event.
///
/// Other event types reuse these field names with object values (`channel`
/// on `channel_created`, `user` on `team_join`); anything that is not a
/// string reads as absent so such events are still acknowledged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(default, deserialize_with = "string_or_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub channel: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub ts: Option<String>,
    /// Root timestamp; absent on the first message of a thread
    #[serde(default, deserialize_with = "string_or_none")]
    pub thread_ts: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Why an event was acknowledged without relaying it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("payload carries no event")]
    MissingEvent,

    #[error("event carries no text")]
    MissingText,

    #[error("event is missing `{0}`")]
    MissingField(&'static str),
}

/// A validated event, ready to relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub user: String,
    pub channel: String,
    pub thread_key: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl MessageEvent {
    /// Thread root if the event is a reply, else the event's own timestamp.
    ///
    /// The first message of a thread and every reply under it resolve to the
    /// same key.
    pub fn thread_key(&self) -> Option<&str> {
        non_empty(&self.thread_ts).or_else(|| non_empty(&self.ts))
    }

    pub fn validate(&self) -> Result<InboundMessage, Rejection> {
        let text = non_empty(&self.text).ok_or(Rejection::MissingText)?;
        let user = non_empty(&self.user).ok_or(Rejection::MissingField("user"))?;
        let channel = non_empty(&self.channel).ok_or(Rejection::MissingField("channel"))?;
        let thread_key = self.thread_key().ok_or(Rejection::MissingField("ts"))?;

        Ok(InboundMessage {
            text: text.to_string(),
            user: user.to_string(),
            channel: channel.to_string(),
            thread_key: thread_key.to_string(),
        })
    }
}

/// Strips the leading `<@USER>` mention addressing the bot.
#[derive(Debug, Clone)]
pub struct MentionFilter {
    leading_mention: Regex,
}

impl MentionFilter {
    /// With a bot user id only that user's mention is stripped; without one,
    /// any leading mention is.
    pub fn new(bot_user_id: Option<&str>) -> Result<Self, regex::Error> {
        let target = match bot_user_id {
            Some(id) => format!(r"{}(?:\|[^>]*)?", regex::escape(id)),
            None => r"[^>]+".to_string(),
        };
        let leading_mention = Regex::new(&format!(r"^\s*<@{}>\s*", target))?;

        Ok(Self { leading_mention })
    }

    pub fn normalize<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        self.leading_mention.replace(text, "")
    }
}
