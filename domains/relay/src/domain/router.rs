//! Event routing and thread/conversation correlation
//!
//! One inbound delivery produces at most one reply. Downstream failures are
//! logged and absorbed here: the inbound transport is always acknowledged,
//! because it retries on anything else and retries are dropped unprocessed.

use std::sync::Arc;

use threadbridge_llm::{ChatBackend, ChatReply, ChatRequest};
use threadbridge_slack::{ChatNotifier, ChatPost};
use threadbridge_threads::{ThreadMapping, ThreadStore};

use super::events::{EventEnvelope, InboundMessage, MentionFilter, Rejection};

/// How the inbound request is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// Handshake; the challenge is echoed verbatim
    Challenge(String),
    /// Retransmission of an earlier delivery
    RetryIgnored,
    /// Nothing to relay
    Ignored(Rejection),
    Relayed(RelayOutcome),
}

/// Where the reply text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Answer,
    Fallback,
}

/// Side effects of relaying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub thread_key: String,
    /// Conversation the backend was called with, if any
    pub conversation_id: Option<String>,
    /// Mapping written for a new thread
    pub created_mapping: Option<String>,
    pub reply_source: ReplySource,
    pub reply_delivered: bool,
}

pub struct EventRouter {
    store: Arc<dyn ThreadStore>,
    backend: Arc<dyn ChatBackend>,
    notifier: Arc<dyn ChatNotifier>,
    mentions: MentionFilter,
    fallback_reply: String,
}

impl EventRouter {
    pub fn new(
        store: Arc<dyn ThreadStore>,
        backend: Arc<dyn ChatBackend>,
        notifier: Arc<dyn ChatNotifier>,
        mentions: MentionFilter,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            store,
            backend,
            notifier,
            mentions,
            fallback_reply: fallback_reply.into(),
        }
    }

    /// Route one delivery.
    ///
    /// `retry_num` is the transport's retransmission marker; when present
    /// the payload is not inspected at all.
    pub async fn route(&self, retry_num: Option<&str>, envelope: EventEnvelope) -> Ack {
        if let Some(retry) = retry_num {
            tracing::info!(retry_num = %retry, "Slack retry request ignored");
            return Ack::RetryIgnored;
        }

        if envelope.is_url_verification() {
            return Ack::Challenge(envelope.challenge.unwrap_or_default());
        }

        let inbound = match envelope.event.as_ref().map(|e| e.validate()) {
            Some(Ok(inbound)) => inbound,
            Some(Err(rejection)) => {
                tracing::info!(event = ?envelope.event, reason = %rejection, "Invalid event ignored");
                return Ack::Ignored(rejection);
            }
            None => {
                tracing::info!("Payload without event ignored");
                return Ack::Ignored(Rejection::MissingEvent);
            }
        };

        Ack::Relayed(self.relay(inbound).await)
    }

    /// Correlate, ask the backend, persist a new mapping, reply.
    pub async fn relay(&self, message: InboundMessage) -> RelayOutcome {
        let thread_key = message.thread_key;
        let query = self.mentions.normalize(&message.text).into_owned();

        let existing = match self.store.find_conversation(&thread_key).await {
            Ok(found) => found,
            Err(e) => {
                // Fail open
                tracing::error!(thread_key = %thread_key, error = %e, "Conversation lookup failed");
                None
            }
        };

        let request = ChatRequest {
            query,
            user: message.user.clone(),
            conversation_id: existing.clone(),
        };

        let reply = match self.backend.send_message(request).await {
            Ok(reply) => {
                tracing::info!(
                    thread_key = %thread_key,
                    conversation_id = ?reply.conversation_id,
                    has_answer = reply.answer.is_some(),
                    "AI backend replied"
                );
                reply
            }
            Err(e) => {
                tracing::error!(thread_key = %thread_key, error = %e, "AI backend call failed");
                ChatReply::default()
            }
        };

        let created_mapping = match (&existing, &reply.conversation_id) {
            (None, Some(new_id)) => self.persist(&thread_key, new_id, &message.user).await,
            _ => None,
        };

        let (text, reply_source) = match reply.answer {
            Some(answer) if !answer.is_empty() => (answer, ReplySource::Answer),
            _ => (self.fallback_reply.clone(), ReplySource::Fallback),
        };

        let post = ChatPost {
            channel: message.channel,
            text,
            thread_ts: thread_key.clone(),
        };
        let reply_delivered = match self.notifier.post_reply(post).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(thread_key = %thread_key, error = %e, "Slack reply failed");
                false
            }
        };

        RelayOutcome {
            thread_key,
            conversation_id: existing,
            created_mapping,
            reply_source,
            reply_delivered,
        }
    }

    /// Returns the conversation id when the mapping was stored.
    async fn persist(&self, thread_key: &str, conversation_id: &str, user_id: &str) -> Option<String> {
        let result = match ThreadMapping::new(thread_key, conversation_id, user_id) {
            Ok(mapping) => self.store.upsert_mapping(&mapping).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(thread_key = %thread_key, conversation_id = %conversation_id, "Thread mapping stored");
                Some(conversation_id.to_string())
            }
            Err(e) => {
                tracing::error!(thread_key = %thread_key, error = %e, "Thread mapping upsert failed");
                None
            }
        }
    }
}
