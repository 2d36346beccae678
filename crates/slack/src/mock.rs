//! Mock Chat Notifier Implementation
//!
//! Stores posts in memory for test assertions.
//! Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use crate::{ChatNotifier, ChatPost, NotifierError};

/// Mock notifier that records posts for test assertions.
#[derive(Debug, Clone)]
pub struct MockChatNotifier {
    posts: Arc<Mutex<Vec<ChatPost>>>,
    fail_with: Option<String>,
}

impl MockChatNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Notifier that records each attempt and then fails it with an API error.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(error.into()),
        }
    }

    /// Return all recorded posts.
    pub fn recorded_posts(&self) -> Vec<ChatPost> {
        self.posts
            .lock()
            .expect("posts lock poisoned: prior test panicked")
            .clone()
    }
}

impl Default for MockChatNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChatNotifier for MockChatNotifier {
    async fn post_reply(&self, post: ChatPost) -> Result<(), NotifierError> {
        tracing::debug!(channel = %post.channel, "Mock Slack: recording post");
        self.posts
            .lock()
            .map_err(|e| NotifierError::Request(format!("posts lock poisoned: {e}")))?
            .push(post);

        match &self.fail_with {
            Some(error) => Err(NotifierError::Api(error.clone())),
            None => Ok(()),
        }
    }
}
