//! Relay domain state

use std::sync::Arc;

use crate::domain::router::EventRouter;

/// Application state for the Relay domain
#[derive(Clone)]
pub struct RelayState {
    pub router: Arc<EventRouter>,
}

impl RelayState {
    pub fn new(router: EventRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}
