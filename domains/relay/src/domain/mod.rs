//! Domain layer for the Relay domain

pub mod events;
pub mod router;
