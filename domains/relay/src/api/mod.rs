//! API layer for the Relay domain
//!
//! Contains the Slack Events API handler, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::RelayState;
pub use routes::routes;
