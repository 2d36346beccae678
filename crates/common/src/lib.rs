//! Shared configuration and error handling for Threadbridge
//!
//! This crate provides common functionality used across the relay:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - JSON body extraction with consistent rejections

pub mod config;
pub mod error;
pub mod extractors;

pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use extractors::JsonBody;
