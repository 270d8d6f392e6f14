//! chatmem common - Shared types, utilities, and configuration.
//!
//! This crate provides:
//! - Configuration types and loading (`~/.chatmem/config.json` + env overrides)
//! - Configuration validation
//! - Error classification and the centralized user-facing error handler
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    Config, EmbeddingConfig, MemoryConfig, ObservabilityConfig, RedisConfig, SearchConfig,
};
pub use error::{ErrorHandler, ErrorKind};
pub use validation::{Validate, ValidationError, ValidationResult};

