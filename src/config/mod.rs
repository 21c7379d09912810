//! Configuration module for the DIS ingest SDK
//!
//! This module handles configuration loading, validation, and management.

pub mod loader;
pub mod types;

pub use types::{DisConfiguration, LoggingConfig};
