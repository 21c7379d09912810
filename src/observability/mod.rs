//! Logging integration
//!
//! The SDK logs through `tracing`; this module installs a subscriber for
//! applications that do not bring their own.

pub mod logging;

pub use logging::init_tracing;
