//! Configuration module
//!
//! Handles engine settings and their JSON persistence.

pub mod settings;

pub use settings::{ConfigError, Settings};
