//! # LaserKit Settings
//!
//! Typed device configuration for LaserKit: every recognized option as a
//! struct field, validation at construction, TOML/JSON (de)serialization.

pub mod config;

pub use config::DeviceConfig;
