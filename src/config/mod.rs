//! Configuration loading and layering.
//!
//! Handles `.presence-picker.toml` loading, environment variable
//! resolution, and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{ChartConfig, Config, ConfigError, SelectorConfig, SourceConfig};
