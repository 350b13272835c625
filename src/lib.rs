//! presence-picker — user picker and presence chart viewer (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod env;
pub mod models;
pub mod render;
pub mod selector;
pub mod source;
pub mod view;
