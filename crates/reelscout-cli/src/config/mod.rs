//! Application configuration module.
//!
//! Manages the TOML config file holding the OMDb credentials and UI
//! defaults.

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_KEY_ENV, AppConfig};
