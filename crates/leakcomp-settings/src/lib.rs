//! LeakComp Settings Crate
//!
//! Handles configuration loading, validation and persistence.

pub mod config;
pub mod error;

pub use config::{
    CompensationSettings, Config, OutputSettings, CONFIG_ENV_VAR, MAX_PRECISION,
};
pub use error::{SettingsError, SettingsResult};
