//! Configuration module for rollup.
//!
//! Handles engine defaults, SQL rendering and connection settings.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, Driver, EngineSettings, Settings, SettingsError,
    SqlSettings,
};
