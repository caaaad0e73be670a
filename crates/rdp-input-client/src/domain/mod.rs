//! Domain layer for the input client.

pub mod config;

pub use config::{
    ClientConfig, ConfigError, ConnectionConfig, LoggingConfig, ReconnectConfig,
};
