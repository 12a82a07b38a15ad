//! Configuration for Cobble worlds.
//!
//! Settings persist to disk as a RON file. Every section falls back to its
//! defaults for missing fields, and unknown fields are ignored so older and
//! newer files load alike.

mod config;
mod error;

pub use config::{CONFIG_FILE, Config, DebugConfig, WorldConfig};
pub use error::ConfigError;
