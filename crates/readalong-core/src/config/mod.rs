//! Configuration loading for the read-along engine.
//!
//! Settings are loaded from `conf/config.toml` if present. Any missing or
//! invalid entries fall back to defaults so a session can always start.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, LogLevel, TestModeSettings};
