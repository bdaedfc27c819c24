//! Configuration types
//!
//! The firmware embeds `sniffer.toml` and parses it at boot with
//! [`parse_config`]. Anything not set keeps its default.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ConfigError};
pub use types::*;
