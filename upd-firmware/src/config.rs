//! Embedded configuration

use defmt::*;
use upd_core::config::parse_config;
use upd_core::SnifferConfig;

/// Configuration compiled into the firmware
/// Edit sniffer.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../sniffer.toml");

/// Parse the embedded configuration
///
/// build.rs has already validated the file, so the fallback only triggers
/// when the build-time check and the runtime parser disagree.
pub fn load() -> SnifferConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            SnifferConfig::default()
        }
    }
}
