//! Configuration type definitions

use upd_hal::SpiMode;

use crate::chip::ReselectPolicy;

/// Default host link baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Default inactivity timeout while a host request is being received
pub const DEFAULT_COMMAND_TIMEOUT_MS: u32 = 2000;

/// Accepted baud rate range
pub const MIN_BAUDRATE: u32 = 1200;
pub const MAX_BAUDRATE: u32 = 1_000_000;

/// Accepted command timeout range
pub const MIN_COMMAND_TIMEOUT_MS: u32 = 10;
pub const MAX_COMMAND_TIMEOUT_MS: u32 = 60_000;

/// Host command link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HostLinkConfig {
    /// UART baud rate (8-N-1)
    pub baudrate: u32,
    /// Per-byte inactivity deadline; a partial request is dropped after it
    pub command_timeout_ms: u32,
}

impl Default for HostLinkConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

/// Debug trace output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TraceConfig {
    pub enabled: bool,
    pub baudrate: u32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}

/// Sniffed bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub spi_mode: SpiMode,
}

/// Emulator behaviour settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmulatorConfig {
    pub reselect: ReselectPolicy,
}

/// Complete sniffer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SnifferConfig {
    pub host: HostLinkConfig,
    pub trace: TraceConfig,
    pub bus: BusConfig,
    pub emulator: EmulatorConfig,
}
