//! Command byte decoding
//!
//! The first SPI byte of every frame is a command. Only the two groups seen
//! in captured radio traffic are modelled:
//!
//! ```text
//! 01xx mmmm   data setting    (m = RAM area, bit 3 = increment off)
//! 10aa aaaa   address setting (low 5 bits = address or glyph index)
//! ```

use super::ram::RamArea;

/// Key/status read opcode. Frames starting with it carry read traffic.
pub const KEY_SCAN_OPCODE: u8 = 0x44;

const GROUP_MASK: u8 = 0b1100_0000;
const GROUP_DATA_SETTING: u8 = 0b0100_0000;
const GROUP_ADDRESS_SETTING: u8 = 0b1000_0000;

const MODE_MASK: u8 = 0b0000_0111;
const INCREMENT_OFF_BIT: u8 = 0b0000_1000;
const ADDRESS_MASK: u8 = 0b0001_1111;

/// A decoded uPD16432B command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipCommand {
    /// Select the RAM area written by following data bytes
    DataSetting {
        area: RamArea,
        /// Bit 3 clear; only honoured for display data and pictograph RAM
        increment: bool,
    },
    /// Move the address pointer inside the selected area
    AddressSetting {
        /// Raw low 5 bits; meaning depends on the selected area
        address: u8,
    },
    /// Any other command group; not emulated
    Unsupported(u8),
}

impl ChipCommand {
    /// Decode a command byte
    pub fn decode(byte: u8) -> Self {
        match byte & GROUP_MASK {
            GROUP_DATA_SETTING => ChipCommand::DataSetting {
                area: RamArea::from_mode(byte & MODE_MASK),
                increment: byte & INCREMENT_OFF_BIT == 0,
            },
            GROUP_ADDRESS_SETTING => ChipCommand::AddressSetting {
                address: byte & ADDRESS_MASK,
            },
            _ => ChipCommand::Unsupported(byte),
        }
    }
}
