//! uPD16432B emulation
//!
//! Mirrors the chip's addressing registers and its three RAM areas from the
//! command frames the radio's controller sends it.

pub mod command;
pub mod emulator;
pub mod ram;
pub mod state;

pub use command::ChipCommand;
pub use emulator::{ChipEmulator, ReselectPolicy};
pub use ram::RamArea;
pub use state::{ChipState, DUMP_SIZE};
