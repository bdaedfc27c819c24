//! Board-agnostic core logic for the uPD16432B sniffer firmware
//!
//! This crate contains everything that does not touch hardware registers:
//!
//! - uPD16432B register/RAM emulator
//! - Strobe-delimited SPI frame capture and the frame queue
//! - Debug trace formatting
//! - Configuration types and the embedded config parser

#![no_std]
#![deny(unsafe_code)]

pub mod capture;
pub mod chip;
pub mod config;
pub mod trace;

pub use capture::{CaptureOutcome, CommandFrame, FrameCapture, FrameQueue, SharedFrameQueue};
pub use chip::{ChipCommand, ChipEmulator, ChipState, RamArea, ReselectPolicy};
pub use config::SnifferConfig;
