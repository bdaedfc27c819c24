//! RP2040-specific HAL for the sniffer firmware
//!
//! Implements the shared `upd-hal` traits for RP2040 peripherals and adds
//! the PIO-based SPI receiver used to listen to the bus:
//!
//! - Indicator LEDs (`upd_hal::OutputPin`)
//! - Buffered debug trace UART (`upd_hal::UartTx`)
//! - Strobe-gated, receive-only SPI sniffer on a PIO state machine

#![no_std]

pub mod gpio;
pub mod pio;
pub mod uart;

pub use gpio::Led;
pub use pio::PioSniffer;
pub use uart::TraceUart;
