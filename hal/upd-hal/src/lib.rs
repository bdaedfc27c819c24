//! uPD16432B Sniffer Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the sniffer logic
//! calls into. Chip-specific crates (currently only RP2040) implement them,
//! and the host test suites implement them with in-memory mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  upd-core / upd-protocol / upd-firmware │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  upd-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ upd-hal-rp2040│
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Indicator LEDs
//! - [`uart::UartTx`] - Async serial output (debug trace)
//! - [`spi::Mode`] - Bus clock polarity/phase the receiver must follow

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use spi::Mode as SpiMode;
pub use uart::UartTx;
