//! Host command protocol
//!
//! A host computer talks to the sniffer over a plain 8-N-1 UART using
//! length-prefixed requests and responses:
//!
//! ```text
//! request:  ┌─────┬─────┬────────────┐
//!           │ N   │ CMD │ ARGS       │   N = 1 + number of args
//!           └─────┴─────┴────────────┘
//! response: ┌─────┬────────┬─────────┐
//!           │ M   │ STATUS │ PAYLOAD │   M = 1 + payload length
//!           └─────┴────────┴─────────┘   STATUS = ACK (0x06) / NAK (0x15)
//! ```
//!
//! There is no checksum or start byte. Framing is recovered by an
//! inactivity deadline: a partial request is dropped when no byte arrives
//! for the configured timeout.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod handler;
pub mod messages;
pub mod service;

pub use frame::{
    FeedResult, FrameError, Request, RequestAssembler, Response, Status, MAX_RESPONSE_PAYLOAD,
    MAX_RESPONSE_SIZE,
};
pub use handler::{assert_red, CommandHandler, Indicators, Leds};
pub use messages::{CommandError, HostCommand, Indicator};
pub use service::{Reply, Session, Step};
