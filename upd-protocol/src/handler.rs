//! Command execution
//!
//! Runs decoded [`HostCommand`]s against the chip emulator and the status
//! indicators and builds the matching [`Response`].

use core::cell::RefCell;

use upd_core::chip::DUMP_SIZE;
use upd_core::ChipEmulator;
use upd_hal::OutputPin;

use crate::frame::{FrameError, Response};
use crate::messages::{HostCommand, Indicator};

/// Indicator outputs the host can drive
pub trait Indicators {
    /// Switch one indicator on or off
    fn set(&mut self, indicator: Indicator, on: bool);
}

/// Indicators backed by two output pins
pub struct Leds<G: OutputPin, R: OutputPin> {
    pub green: G,
    pub red: R,
}

impl<G: OutputPin, R: OutputPin> Leds<G, R> {
    pub fn new(green: G, red: R) -> Self {
        Self { green, red }
    }
}

impl<G: OutputPin, R: OutputPin> Indicators for Leds<G, R> {
    fn set(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Green => self.green.set_state(on),
            Indicator::Red => self.red.set_state(on),
        }
    }
}

/// Switch the red indicator on through a shared slot
///
/// Returns false when the slot is empty or its borrow is already held, in
/// which case the caller has to reach the pin some other way.
pub fn assert_red<I: Indicators>(slot: &RefCell<Option<I>>) -> bool {
    let Ok(mut slot) = slot.try_borrow_mut() else {
        return false;
    };
    match slot.as_mut() {
        Some(indicators) => {
            indicators.set(Indicator::Red, true);
            true
        }
        None => false,
    }
}

/// Executes host commands
pub struct CommandHandler<I: Indicators> {
    indicators: I,
}

impl<I: Indicators> CommandHandler<I> {
    pub fn new(indicators: I) -> Self {
        Self { indicators }
    }

    /// Access the indicators
    pub fn indicators(&mut self) -> &mut I {
        &mut self.indicators
    }

    /// Execute a command and build its reply
    pub fn execute(
        &mut self,
        command: &HostCommand,
        emulator: &mut ChipEmulator,
    ) -> Result<Response, FrameError> {
        match command {
            HostCommand::SetLed { indicator, on } => {
                self.indicators.set(*indicator, *on);
                Ok(Response::ack())
            }
            HostCommand::Echo(args) => Response::ack_with(args),
            HostCommand::DumpState => {
                let dump: [u8; DUMP_SIZE] = emulator.state().to_dump();
                Response::ack_with(&dump)
            }
            HostCommand::ResetChip => {
                emulator.reset();
                Ok(Response::ack())
            }
            HostCommand::InjectChipCommand(frame) => {
                emulator.process(frame.words());
                Ok(Response::ack())
            }
        }
    }
}
