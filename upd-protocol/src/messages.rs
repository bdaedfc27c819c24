//! Host command definitions
//!
//! Every request is decoded into a [`HostCommand`] before anything is
//! executed. Decoding failures become a [`CommandError`], which the caller
//! answers with NAK.

use heapless::Vec;
use upd_core::CommandFrame;

use crate::frame::{Request, MAX_RESPONSE_PAYLOAD};

// Command IDs
pub const CMD_SET_LED: u8 = 0x01;
pub const CMD_ECHO: u8 = 0x02;
pub const CMD_DUMP_STATE: u8 = 0x03;
pub const CMD_RESET_CHIP: u8 = 0x04;
pub const CMD_INJECT_CHIP_COMMAND: u8 = 0x05;

// SET_LED indicator IDs
pub const LED_GREEN: u8 = 0x00;
pub const LED_RED: u8 = 0x01;

/// Reasons a request is answered with NAK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Command byte is not one of the known IDs
    UnknownCommand(u8),
    /// Argument count does not match what the command takes
    WrongArgumentCount { command: u8, got: usize },
    /// SET_LED named an indicator that does not exist
    InvalidIndicator(u8),
    /// Length prefix was zero
    ZeroLength,
}

/// Status indicators controllable from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    Green,
    Red,
}

impl Indicator {
    /// Decode a SET_LED indicator ID
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            LED_GREEN => Some(Indicator::Green),
            LED_RED => Some(Indicator::Red),
            _ => None,
        }
    }
}

/// Decoded host command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Switch an indicator on or off
    SetLed { indicator: Indicator, on: bool },
    /// Reply with the arguments unchanged
    Echo(Vec<u8, MAX_RESPONSE_PAYLOAD>),
    /// Reply with the full emulated chip state
    DumpState,
    /// Return the emulated chip to its power-on state
    ResetChip,
    /// Run a chip command as if it had been captured from the bus
    InjectChipCommand(CommandFrame),
}

impl HostCommand {
    /// Decode a complete request
    pub fn from_request(request: &Request) -> Result<Self, CommandError> {
        let command = request.command();
        let args = request.args();

        match command {
            CMD_SET_LED => {
                let &[id, state] = args else {
                    return Err(wrong_count(command, args));
                };
                let indicator = Indicator::from_id(id).ok_or(CommandError::InvalidIndicator(id))?;
                Ok(HostCommand::SetLed {
                    indicator,
                    on: state != 0,
                })
            }
            CMD_ECHO => {
                // A request body holds at most 254 args, same as a response payload
                let echoed = Vec::from_slice(args).map_err(|_| wrong_count(command, args))?;
                Ok(HostCommand::Echo(echoed))
            }
            CMD_DUMP_STATE => {
                expect_no_args(command, args)?;
                Ok(HostCommand::DumpState)
            }
            CMD_RESET_CHIP => {
                expect_no_args(command, args)?;
                Ok(HostCommand::ResetChip)
            }
            CMD_INJECT_CHIP_COMMAND => {
                Ok(HostCommand::InjectChipCommand(CommandFrame::from_words(args)))
            }
            other => Err(CommandError::UnknownCommand(other)),
        }
    }
}

fn expect_no_args(command: u8, args: &[u8]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(wrong_count(command, args))
    }
}

fn wrong_count(command: u8, args: &[u8]) -> CommandError {
    CommandError::WrongArgumentCount {
        command,
        got: args.len(),
    }
}
