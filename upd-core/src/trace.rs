//! Debug trace of captured frames
//!
//! One ASCII line per frame: two-digit uppercase hex bytes separated by a
//! single space, newline terminated. Meant for a human watching a terminal,
//! not for parsing.

use core::fmt::Write;

use heapless::String;
use upd_hal::UartTx;

use crate::capture::{CommandFrame, MAX_FRAME_WORDS};

/// Longest trace line: 32 bytes as "XX", 31 separators, one newline
pub const TRACE_LINE_CAPACITY: usize = MAX_FRAME_WORDS * 3;

/// Printed once at startup
pub const BANNER: &str = "\nupd16432b sniffer started\n";

/// Render a frame as a trace line
pub fn format_frame(frame: &CommandFrame) -> String<TRACE_LINE_CAPACITY> {
    let mut line = String::new();
    for (i, word) in frame.words().iter().enumerate() {
        if i > 0 {
            let _ = line.push(' ');
        }
        // Capacity covers the longest frame
        let _ = write!(line, "{:02X}", word);
    }
    let _ = line.push('\n');
    line
}

/// Writes trace lines to a UART
pub struct TraceWriter<T: UartTx> {
    uart: T,
    enabled: bool,
}

impl<T: UartTx> TraceWriter<T> {
    pub fn new(uart: T, enabled: bool) -> Self {
        Self { uart, enabled }
    }

    /// Write the startup banner
    pub async fn banner(&mut self) -> Result<(), T::Error> {
        self.write_line(BANNER).await
    }

    /// Write one frame line
    pub async fn frame(&mut self, frame: &CommandFrame) -> Result<(), T::Error> {
        let line = format_frame(frame);
        self.write_line(&line).await
    }

    async fn write_line(&mut self, line: &str) -> Result<(), T::Error> {
        if !self.enabled {
            return Ok(());
        }
        self.uart.write_all(line.as_bytes()).await
    }

    /// Give back the UART
    pub fn release(self) -> T {
        self.uart
    }
}
