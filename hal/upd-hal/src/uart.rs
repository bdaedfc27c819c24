//! UART serial communication abstractions
//!
//! The host protocol link is driven through `embedded-io-async` directly by
//! the firmware. This trait covers the write-only debug trace channel.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write all of `data`
    ///
    /// Completes once every byte is queued for transmission; it does not
    /// wait for the line to drain.
    fn write_all(&mut self, data: &[u8]) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// UART configuration
///
/// Both links of the sniffer use 8 data bits, no parity and one stop bit;
/// only the rate varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl UartConfig {
    /// 8-N-1 at the given baud rate
    pub const fn eight_n_one(baudrate: u32) -> Self {
        Self { baudrate }
    }
}
