//! UART adapters
//!
//! RP2040 has two UART peripherals. The host link uses UART0 and the debug
//! trace uses UART1 TX; both go through embassy's interrupt-driven buffered
//! driver so a long trace line never holds up the executor.

use embassy_rp::uart::{self, BufferedUartTx};
use embedded_io_async::Write;
use upd_hal::uart::UartConfig;

/// Convert the board-agnostic settings to an embassy UART config
pub fn to_rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = uart::DataBits::DataBits8;
    rp.parity = uart::Parity::ParityNone;
    rp.stop_bits = uart::StopBits::STOP1;
    rp
}

/// Write-only buffered UART used for the debug trace
pub struct TraceUart(BufferedUartTx);

impl TraceUart {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self(tx)
    }
}

impl upd_hal::UartTx for TraceUart {
    type Error = uart::Error;

    async fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data).await
    }
}
