//! uPD16432B sniffer - bus sniffer and emulator firmware
//!
//! Listens to the SPI bus between a car radio's main controller and its
//! uPD16432B display controller, mirrors the chip's RAM, and lets a host
//! computer inspect and drive that mirror over a serial link.
//!
//! # Board wiring
//!
//! ```text
//! GPIO0/1   UART0 TX/RX   host command link
//! GPIO20    UART1 TX      debug trace
//! GPIO4     MOSI          (PIO input, in_base)
//! GPIO5     SCK           (PIO input)
//! GPIO6     /SS in        (PIO input, wired to GPIO7)
//! GPIO7     /SS out       inverted copy of STB
//! GPIO8     STB           chip strobe, active high
//! GPIO14    green LED
//! GPIO15    red LED
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{PIO0, UART0, UART1};
use embassy_rp::pio::Pio;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartTx, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use upd_core::trace::TraceWriter;
use upd_hal::uart::UartConfig;
use upd_hal_rp2040::uart::to_rp_config;
use upd_hal_rp2040::{Led, PioSniffer, TraceUart};
use upd_protocol::{Leds, Session};

use crate::channels::{capture_stats, FRAME_QUEUE};
use crate::fault::SharedIndicators;

mod channels;
mod config;
mod fault;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
// TX holds a full DUMP reply
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
// Room for about ten full-length trace lines
static TRACE_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Runs the capture task so strobe and word handling pre-empt the main loop
static CAPTURE_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    CAPTURE_EXECUTOR.on_interrupt()
}

/// Interval between capture statistics log lines
const STATS_INTERVAL_SECS: u64 = 60;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("uPD16432B sniffer starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Indicators first so a fault during setup still shows
    let green = Led::new(Output::new(p.PIN_14, Level::Low));
    let red = Led::new(Output::new(p.PIN_15, Level::Low));
    fault::install(Leds::new(green, red));

    let config = config::load();
    info!("Configuration: {:?}", config);

    // Host command link
    let host_config = to_rp_config(&UartConfig::eight_n_one(config.host.baudrate));
    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, host_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART0 initialized for host link at {} baud", config.host.baudrate);

    // Debug trace output
    let trace_config = to_rp_config(&UartConfig::eight_n_one(config.trace.baudrate));
    let trace_buf = TRACE_BUF.init([0u8; 1024]);
    let trace_tx = BufferedUartTx::new(p.UART1, Irqs, p.PIN_20, trace_buf, trace_config);
    let trace = TraceWriter::new(TraceUart::new(trace_tx), config.trace.enabled);

    // Bus receiver: /SS out idles high so the PIO program waits
    let ss_out = Output::new(p.PIN_7, Level::High);
    let strobe = Input::new(p.PIN_8, Pull::Down);

    let Pio {
        mut common,
        sm0,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let sniffer = PioSniffer::new(
        &mut common,
        sm0,
        p.PIN_4,
        p.PIN_5,
        p.PIN_6,
        config.bus.spi_mode,
    );

    info!("PIO sniffer initialized ({:?})", config.bus.spi_mode);

    let session = Session::new(
        config.host.command_timeout_ms,
        config.emulator.reselect,
        SharedIndicators,
    );

    // Capture runs above thread mode; the main loop stays on the main executor
    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let capture_spawner = CAPTURE_EXECUTOR.start(interrupt::SWI_IRQ_1);

    // Task functions hand back the spawn token as a Result
    capture_spawner.spawn(tasks::capture_task(sniffer, strobe, ss_out).unwrap());
    spawner.spawn(tasks::main_loop_task(rx, tx, trace, session).unwrap());

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(STATS_INTERVAL_SECS).await;
        let stats = capture_stats();
        info!(
            "Capture: {} queued, {} key scans, {} empty, {} truncated, {} overwritten, {} stray bytes, {} waiting",
            stats.enqueued,
            stats.key_scan,
            stats.empty,
            stats.truncated,
            stats.overwritten,
            stats.stray_words,
            FRAME_QUEUE.len()
        );
    }
}
