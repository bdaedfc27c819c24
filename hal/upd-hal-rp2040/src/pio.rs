//! PIO-based SPI sniffer
//!
//! A receive-only SPI slave on one PIO state machine. It never drives a
//! pin: MOSI and SCK are only sampled while `/SS in` is low, and every
//! eight bits are autopushed into the RX FIFO, MSB first.
//!
//! # Pin layout
//!
//! The three inputs must be consecutive GPIOs so that one `in_base`
//! covers them:
//!
//! ```text
//! in_base + 0   MOSI
//! in_base + 1   SCK
//! in_base + 2   /SS in  (also the JMP pin)
//! ```
//!
//! `/SS in` is driven by the firmware from the chip strobe, so the
//! receiver is active exactly while the uPD16432B is addressed.

use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;
use upd_hal::spi::SampleEdge;
use upd_hal::SpiMode;

/// Bits per autopushed word
pub const WORD_BITS: u8 = 8;

/// PIO SPI receiver gated by `/SS in`
///
/// At the default 125 MHz system clock the program follows SCK up to about
/// 13 MHz (nine cycles per bit including the input synchronisers).
pub struct PioSniffer<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    /// Kept to restart the program from its first instruction
    cfg: Config<'d, PIO>,
}

impl<'d, PIO: Instance, const SM: usize> PioSniffer<'d, PIO, SM> {
    /// Load the receiver program and start the state machine
    ///
    /// # Arguments
    /// * `common` - PIO common resources (for loading program)
    /// * `sm` - State machine to use
    /// * `mosi`, `sck`, `ss_in` - Consecutive input pins
    /// * `mode` - SPI mode of the sniffed bus
    pub fn new<MOSI: PioPin, SCK: PioPin, SS: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        mosi: Peri<'d, MOSI>,
        sck: Peri<'d, SCK>,
        ss_in: Peri<'d, SS>,
        mode: SpiMode,
    ) -> Self {
        // Pin indices are relative to in_base: 1 = SCK, 2 = /SS in
        let program = match mode.sample_edge() {
            SampleEdge::Rising => {
                pio_proc::pio_asm!(
                    "idle:",
                    "    wait 0 pin 2", // Wait for /SS in asserted
                    "bit:",
                    "    wait 0 pin 1",
                    "    wait 1 pin 1", // Rising edge
                    "    in pins, 1",
                    "    jmp pin idle", // /SS released mid-word
                    "    jmp bit",
                )
                .program
            }
            SampleEdge::Falling => {
                pio_proc::pio_asm!(
                    "idle:",
                    "    wait 0 pin 2",
                    "bit:",
                    "    wait 1 pin 1",
                    "    wait 0 pin 1", // Falling edge
                    "    in pins, 1",
                    "    jmp pin idle",
                    "    jmp bit",
                )
                .program
            }
        };

        let installed = common.load_program(&program);

        let mosi = common.make_pio_pin(mosi);
        let sck = common.make_pio_pin(sck);
        let ss_in = common.make_pio_pin(ss_in);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[]);
        cfg.set_in_pins(&[&mosi, &sck, &ss_in]);
        cfg.set_jmp_pin(&ss_in);
        cfg.shift_in = ShiftConfig {
            auto_fill: true,
            threshold: WORD_BITS,
            direction: ShiftDirection::Left,
        };
        cfg.fifo_join = FifoJoin::RxOnly;
        // Full speed: the receiver must keep up with the bus clock
        cfg.clock_divider = U24F8::from_bits(1 << 8);

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::In, &[&mosi, &sck, &ss_in]);
        sm.set_enable(true);

        Self { sm, cfg }
    }

    /// Wait for the next received word
    pub async fn read_word(&mut self) -> u8 {
        self.sm.rx().wait_pull().await as u8
    }

    /// Take a word already in the FIFO, if any
    pub fn try_read_word(&mut self) -> Option<u8> {
        self.sm.rx().try_pull().map(|w| w as u8)
    }

    /// Drop partial bits and buffered words and restart from the idle state
    pub fn resync(&mut self) {
        self.sm.set_enable(false);
        self.sm.clear_fifos();
        self.sm.restart();
        // Applying the config again jumps to the program origin
        self.sm.set_config(&self.cfg);
        self.sm.set_enable(true);
    }
}
