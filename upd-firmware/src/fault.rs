//! Indicator ownership and fault handling
//!
//! The indicator LEDs sit in a critical-section mutex so that both the
//! host protocol and the fault handlers can reach them.

use core::cell::RefCell;

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use upd_hal_rp2040::Led;
use upd_protocol::{assert_red, Indicator, Indicators, Leds};

pub type IndicatorLeds = Leds<Led<'static>, Led<'static>>;

static INDICATORS: Mutex<CriticalSectionRawMutex, RefCell<Option<IndicatorLeds>>> =
    Mutex::new(RefCell::new(None));

/// Hand the LEDs over to the shared slot
pub fn install(leds: IndicatorLeds) {
    INDICATORS.lock(|cell| {
        cell.replace(Some(leds));
    });
}

/// Handle to the shared indicators, given to the protocol session
pub struct SharedIndicators;

impl Indicators for SharedIndicators {
    fn set(&mut self, indicator: Indicator, on: bool) {
        INDICATORS.lock(|cell| {
            if let Some(leds) = cell.borrow_mut().as_mut() {
                leds.set(indicator, on);
            }
        });
    }
}

/// GPIO of the red indicator, see the wiring table in main.rs
const RED_LED_GPIO: u32 = 15;

/// SIO GPIO output and output-enable set aliases
const SIO_GPIO_OUT_SET: *mut u32 = 0xd000_0014 as *mut u32;
const SIO_GPIO_OE_SET: *mut u32 = 0xd000_0024 as *mut u32;

/// Light the red LED and stop
pub fn halt_with_red() -> ! {
    if !INDICATORS.lock(|cell| assert_red(cell)) {
        warn!("Indicators unavailable, driving red LED directly");
        force_red();
    }

    loop {
        cortex_m::asm::wfi();
    }
}

/// Drive the red LED pin high through SIO, bypassing its owner
///
/// Used when the fault interrupted code holding the indicators.
fn force_red() {
    let mask = 1 << RED_LED_GPIO;
    // SAFETY: single-word writes to the SIO set aliases only touch the
    // red LED bit. Nothing else runs after a fault.
    unsafe {
        core::ptr::write_volatile(SIO_GPIO_OUT_SET, mask);
        core::ptr::write_volatile(SIO_GPIO_OE_SET, mask);
    }
}

/// Unvectored interrupt
#[cortex_m_rt::exception]
unsafe fn DefaultHandler(irqn: i16) {
    error!("Unhandled interrupt {}", irqn);
    halt_with_red();
}

/// Hard fault, including the one panic-probe raises after a panic
#[cortex_m_rt::exception]
unsafe fn HardFault(_frame: &cortex_m_rt::ExceptionFrame) -> ! {
    error!("Hard fault");
    halt_with_red();
}
