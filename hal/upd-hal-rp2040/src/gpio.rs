//! Indicator outputs

use embassy_rp::gpio::Output;

/// Push-pull LED output, active high
pub struct Led<'d>(Output<'d>);

impl<'d> Led<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self(pin)
    }
}

impl upd_hal::OutputPin for Led<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}
