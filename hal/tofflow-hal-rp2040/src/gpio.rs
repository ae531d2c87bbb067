//! Status LED outputs

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::Peri;

/// LED on a push-pull GPIO
///
/// `active_low` boards sink the LED current into the pin.
pub struct StatusLed<'d> {
    pin: Output<'d>,
    active_low: bool,
}

impl<'d> StatusLed<'d> {
    /// Claim a pin and switch the LED off
    pub fn new(pin: Peri<'d, AnyPin>, active_low: bool) -> Self {
        let off = if active_low { Level::High } else { Level::Low };
        Self {
            pin: Output::new(pin, off),
            active_low,
        }
    }

    pub fn set(&mut self, on: bool) {
        tofflow_hal::OutputPin::set_state(self, on != self.active_low);
    }
}

impl tofflow_hal::OutputPin for StatusLed<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
