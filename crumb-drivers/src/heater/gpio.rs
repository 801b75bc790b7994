//! GPIO heater output
//!
//! The toaster element is switched through a relay or SSR driven from a
//! single pin. Both polarities are supported.

use embedded_hal::digital::OutputPin;

use crumb_core::traits::HeaterOutput;

/// Heating element behind a GPIO pin
pub struct GpioHeater<P> {
    pin: P,
    /// If true, heater ON = pin LOW
    inverted: bool,
    on: bool,
    /// Set when the last pin write failed
    fault: bool,
}

impl<P: OutputPin> GpioHeater<P> {
    /// Wrap a pin, driving it to the OFF level immediately
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut heater = Self {
            pin,
            inverted,
            on: false,
            fault: false,
        };
        heater.set_on(false);
        heater
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// For active-low relay boards
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// True if the most recent pin write reported an error
    pub fn has_fault(&self) -> bool {
        self.fault
    }
}

impl<P: OutputPin> HeaterOutput for GpioHeater<P> {
    fn set_on(&mut self, on: bool) {
        let result = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };

        self.fault = result.is_err();
        // A failed write leaves the element in an unknown state; report it as on
        // so the controller keeps trying to switch it off.
        self.on = on || self.fault;
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_high(&mut self) -> Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }

        fn set_low(&mut self) -> Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn test_active_high_heater() {
        let mut heater = GpioHeater::new_active_high(MockPin { high: true });

        // Forced off on construction
        assert!(!heater.is_on());
        assert!(!heater.pin.high);

        heater.set_on(true);
        assert!(heater.is_on());
        assert!(heater.pin.high);

        heater.set_on(false);
        assert!(!heater.is_on());
        assert!(!heater.pin.high);
    }

    #[test]
    fn test_active_low_heater() {
        let mut heater = GpioHeater::new_active_low(MockPin { high: false });

        assert!(!heater.is_on());
        assert!(heater.pin.high);

        heater.set_on(true);
        assert!(heater.is_on());
        assert!(!heater.pin.high);

        heater.set_on(false);
        assert!(heater.pin.high);
    }

    #[test]
    fn test_pin_failure_reports_on() {
        let mut heater = GpioHeater::new_active_high(BrokenPin);
        assert!(heater.has_fault());
        assert!(heater.is_on());
    }
}
