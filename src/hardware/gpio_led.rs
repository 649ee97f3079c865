use super::traits::Led;
use core::convert::Infallible;
use embedded_hal::digital::StatefulOutputPin;

pub struct GpioLed<P> {
    pin: P,
    active_low: bool,
    lit: bool,
}

impl<P> GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    /// LED wired to VCC (Blue Pill PC13 style): on = low.
    pub fn new(pin: P) -> Self {
        Self::with_polarity(pin, true)
    }

    pub fn active_high(pin: P) -> Self {
        Self::with_polarity(pin, false)
    }

    fn with_polarity(mut pin: P, active_low: bool) -> Self {
        let high = pin.is_set_high().unwrap_or_else(|e| match e {});
        Self {
            pin,
            active_low,
            lit: high != active_low,
        }
    }

    fn drive(&mut self, on: bool) {
        let res = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.unwrap_or_else(|e| match e {});
        self.lit = on;
    }
}

impl<P> Led for GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn on(&mut self) {
        self.drive(true);
    }

    fn off(&mut self) {
        self.drive(false);
    }

    fn toggle(&mut self) {
        self.pin.toggle().unwrap_or_else(|e| match e {});
        self.lit = !self.lit;
    }

    fn is_on(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorType, OutputPin};

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for FakePin {
        fn is_set_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_set_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    #[test]
    fn active_low_drives_inverted_level() {
        let mut led = GpioLed::new(FakePin { high: true });
        assert!(!led.is_on());

        led.on();
        assert!(led.is_on());
        assert!(!led.pin.high);

        led.toggle();
        assert!(!led.is_on());
        assert!(led.pin.high);
    }

    #[test]
    fn active_high_follows_level() {
        let mut led = GpioLed::active_high(FakePin::default());
        assert!(!led.is_on());
        led.toggle();
        assert!(led.is_on());
        assert!(led.pin.high);
        led.off();
        assert!(!led.pin.high);
    }
}
