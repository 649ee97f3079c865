use crate::Error;

/// A single on/off digital output.
pub trait Led {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);
    fn is_on(&self) -> bool;

    fn set(&mut self, on: bool) {
        if on { self.on() } else { self.off() }
    }
}

/// Logical PWM output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    Ch0,
    Ch1,
}

impl PwmChannel {
    pub const ALL: [PwmChannel; 2] = [PwmChannel::Ch0, PwmChannel::Ch1];

    pub fn index(self) -> usize {
        match self {
            PwmChannel::Ch0 => 0,
            PwmChannel::Ch1 => 1,
        }
    }
}

/// PWM peripheral that buffers a single pending duty change.
///
/// `set_duty` returns `nb::Error::WouldBlock` while an accepted update is
/// still outstanding. Completion of an accepted update is reported out of
/// band through [`ReadyFlag::signal`](crate::ramp::ReadyFlag::signal).
pub trait DutyPwm {
    /// `percent` is the duty cycle in 0..=100.
    fn set_duty(&mut self, channel: PwmChannel, percent: u8) -> nb::Result<(), Error>;
}
