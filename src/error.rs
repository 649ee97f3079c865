use crate::hardware::traits::PwmChannel;

/// External service whose initialization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStage {
    Clock,
    Timer,
    Button,
    Pwm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Fatal: a peripheral service could not be brought up.
    Init(InitStage),
    /// Button table misconfigured (duplicate pin, table full).
    Button,
    /// Duty update rejected on a channel that does not tolerate back-pressure.
    ChannelBusy(PwmChannel),
    /// The PWM completion callback did not arrive within the configured timeout.
    ReadyTimeout,
    /// Duty value outside 0..=100.
    InvalidDuty(u8),
    /// Output line id not present in the output bank.
    UnknownLine(u8),
    /// Output bank full or line registered twice.
    LineTable,
}

impl Error {
    /// Whether the error ends the component that raised it.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ReadyTimeout)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Init(stage) => write!(f, "{:?} initialization failed", stage),
            Error::Button => f.write_str("invalid button configuration"),
            Error::ChannelBusy(ch) => write!(f, "pwm channel {} busy", ch.index()),
            Error::ReadyTimeout => f.write_str("pwm ready timeout"),
            Error::InvalidDuty(v) => write!(f, "duty {} out of range", v),
            Error::UnknownLine(id) => write!(f, "unknown output line {}", id),
            Error::LineTable => f.write_str("output line table full or duplicate line"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
