//! Runtime configuration.
//!
//! Line and pin identifiers are logical: the firmware binary decides which
//! physical GPIO backs each one.

use embassy_time::Duration;

/// Settle time a button level must hold before it is reported.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);
/// Compare-match period of the periodic toggle driver.
pub const TOGGLE_PERIOD: Duration = Duration::from_millis(500);
/// Hold time between two ramp steps.
pub const RAMP_HOLD: Duration = Duration::from_millis(50);
/// Idle-loop heartbeat period.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_millis(1000);

/// Stable identifier of a digital output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(pub u8);

/// Identifier of a monitored button pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub u8);

/// Effect engaged by the idle loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Timer driven toggle of `toggle_line`.
    #[default]
    PeriodicToggle,
    /// Repeated two-channel PWM triangle ramp.
    PwmRamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    pub effect: Effect,
    pub debounce: Duration,
    pub toggle_period: Duration,
    pub ramp_hold: Duration,
    /// `None` waits for the PWM ready callback forever.
    pub ready_timeout: Option<Duration>,
    pub button_pin: PinId,
    pub button_line: LineId,
    pub toggle_line: LineId,
    pub heartbeat_line: LineId,
    pub success_line: LineId,
    pub error_line: LineId,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            effect: Effect::default(),
            debounce: DEBOUNCE_WINDOW,
            toggle_period: TOGGLE_PERIOD,
            ramp_hold: RAMP_HOLD,
            ready_timeout: None,
            button_pin: PinId(4),
            button_line: LineId(31),
            toggle_line: LineId(31),
            heartbeat_line: LineId(30),
            success_line: LineId(26),
            error_line: LineId(25),
        }
    }
}

impl AppConfig {
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timing() {
        let config = AppConfig::default();
        assert_eq!(config.debounce.as_millis(), 50);
        assert_eq!(config.toggle_period.as_millis(), 500);
        assert_eq!(config.ramp_hold.as_millis(), 50);
        assert_eq!(config.ready_timeout, None);
        assert_eq!(config.effect, Effect::PeriodicToggle);
    }

    #[test]
    fn builder_overrides() {
        let config = AppConfig::default()
            .with_effect(Effect::PwmRamp)
            .with_ready_timeout(Duration::from_millis(10));
        assert_eq!(config.effect, Effect::PwmRamp);
        assert_eq!(config.ready_timeout, Some(Duration::from_millis(10)));
    }
}
