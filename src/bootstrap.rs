//! Startup sequencing.
//!
//! Services come up in a fixed order: clock, timer, buttons, PWM. A failed
//! service is fatal for everything that depends on it and for nothing else:
//!
//! | component      | needs               |
//! |----------------|---------------------|
//! | button events  | clock, timer, button|
//! | periodic toggle| clock, timer        |
//! | pwm ramp       | pwm                 |
//!
//! The outcome is shown on two status lines: success when every service
//! the configuration needs came up, error otherwise.

use crate::config::{AppConfig, Effect};
use crate::hardware::output::OutputBank;
use crate::hardware::traits::Led;
use crate::{Error, InitStage, Result};

/// Peripheral bring-up steps, in the order [`start`] calls them.
pub trait Services {
    fn init_clock(&mut self) -> Result<()>;
    /// Low-frequency clock the timer service runs from.
    fn request_low_freq_clock(&mut self);
    fn init_timer(&mut self) -> Result<()>;
    fn init_buttons(&mut self) -> Result<()>;
    fn enable_buttons(&mut self) -> Result<()>;
    fn init_pwm(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitReport {
    pub clock: Result<()>,
    pub timer: Result<()>,
    pub button: Result<()>,
    pub pwm: Result<()>,
}

impl InitReport {
    pub const fn all_ok() -> Self {
        Self {
            clock: Ok(()),
            timer: Ok(()),
            button: Ok(()),
            pwm: Ok(()),
        }
    }

    pub fn first_failure(&self) -> Option<Error> {
        [self.clock, self.timer, self.button, self.pwm]
            .into_iter()
            .find_map(|r| r.err())
    }
}

/// Components allowed to run after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Plan {
    pub effect: Effect,
    pub buttons: bool,
    pub toggle: bool,
    pub ramp: bool,
}

impl Plan {
    pub fn from_report(report: &InitReport, effect: Effect) -> Self {
        let timer = report.clock.is_ok() && report.timer.is_ok();
        Self {
            effect,
            buttons: timer && report.button.is_ok(),
            toggle: timer && effect == Effect::PeriodicToggle,
            ramp: report.pwm.is_ok() && effect == Effect::PwmRamp,
        }
    }

    /// Buttons and the selected effect are both up.
    pub fn healthy(&self) -> bool {
        self.buttons
            && match self.effect {
                Effect::PeriodicToggle => self.toggle,
                Effect::PwmRamp => self.ramp,
            }
    }
}

/// Brings services up in order, skipping those whose prerequisite failed.
pub fn start<S: Services>(services: &mut S) -> InitReport {
    let clock = services.init_clock();
    if clock.is_ok() {
        services.request_low_freq_clock();
    }

    let timer = match clock {
        Ok(()) => services.init_timer(),
        Err(_) => Err(Error::Init(InitStage::Clock)),
    };

    let button = match timer {
        Ok(()) => services.init_buttons().and_then(|()| services.enable_buttons()),
        Err(e) => Err(e),
    };

    let pwm = services.init_pwm();

    let report = InitReport {
        clock,
        timer,
        button,
        pwm,
    };
    match report.first_failure() {
        None => info!("all services up"),
        Some(e) => error!("startup failure: {}", e),
    }
    report
}

/// Drives the success/error status lines for `plan`.
pub fn show_status<L: Led, const N: usize>(
    outputs: &mut OutputBank<L, N>,
    config: &AppConfig,
    plan: &Plan,
) -> Result<()> {
    let ok = plan.healthy();
    outputs.set(config.success_line, ok)?;
    outputs.set(config.error_line, !ok)?;
    Ok(())
}
