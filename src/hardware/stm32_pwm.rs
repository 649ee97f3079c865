//! Two-channel PWM on an STM32 general purpose timer with a single-slot
//! update buffer.
//!
//! The compare registers are preloaded, so a new duty only reaches the pin
//! at the next update event. [`PwmCompletion`] models that: an accepted
//! write occupies the slot for one PWM period, after which the slot is freed
//! and the ramp's ready flag is raised.

use super::traits::{DutyPwm, PwmChannel};
use crate::Error;
use crate::ramp::ReadyFlag;
use core::sync::atomic::{AtomicBool, Ordering};
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::{Channel, GeneralInstance4Channel};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

pub struct PwmCompletion {
    pending: AtomicBool,
    submitted: Signal<CriticalSectionRawMutex, ()>,
}

impl PwmCompletion {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            submitted: Signal::new(),
        }
    }

    /// Claims the update slot; `false` if an update is still outstanding.
    fn claim(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Completion source. Runs forever in its own task.
    pub async fn run(&self, period: Duration, ready: &ReadyFlag) {
        loop {
            self.submitted.wait().await;
            Timer::after(period).await;
            self.pending.store(false, Ordering::Release);
            ready.signal();
        }
    }
}

impl Default for PwmCompletion {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Stm32Pwm<'d, T: GeneralInstance4Channel> {
    pwm: SimplePwm<'d, T>,
    completion: &'static PwmCompletion,
}

impl<'d, T: GeneralInstance4Channel> Stm32Pwm<'d, T> {
    /// Logical channel 0 is timer CH1, channel 1 is CH2.
    pub fn new(mut pwm: SimplePwm<'d, T>, completion: &'static PwmCompletion) -> Self {
        for ch in [Channel::Ch1, Channel::Ch2] {
            let mut channel = pwm.channel(ch);
            channel.set_duty_cycle_fully_off();
            channel.enable();
        }
        Self { pwm, completion }
    }
}

impl<T: GeneralInstance4Channel> DutyPwm for Stm32Pwm<'_, T> {
    fn set_duty(&mut self, channel: PwmChannel, percent: u8) -> nb::Result<(), Error> {
        if percent > 100 {
            return Err(nb::Error::Other(Error::InvalidDuty(percent)));
        }
        if !self.completion.claim() {
            return Err(nb::Error::WouldBlock);
        }
        let ch = match channel {
            PwmChannel::Ch0 => Channel::Ch1,
            PwmChannel::Ch1 => Channel::Ch2,
        };
        self.pwm.channel(ch).set_duty_cycle_percent(percent);
        self.completion.submitted.signal(());
        Ok(())
    }
}
