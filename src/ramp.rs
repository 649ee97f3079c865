//! Two-channel PWM triangle ramp.
//!
//! One pass walks [`RAMP_STEPS`] duty values 0 -> 100 -> 5 in steps of 5%.
//! Every step is committed with a busy/ready handshake:
//!
//! 1. clear the [`ReadyFlag`]
//! 2. write channel 0, retrying for as long as the peripheral reports busy
//! 3. wait until the completion callback raises the ready flag
//! 4. write channel 1; busy here is fatal
//! 5. hold before the next step
//!
//! The pass ends after the last step with both channels at 5%. Restarting
//! is left to the caller.

use crate::config::AppConfig;
use crate::hardware::traits::{DutyPwm, PwmChannel};
use crate::{Error, Result};
use core::sync::atomic::{AtomicBool, Ordering};
use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

pub const RAMP_STEPS: usize = 40;
const DUTY_INCREMENT: u8 = 5;
const HALF: usize = RAMP_STEPS / 2;

/// Duty cycle (percent) of ramp step `step`, wrapping every pass.
pub const fn duty_at(step: usize) -> u8 {
    let step = step % RAMP_STEPS;
    if step < HALF {
        step as u8 * DUTY_INCREMENT
    } else {
        100 - (step - HALF) as u8 * DUTY_INCREMENT
    }
}

pub const fn ramp_table() -> [u8; RAMP_STEPS] {
    let mut table = [0u8; RAMP_STEPS];
    let mut i = 0;
    while i < RAMP_STEPS {
        table[i] = duty_at(i);
        i += 1;
    }
    table
}

/// `DelayNs` takes `u32` milliseconds; longer waits clamp to `u32::MAX`.
fn saturating_ms(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

/// Completion flag raised by the PWM peripheral's ready callback.
///
/// Written from interrupt context, cleared and polled by the ramp. The
/// release store / acquire load pair is all a single core needs.
pub struct ReadyFlag {
    ready: AtomicBool,
}

impl Default for ReadyFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyFlag {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Called by the peripheral when the last accepted update completed.
    pub fn signal(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.ready.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Spins (yielding to the executor) until the flag is raised.
    pub async fn wait(&self) {
        while !self.is_set() {
            yield_now().await;
        }
    }
}

pub struct RampGenerator {
    hold: Duration,
    ready_timeout: Option<Duration>,
    duty: [u8; 2],
    steps: usize,
    busy_retries: u32,
}

impl RampGenerator {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            ready_timeout: None,
            duty: [0; 2],
            steps: 0,
            busy_retries: 0,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ready_timeout: config.ready_timeout,
            ..Self::new(config.ramp_hold)
        }
    }

    /// Bounds the channel-0 handshake (busy retry plus ready wait).
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Last duty accepted on `channel`.
    pub fn duty(&self, channel: PwmChannel) -> u8 {
        self.duty[channel.index()]
    }

    /// Steps committed in the current (or last) pass.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Channel-0 writes rejected as busy since creation.
    pub fn busy_retries(&self) -> u32 {
        self.busy_retries
    }

    /// Runs one full pass. Stops at the first failing step.
    pub async fn run_pass<P, D>(&mut self, pwm: &mut P, ready: &ReadyFlag, delay: &mut D) -> Result<()>
    where
        P: DutyPwm,
        D: DelayNs,
    {
        self.steps = 0;
        for step in 0..RAMP_STEPS {
            self.run_step(step, pwm, ready, delay).await?;
        }
        debug!("ramp pass complete");
        Ok(())
    }

    /// Repeats passes until one fails and returns that error.
    pub async fn run<P, D>(&mut self, pwm: &mut P, ready: &ReadyFlag, delay: &mut D) -> Error
    where
        P: DutyPwm,
        D: DelayNs,
    {
        loop {
            if let Err(e) = self.run_pass(pwm, ready, delay).await {
                return e;
            }
        }
    }

    async fn run_step<P, D>(&mut self, step: usize, pwm: &mut P, ready: &ReadyFlag, delay: &mut D) -> Result<()>
    where
        P: DutyPwm,
        D: DelayNs,
    {
        let duty = duty_at(step);
        ready.clear();

        let committed = match self.ready_timeout {
            None => commit_primary(pwm, ready, duty, &mut self.busy_retries).await,
            Some(timeout) => {
                let handshake = commit_primary(pwm, ready, duty, &mut self.busy_retries);
                match select(handshake, delay.delay_ms(saturating_ms(timeout))).await {
                    Either::First(r) => r,
                    Either::Second(()) => {
                        warn!("step {}: no ready callback within {} ms", step, timeout.as_millis());
                        Err(Error::ReadyTimeout)
                    }
                }
            }
        };
        committed?;
        self.duty[PwmChannel::Ch0.index()] = duty;

        match pwm.set_duty(PwmChannel::Ch1, duty) {
            Ok(()) => self.duty[PwmChannel::Ch1.index()] = duty,
            Err(nb::Error::WouldBlock) => {
                error!("step {}: channel 1 busy", step);
                return Err(Error::ChannelBusy(PwmChannel::Ch1));
            }
            Err(nb::Error::Other(e)) => return Err(e),
        }
        self.steps = step + 1;
        trace!("step {} duty {}", step, duty);

        delay.delay_ms(saturating_ms(self.hold)).await;
        Ok(())
    }
}

/// Channel 0 tolerates back-pressure: retry until accepted, then rendezvous
/// with the completion callback.
async fn commit_primary<P: DutyPwm>(pwm: &mut P, ready: &ReadyFlag, duty: u8, retries: &mut u32) -> Result<()> {
    loop {
        match pwm.set_duty(PwmChannel::Ch0, duty) {
            Ok(()) => break,
            Err(nb::Error::WouldBlock) => {
                *retries = retries.wrapping_add(1);
                yield_now().await;
            }
            Err(nb::Error::Other(e)) => return Err(e),
        }
    }
    ready.wait().await;
    Ok(())
}
