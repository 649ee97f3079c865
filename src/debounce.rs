//! Debounced digital input.
//!
//! [`Debouncer`] turns raw, possibly bouncing, level changes into settled
//! transitions: a level is only reported once it has held for the whole
//! window. Any new edge inside the window restarts it.

use crate::config::PinId;
use embassy_time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Press,
    Release,
}

/// Settled button transition. Consumed by the dispatcher and then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub pin: PinId,
    pub transition: Transition,
}

impl ButtonEvent {
    pub fn press(pin: PinId) -> Self {
        Self {
            pin,
            transition: Transition::Press,
        }
    }

    pub fn release(pin: PinId) -> Self {
        Self {
            pin,
            transition: Transition::Release,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    pressed: bool,
    since: Instant,
}

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pressed: bool,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(pressed: bool, window: Duration) -> Self {
        Self {
            window,
            pressed,
            pending: None,
        }
    }

    /// Last settled state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Records a raw edge; `pressed` is the level sampled right after it.
    pub fn on_edge(&mut self, pressed: bool, now: Instant) {
        self.pending = Some(Pending {
            pressed,
            since: now,
        });
    }

    /// Instant at which the pending edge settles, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.since + self.window)
    }

    /// Reports the settled transition once the window has elapsed.
    ///
    /// A pending level equal to the last settled one (a bounce that came
    /// back) is consumed without producing a transition.
    pub fn poll(&mut self, now: Instant) -> Option<Transition> {
        let pending = self.pending?;
        if now < pending.since + self.window {
            return None;
        }
        self.pending = None;

        if pending.pressed == self.pressed {
            trace!("bounce discarded");
            return None;
        }
        self.pressed = pending.pressed;
        Some(if pending.pressed {
            Transition::Press
        } else {
            Transition::Release
        })
    }
}
