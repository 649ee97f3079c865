//! Periodic toggle driver: one line toggle per compare-match.

use crate::config::LineId;
use crate::hardware::output::OutputBank;
use crate::hardware::traits::Led;
use crate::{Error, InitStage, Result};
use embassy_time::Duration;

pub struct PeriodicToggle {
    line: LineId,
    period: Duration,
    ticks: u32,
}

impl PeriodicToggle {
    /// A zero period cannot be programmed into the compare register.
    pub fn new(line: LineId, period: Duration) -> Result<Self> {
        if period.as_ticks() == 0 {
            return Err(Error::Init(InitStage::Timer));
        }
        Ok(Self {
            line,
            period,
            ticks: 0,
        })
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Compare-match events handled so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn on_tick<L: Led, const N: usize>(&mut self, outputs: &mut OutputBank<L, N>) -> Result<()> {
        outputs.toggle(self.line)?;
        self.ticks = self.ticks.wrapping_add(1);
        trace!("tick {}", self.ticks);
        Ok(())
    }
}
