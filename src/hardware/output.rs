//! Output line table.
//!
//! Lines are registered once at startup, cleared, and then mutated only by
//! the component that owns their id.

use super::traits::Led;
use crate::config::LineId;
use crate::{Error, Result};
use heapless::LinearMap;

pub struct OutputBank<L, const N: usize> {
    lines: LinearMap<LineId, L, N>,
}

impl<L: Led, const N: usize> Default for OutputBank<L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Led, const N: usize> OutputBank<L, N> {
    pub const fn new() -> Self {
        Self {
            lines: LinearMap::new(),
        }
    }

    /// Registers `line` under `id` and drives it off.
    pub fn configure(&mut self, id: LineId, mut line: L) -> Result<()> {
        if self.lines.contains_key(&id) {
            return Err(Error::LineTable);
        }
        line.off();
        self.lines.insert(id, line).map_err(|_| Error::LineTable)?;
        trace!("line {} configured", id.0);
        Ok(())
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.lines.contains_key(&id)
    }

    pub fn set(&mut self, id: LineId, on: bool) -> Result<()> {
        self.line_mut(id)?.set(on);
        Ok(())
    }

    pub fn clear(&mut self, id: LineId) -> Result<()> {
        self.line_mut(id)?.off();
        Ok(())
    }

    pub fn toggle(&mut self, id: LineId) -> Result<()> {
        self.line_mut(id)?.toggle();
        Ok(())
    }

    pub fn is_on(&self, id: LineId) -> Result<bool> {
        self.lines
            .get(&id)
            .map(Led::is_on)
            .ok_or(Error::UnknownLine(id.0))
    }

    pub fn line_mut(&mut self, id: LineId) -> Result<&mut L> {
        self.lines.get_mut(&id).ok_or(Error::UnknownLine(id.0))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
