//! Button event dispatcher.
//!
//! Every monitored pin is bound to exactly one output line. A press toggles
//! that line; releases and pins outside the table are ignored.

use crate::config::{LineId, PinId};
use crate::debounce::{ButtonEvent, Transition};
use crate::hardware::output::OutputBank;
use crate::hardware::traits::Led;
use crate::{Error, Result};
use heapless::LinearMap;

/// What a single event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    Toggled(LineId),
    Released,
    UnknownPin(PinId),
}

pub struct ButtonDispatcher<const N: usize> {
    bindings: LinearMap<PinId, LineId, N>,
}

impl<const N: usize> Default for ButtonDispatcher<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ButtonDispatcher<N> {
    pub const fn new() -> Self {
        Self {
            bindings: LinearMap::new(),
        }
    }

    /// Binds `pin` to `line`. A pin can only be bound once.
    pub fn bind(&mut self, pin: PinId, line: LineId) -> Result<()> {
        if self.bindings.contains_key(&pin) {
            return Err(Error::Button);
        }
        self.bindings.insert(pin, line).map_err(|_| Error::Button)?;
        Ok(())
    }

    pub fn line_for(&self, pin: PinId) -> Option<LineId> {
        self.bindings.get(&pin).copied()
    }

    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.bindings.keys().copied()
    }

    pub fn handle<L: Led, const M: usize>(
        &self,
        event: ButtonEvent,
        outputs: &mut OutputBank<L, M>,
    ) -> Result<Dispatch> {
        let Some(line) = self.line_for(event.pin) else {
            warn!("event for unmonitored pin {}", event.pin.0);
            return Ok(Dispatch::UnknownPin(event.pin));
        };

        match event.transition {
            Transition::Press => {
                outputs.toggle(line)?;
                debug!("pin {} pressed, line {} toggled", event.pin.0, line.0);
                Ok(Dispatch::Toggled(line))
            }
            Transition::Release => Ok(Dispatch::Released),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::output::tests::bank;

    fn dispatcher() -> ButtonDispatcher<2> {
        let mut d = ButtonDispatcher::new();
        d.bind(PinId(4), LineId(31)).unwrap();
        d
    }

    #[test]
    fn each_press_toggles_once() {
        let d = dispatcher();
        let mut outputs = bank(&[31]);

        for n in 1..=5u32 {
            let r = d.handle(ButtonEvent::press(PinId(4)), &mut outputs);
            assert_eq!(r, Ok(Dispatch::Toggled(LineId(31))));
            assert_eq!(outputs.line_mut(LineId(31)).unwrap().toggles, n);
        }
        assert_eq!(outputs.is_on(LineId(31)), Ok(true));
    }

    #[test]
    fn release_does_not_toggle() {
        let d = dispatcher();
        let mut outputs = bank(&[31]);
        let r = d.handle(ButtonEvent::release(PinId(4)), &mut outputs);
        assert_eq!(r, Ok(Dispatch::Released));
        assert_eq!(outputs.line_mut(LineId(31)).unwrap().toggles, 0);
    }

    #[test]
    fn unknown_pin_ignored() {
        let d = dispatcher();
        let mut outputs = bank(&[31]);
        let r = d.handle(ButtonEvent::press(PinId(9)), &mut outputs);
        assert_eq!(r, Ok(Dispatch::UnknownPin(PinId(9))));
        assert_eq!(outputs.line_mut(LineId(31)).unwrap().toggles, 0);
    }

    #[test]
    fn pin_bound_once() {
        let mut d = dispatcher();
        assert_eq!(d.bind(PinId(4), LineId(30)), Err(Error::Button));
        d.bind(PinId(5), LineId(30)).unwrap();
        assert_eq!(d.bind(PinId(6), LineId(30)), Err(Error::Button));
        assert_eq!(d.pins().count(), 2);
    }

    #[test]
    fn bound_line_missing_from_bank() {
        let d = dispatcher();
        let mut outputs = bank(&[30]);
        assert_eq!(
            d.handle(ButtonEvent::press(PinId(4)), &mut outputs),
            Err(Error::UnknownLine(31))
        );
    }
}
