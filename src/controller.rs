//! Single-consumer event loop.
//!
//! Button and timer sources only enqueue [`Event`]s; the [`Controller`]
//! is the one place that touches the output lines, so handlers never
//! interleave and toggles on a shared line land in queue order.

use crate::config::LineId;
use crate::debounce::ButtonEvent;
use crate::dispatcher::{ButtonDispatcher, Dispatch};
use crate::hardware::output::OutputBank;
use crate::hardware::traits::Led;
use crate::toggle::PeriodicToggle;
use crate::Result;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Button(ButtonEvent),
    /// Timer compare-match.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    Button(Dispatch),
    Ticked(LineId),
    /// The component for this event did not come up at startup.
    Disabled,
}

pub struct Controller<L, const N: usize, const B: usize> {
    outputs: OutputBank<L, N>,
    dispatcher: Option<ButtonDispatcher<B>>,
    toggle: Option<PeriodicToggle>,
}

impl<L: Led, const N: usize, const B: usize> Controller<L, N, B> {
    pub fn new(outputs: OutputBank<L, N>) -> Self {
        Self {
            outputs,
            dispatcher: None,
            toggle: None,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: ButtonDispatcher<B>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_toggle(mut self, toggle: PeriodicToggle) -> Self {
        self.toggle = Some(toggle);
        self
    }

    pub fn outputs(&self) -> &OutputBank<L, N> {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut OutputBank<L, N> {
        &mut self.outputs
    }

    pub fn toggle(&self) -> Option<&PeriodicToggle> {
        self.toggle.as_ref()
    }

    pub fn handle(&mut self, event: Event) -> Result<Handled> {
        match event {
            Event::Button(button) => match &self.dispatcher {
                Some(dispatcher) => dispatcher.handle(button, &mut self.outputs).map(Handled::Button),
                None => Ok(Handled::Disabled),
            },
            Event::Tick => match &mut self.toggle {
                Some(toggle) => {
                    toggle.on_tick(&mut self.outputs)?;
                    Ok(Handled::Ticked(toggle.line()))
                }
                None => Ok(Handled::Disabled),
            },
        }
    }

    /// Consumes events forever.
    pub async fn run<M: RawMutex, const Q: usize>(&mut self, events: Receiver<'_, M, Event, Q>) {
        loop {
            let event = events.receive().await;
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: Event) {
        if let Err(e) = self.handle(event) {
            error!("event {} failed: {}", event, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PinId;
    use crate::hardware::output::tests::{FakeLine, bank};
    use embassy_futures::select::{Either, select};
    use embassy_futures::{block_on, yield_now};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;
    use embassy_time::Duration;

    const BUTTON: PinId = PinId(4);
    const SHARED: LineId = LineId(31);

    fn controller() -> Controller<FakeLine, 8, 1> {
        let mut dispatcher = ButtonDispatcher::new();
        dispatcher.bind(BUTTON, SHARED).unwrap();
        let toggle = PeriodicToggle::new(SHARED, Duration::from_millis(500)).unwrap();
        Controller::new(bank(&[30, 31]))
            .with_dispatcher(dispatcher)
            .with_toggle(toggle)
    }

    fn toggles(c: &mut Controller<FakeLine, 8, 1>, line: LineId) -> u32 {
        c.outputs_mut().line_mut(line).unwrap().toggles
    }

    #[test]
    fn shared_line_toggles_in_event_order() {
        let mut c = controller();
        let mut levels = Vec::new();
        for event in [
            Event::Tick,
            Event::Button(ButtonEvent::press(BUTTON)),
            Event::Button(ButtonEvent::release(BUTTON)),
            Event::Tick,
        ] {
            c.handle(event).unwrap();
            levels.push(c.outputs().is_on(SHARED).unwrap());
        }
        assert_eq!(levels, [true, false, false, true]);
        assert_eq!(toggles(&mut c, SHARED), 3);
        assert_eq!(toggles(&mut c, LineId(30)), 0);
    }

    #[test]
    fn ticks_unaffected_by_button_activity() {
        let mut c = controller();
        for _ in 0..10 {
            c.handle(Event::Tick).unwrap();
            c.handle(Event::Button(ButtonEvent::press(PinId(7)))).unwrap();
            c.handle(Event::Button(ButtonEvent::release(BUTTON))).unwrap();
        }
        assert_eq!(c.toggle().map(PeriodicToggle::ticks), Some(10));
        assert_eq!(toggles(&mut c, SHARED), 10);
    }

    #[test]
    fn disabled_components_drop_their_events() {
        let mut c: Controller<FakeLine, 8, 1> = Controller::new(bank(&[31]));
        assert_eq!(c.handle(Event::Tick), Ok(Handled::Disabled));
        assert_eq!(
            c.handle(Event::Button(ButtonEvent::press(BUTTON))),
            Ok(Handled::Disabled)
        );
        assert_eq!(toggles(&mut c, SHARED), 0);
    }

    #[test]
    fn run_consumes_queue_in_order() {
        let queue: Channel<CriticalSectionRawMutex, Event, 4> = Channel::new();
        let mut c = controller();
        queue.try_send(Event::Tick).unwrap();
        queue.try_send(Event::Button(ButtonEvent::press(BUTTON))).unwrap();
        queue.try_send(Event::Tick).unwrap();

        // run never returns; stop it once the queue is drained
        let stopped = block_on(select(c.run(queue.receiver()), yield_now()));
        assert!(matches!(stopped, Either::Second(())));

        assert!(queue.is_empty());
        assert_eq!(toggles(&mut c, SHARED), 3);
        assert_eq!(c.outputs().is_on(SHARED), Ok(true));
        assert_eq!(c.toggle().map(PeriodicToggle::ticks), Some(2));
    }
}
