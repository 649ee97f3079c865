use crate::config::PinId;
use crate::debounce::{ButtonEvent, Debouncer};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

/// Edge-interrupt button with pull-up: pressed = low.
pub struct GpioButton<I> {
    pin: I,
    id: PinId,
    debouncer: Debouncer,
}

impl<I> GpioButton<I>
where
    I: InputPin + Wait,
{
    pub fn new(mut pin: I, id: PinId, window: Duration) -> Self {
        let pressed = pin.is_low().unwrap_or(false);
        Self {
            pin,
            id,
            debouncer: Debouncer::new(pressed, window),
        }
    }

    pub fn id(&self) -> PinId {
        self.id
    }

    fn sample(&mut self) {
        let pressed = self.pin.is_low().unwrap_or(self.debouncer.is_pressed());
        self.debouncer.on_edge(pressed, Instant::now());
    }

    /// Waits for the next settled transition of this button.
    pub async fn next_event(&mut self) -> ButtonEvent {
        loop {
            let Some(deadline) = self.debouncer.deadline() else {
                let _ = self.pin.wait_for_any_edge().await;
                self.sample();
                continue;
            };

            let outcome = select(self.pin.wait_for_any_edge(), Timer::at(deadline)).await;
            match outcome {
                Either::First(_) => self.sample(),
                Either::Second(()) => {
                    if let Some(transition) = self.debouncer.poll(Instant::now()) {
                        return ButtonEvent {
                            pin: self.id,
                            transition,
                        };
                    }
                }
            }
        }
    }
}
