//! STM32 Blue Pill event-driven LED controller
//! =============================================================================================
//!
//! Drives LED outputs from a periodic timer and a debounced push button, or
//! plays a two-channel PWM triangle ramp, depending on `AppConfig::effect`.
//!
//! Hardware Connections:
//!   - Heartbeat LED (line 30): PC13, onboard, active low
//!   - Toggle LED (line 31, shared with the button by default): PB12 -> resistor -> LED -> GND
//!   - Success LED (line 26): PB13
//!   - Error LED (line 25): PB14
//!   - Button (pin 4): PB1 to GND, internal pull-up
//!   - PWM channel 0 / 1: PA0 (TIM2_CH1) / PA1 (TIM2_CH2)
//!
//! Build:
//!   cargo build --release --features firmware --target thumbv7m-none-eabi

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::{
    exti::ExtiInput,
    pac,
    gpio::{Level, Output, OutputType, Pull, Speed},
    peripherals::TIM2,
    time::Hertz,
    timer::{
        low_level::CountingMode,
        simple_pwm::{PwmPin, SimplePwm},
    },
};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex,
    channel::{Channel, Sender},
};
use embassy_time::{Duration, Ticker, Timer};
use {defmt_rtt as _, panic_probe as _};

use led_effects::{
    Error, InitStage, Result,
    bootstrap::{self, Plan, Services},
    config::{AppConfig, HEARTBEAT_PERIOD, LineId},
    controller::{Controller, Event},
    dispatcher::ButtonDispatcher,
    hardware::{
        gpio_button::GpioButton,
        gpio_led::GpioLed,
        output::OutputBank,
        stm32_pwm::{PwmCompletion, Stm32Pwm},
        traits::Led,
    },
    ramp::{RampGenerator, ReadyFlag},
    toggle::PeriodicToggle,
};

type Line = GpioLed<Output<'static>>;
type AppController = Controller<Line, 2, 1>;

const QUEUE_DEPTH: usize = 8;
const PWM_FREQ: Hertz = Hertz(1_000);
const LSI_STARTUP_SPINS: u32 = 100_000;

// Button and timer events, consumed only by the controller task
static EVENTS: Channel<ThreadModeRawMutex, Event, QUEUE_DEPTH> = Channel::new();

// Raised by the PWM completion task, polled by the ramp
static READY: ReadyFlag = ReadyFlag::new();
static COMPLETION: PwmCompletion = PwmCompletion::new();

/// Configuration-level bring-up of the timer and button services.
///
/// The embassy drivers themselves have infallible constructors; what can
/// fail here is the configuration fed into them.
struct Board<'a> {
    config: &'a AppConfig,
    toggle: Option<PeriodicToggle>,
    dispatcher: Option<ButtonDispatcher<1>>,
}

impl Services for Board<'_> {
    fn init_clock(&mut self) -> Result<()> {
        // embassy_stm32::init already switched to HSE + PLL; verify it locked
        let cr = pac::RCC.cr().read();
        if cr.hserdy() && cr.pllrdy() {
            Ok(())
        } else {
            Err(Error::Init(InitStage::Clock))
        }
    }

    fn request_low_freq_clock(&mut self) {
        // LSI is requested through `rcc.ls`; make sure it is running before
        // anything timer based starts
        pac::RCC.csr().modify(|w| w.set_lsion(true));
        let mut spins: u32 = 0;
        while !pac::RCC.csr().read().lsirdy() {
            spins += 1;
            if spins == LSI_STARTUP_SPINS {
                warn!("LSI not ready after {} polls", spins);
                return;
            }
        }
        info!("LSI running");
    }

    fn init_timer(&mut self) -> Result<()> {
        self.toggle = Some(PeriodicToggle::new(self.config.toggle_line, self.config.toggle_period)?);
        Ok(())
    }

    fn init_buttons(&mut self) -> Result<()> {
        let mut dispatcher = ButtonDispatcher::new();
        dispatcher.bind(self.config.button_pin, self.config.button_line)?;
        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    fn enable_buttons(&mut self) -> Result<()> {
        // ExtiInput is built and its task spawned only once the plan allows buttons
        Ok(())
    }

    fn init_pwm(&mut self) -> Result<()> {
        // SimplePwm::new cannot fail; it is constructed only when the ramp is engaged
        Ok(())
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // HSE 8MHz -> PLL x9 -> 72MHz
    let mut rcc_config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        rcc_config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        rcc_config.rcc.pll = Some(Pll {
            src: PllSource::HSE,
            prediv: PllPreDiv::DIV1,
            mul: PllMul::MUL9,
        });
        rcc_config.rcc.sys = Sysclk::PLL1_P;
        rcc_config.rcc.ahb_pre = AHBPrescaler::DIV1;
        rcc_config.rcc.apb1_pre = APBPrescaler::DIV2;
        rcc_config.rcc.apb2_pre = APBPrescaler::DIV1;
        // low-frequency clock (LSI)
        rcc_config.rcc.ls = LsConfig::default_lsi();
    }
    let p = embassy_stm32::init(rcc_config);

    let config = AppConfig::default();
    info!("starting, effect {}", config.effect);

    // All lines start configured as outputs and cleared
    let physical: [(LineId, Line); 4] = [
        (config.heartbeat_line, GpioLed::new(Output::new(p.PC13, Level::High, Speed::Low))),
        (config.toggle_line, GpioLed::active_high(Output::new(p.PB12, Level::Low, Speed::Low))),
        (config.success_line, GpioLed::active_high(Output::new(p.PB13, Level::Low, Speed::Low))),
        (config.error_line, GpioLed::active_high(Output::new(p.PB14, Level::Low, Speed::Low))),
    ];
    let mut event_lines: OutputBank<Line, 2> = OutputBank::new();
    let mut board_lines: OutputBank<Line, 4> = OutputBank::new();
    for (id, line) in physical {
        let bank_result = if id == config.button_line || id == config.toggle_line {
            event_lines.configure(id, line)
        } else {
            board_lines.configure(id, line)
        };
        if let Err(e) = bank_result {
            error!("line {} not configured: {}", id.0, e);
        }
    }

    let mut board = Board {
        config: &config,
        toggle: None,
        dispatcher: None,
    };
    let report = bootstrap::start(&mut board);
    let plan = Plan::from_report(&report, config.effect);
    info!("plan {}", plan);
    if let Err(e) = bootstrap::show_status(&mut board_lines, &config, &plan) {
        warn!("status lines: {}", e);
    }

    let mut controller = AppController::new(event_lines);
    if let Some(dispatcher) = board.dispatcher.take().filter(|_| plan.buttons) {
        controller = controller.with_dispatcher(dispatcher);
        let button = GpioButton::new(ExtiInput::new(p.PB1, p.EXTI1, Pull::Up), config.button_pin, config.debounce);
        spawner.spawn(button_task(button, EVENTS.sender())).unwrap();
    }
    if let Some(toggle) = board.toggle.take().filter(|_| plan.toggle) {
        let period = toggle.period();
        controller = controller.with_toggle(toggle);
        spawner.spawn(tick_task(period, EVENTS.sender())).unwrap();
    }
    spawner.spawn(controller_task(controller)).unwrap();

    if plan.ramp {
        let ch0 = PwmPin::new_ch1(p.PA0, OutputType::PushPull);
        let ch1 = PwmPin::new_ch2(p.PA1, OutputType::PushPull);
        let simple = SimplePwm::new(p.TIM2, Some(ch0), Some(ch1), None, None, PWM_FREQ, CountingMode::EdgeAlignedUp);
        let mut pwm: Stm32Pwm<'static, TIM2> = Stm32Pwm::new(simple, &COMPLETION);
        spawner
            .spawn(pwm_completion_task(Duration::from_hz(PWM_FREQ.0 as u64)))
            .unwrap();

        let mut ramp = RampGenerator::from_config(&config);
        let mut delay = embassy_time::Delay;
        loop {
            let e = ramp.run(&mut pwm, &READY, &mut delay).await;
            if e.is_fatal() {
                error!("ramp stopped at step {}: {}", ramp.steps(), e);
                let status = board_lines
                    .set(config.success_line, false)
                    .and_then(|()| board_lines.set(config.error_line, true));
                if let Err(e) = status {
                    warn!("status lines: {}", e);
                }
                break;
            }
            warn!("ramp restarted after {}", e);
        }
    }

    // Idle loop: heartbeat on the onboard LED
    loop {
        Timer::after(HEARTBEAT_PERIOD).await;
        if let Ok(led) = board_lines.line_mut(config.heartbeat_line) {
            led.toggle();
        }
    }
}

/// Settled button transitions -> event queue.
#[embassy_executor::task]
async fn button_task(
    mut button: GpioButton<ExtiInput<'static>>,
    events: Sender<'static, ThreadModeRawMutex, Event, QUEUE_DEPTH>,
) {
    loop {
        let event = button.next_event().await;
        info!("button {}: {}", event.pin.0, event.transition);
        events.send(Event::Button(event)).await;
    }
}

/// Compare-match source for the periodic toggle.
#[embassy_executor::task]
async fn tick_task(period: Duration, events: Sender<'static, ThreadModeRawMutex, Event, QUEUE_DEPTH>) {
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        events.send(Event::Tick).await;
    }
}

#[embassy_executor::task]
async fn controller_task(mut controller: AppController) {
    controller.run(EVENTS.receiver()).await;
}

#[embassy_executor::task]
async fn pwm_completion_task(period: Duration) {
    COMPLETION.run(period, &READY).await;
}
