pub mod gpio_button;
pub mod gpio_led;
pub mod output;
#[cfg(feature = "firmware")]
pub mod stm32_pwm;
pub mod traits;
