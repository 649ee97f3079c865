//! Event-driven LED output controller
//! =============================================================================================
//!
//! Library half of the `led_controller` firmware. Everything in here is
//! independent of the concrete MCU so it can be exercised on the host; the
//! embassy-stm32 wiring lives in `src/bin/led_controller.rs`.
//!
//! Components:
//! 1. [`debounce`] / [`dispatcher`]: raw button edges -> settled events -> line toggles
//! 2. [`toggle`]: one line toggle per timer compare-match
//! 3. [`ramp`]: 40 step triangular duty ramp over two PWM channels with a busy/ready handshake
//! 4. [`controller`]: single-consumer event loop serializing button and timer events
//! 5. [`bootstrap`]: init ordering, status lines and dependent-component gating

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod dispatcher;
pub mod error;
pub mod hardware;
pub mod ramp;
pub mod toggle;

pub use error::{Error, InitStage, Result};
