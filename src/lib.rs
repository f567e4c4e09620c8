//! Polled button debouncer for microcontrollers.
//!
//! Call [`ButtonEngine::poll`] once per main-loop iteration. Raw samples of
//! every bound line are majority-voted over `filter_depth` polls into a
//! debounced on/off state, and edges are turned into one-shot events:
//!
//! ```text
//!   [ Gpio ] --raw level--> [ ButtonEngine ] --bitmask--> caller
//!   [ Clock ] --ms--------->  | slot 0: Button            |
//!                             | slot 1: Button            +--> on_press / on_release
//!                             | ...                       +--> on_double_click
//!                             | slot 31                   +--> is_hold / was_hold / on_hold
//! ```
//!
//! ## Features
//!
//! - `hal`: [`hal::PinBank`], a `Gpio` over `embedded_hal` input pins
//! - `embassy`: [`hal::SystemClock`], a `Clock` over `embassy_time`
//! - `defmt`: `defmt::Format` on public types, logging through defmt
//!
//! Everything else builds on the host, so `cargo test` runs the whole
//! engine against the in-memory backends in [`sim`].

#![cfg_attr(not(test), no_std)]

mod log;

pub mod button;
pub mod config;
pub mod engine;
pub mod error;
pub mod hal;
pub mod sim;

pub use button::{Button, Pulse, SlotId};
pub use config::Config;
pub use engine::ButtonEngine;
pub use error::Error;
pub use hal::{Clock, Gpio, PinMode};
