//! In-memory backends for running the engine off-target.
//!
//! Both types use interior mutability, so a test (or a host-side
//! simulation) can keep a shared reference while the engine owns another:
//!
//! ```
//! use buttonpoll::config::Config;
//! use buttonpoll::engine::ButtonEngine;
//! use buttonpoll::sim::{ManualClock, SimLines};
//!
//! let lines = SimLines::new();
//! let clock = ManualClock::new(0);
//! let mut engine = ButtonEngine::with_config(&lines, &clock, Config::new(4, 1));
//!
//! let slot = engine.add_button(5).unwrap();
//! lines.press(5);
//! clock.advance(10);
//! assert_eq!(engine.poll_elapsed(), Ok(0b1));
//! assert_eq!(engine.on_press(slot), Ok(true));
//! ```

use core::cell::Cell;

use crate::config::MAX_BUTTONS;
use crate::hal::{Clock, Gpio, PinMode};

/// 32 simulated lines, channel = bit index. All lines start high (released).
#[derive(Debug)]
pub struct SimLines {
    levels: Cell<u32>,
    configured: Cell<u32>,
    pulled_up: Cell<u32>,
}

impl SimLines {
    pub const fn new() -> Self {
        Self {
            levels: Cell::new(u32::MAX),
            configured: Cell::new(0),
            pulled_up: Cell::new(0),
        }
    }

    /// Drive the line low.
    pub fn press(&self, channel: u8) {
        self.set_level(channel, false);
    }

    /// Let the line float back high.
    pub fn release(&self, channel: u8) {
        self.set_level(channel, true);
    }

    pub fn set_level(&self, channel: u8, high: bool) {
        if let Some(bit) = bit(channel) {
            set_bit(&self.levels, bit, high);
        }
    }

    /// Raw level; lines past the last channel read high.
    pub fn level(&self, channel: u8) -> bool {
        bit(channel).map_or(true, |bit| self.levels.get() & bit != 0)
    }

    pub fn mode(&self, channel: u8) -> Option<PinMode> {
        let bit = bit(channel)?;
        if self.configured.get() & bit == 0 {
            None
        } else if self.pulled_up.get() & bit != 0 {
            Some(PinMode::PullUpInput)
        } else {
            Some(PinMode::Input)
        }
    }

    fn apply(&self, channel: u8, mode: PinMode) {
        if let Some(bit) = bit(channel) {
            set_bit(&self.configured, bit, true);
            set_bit(&self.pulled_up, bit, mode == PinMode::PullUpInput);
        }
    }
}

impl Default for SimLines {
    fn default() -> Self {
        Self::new()
    }
}

impl Gpio for SimLines {
    type Channel = u8;

    fn configure(&mut self, channel: u8, mode: PinMode) {
        self.apply(channel, mode);
    }

    fn read(&mut self, channel: u8) -> bool {
        self.level(channel)
    }
}

impl Gpio for &SimLines {
    type Channel = u8;

    fn configure(&mut self, channel: u8, mode: PinMode) {
        self.apply(channel, mode);
    }

    fn read(&mut self, channel: u8) -> bool {
        self.level(channel)
    }
}

fn bit(channel: u8) -> Option<u32> {
    if (channel as usize) < MAX_BUTTONS {
        Some(1u32 << channel)
    } else {
        None
    }
}

fn set_bit(cell: &Cell<u32>, bit: u32, on: bool) {
    let value = cell.get();
    cell.set(if on { value | bit } else { value & !bit });
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u32>,
}

impl ManualClock {
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Move forward, wrapping like a hardware counter.
    pub fn advance(&self, ms: u32) {
        self.now_ms.set(self.now_ms.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.now_ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now_ms.get()
    }
}
