//! Engine-wide constants and runtime configuration.
//!
//! Timing thresholds and table limits live here so they can be tuned in
//! one place. `Config` carries the two values chosen at setup time.

// Table

/// Hard upper bound on the number of button slots.
///
/// The bitmask returned from a poll is a `u32`, one bit per slot.
pub const MAX_BUTTONS: usize = 32;

/// Slot count used by `Config::default()`.
pub const DEFAULT_MAX_BUTTONS: u8 = 3;

// Debounce

/// Number of polls majority-voted into one debounced state.
pub const DEFAULT_FILTER_DEPTH: u8 = 3;

// Gestures

/// Hold shorter than this counts as a click; an open gap of at least this
/// long discards a pending click streak (ms).
pub const DOUBLE_CLICK_WINDOW_MS: u32 = 200;

/// Clicks needed to fire a double-click.
pub const DOUBLE_CLICK_COUNT: u8 = 2;

/// Setup parameters for a [`ButtonEngine`](crate::engine::ButtonEngine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    max_buttons: u8,
    filter_depth: u8,
}

impl Config {
    /// Create a configuration, clamping both values into their legal range.
    pub const fn new(max_buttons: u8, filter_depth: u8) -> Self {
        Self {
            max_buttons: clamp_max_buttons(max_buttons),
            filter_depth: clamp_filter_depth(filter_depth),
        }
    }

    pub const fn max_buttons(mut self, max_buttons: u8) -> Self {
        self.max_buttons = clamp_max_buttons(max_buttons);
        self
    }

    pub const fn filter_depth(mut self, filter_depth: u8) -> Self {
        self.filter_depth = clamp_filter_depth(filter_depth);
        self
    }

    /// Number of slots the table will hold (never above [`MAX_BUTTONS`]).
    pub const fn capacity(&self) -> usize {
        self.max_buttons as usize
    }

    /// Length of the decimation window in polls (at least 1).
    pub const fn depth(&self) -> u8 {
        self.filter_depth
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUTTONS, DEFAULT_FILTER_DEPTH)
    }
}

const fn clamp_max_buttons(max_buttons: u8) -> u8 {
    if max_buttons as usize > MAX_BUTTONS {
        MAX_BUTTONS as u8
    } else {
        max_buttons
    }
}

// A zero-length window would decimate every poll anyway; make that explicit.
const fn clamp_filter_depth(filter_depth: u8) -> u8 {
    if filter_depth == 0 {
        1
    } else {
        filter_depth
    }
}
