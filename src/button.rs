//! Per-slot button record.
//!
//! Every poll feeds one raw sample into [`Button::sample`]; every
//! `filter_depth` polls the engine calls [`Button::decimate`], which turns the
//! accumulated samples into a debounced state and classifies the edge.
//!
//! ```text
//!            sample()            decimate()
//!   raw pin ---------> counters -----------> state + Pulse
//!                        |                        |
//!                  held_ms / open_ms        click streak
//! ```

use crate::config::{DOUBLE_CLICK_COUNT, DOUBLE_CLICK_WINDOW_MS};

/// Index of a slot in the engine's table.
pub type SlotId = usize;

/// One-shot event left behind by the last decimation cycle.
///
/// Reset to `Idle` on the next poll, so each pulse is visible for exactly
/// one poll. Press and release can't coincide, and a double-click only ever
/// concludes a release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pulse {
    #[default]
    Idle,
    Pressed,
    Released { double_click: bool },
}

impl Pulse {
    pub fn is_press(self) -> bool {
        matches!(self, Pulse::Pressed)
    }

    pub fn is_release(self) -> bool {
        matches!(self, Pulse::Released { .. })
    }

    pub fn is_double_click(self) -> bool {
        matches!(self, Pulse::Released { double_click: true })
    }
}

/// A table entry: free, or bound to a physical line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot<C> {
    Empty,
    Occupied(Button<C>),
}

impl<C> Slot<C> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn button(&self) -> Option<&Button<C>> {
        match self {
            Slot::Occupied(button) => Some(button),
            Slot::Empty => None,
        }
    }

    pub(crate) fn button_mut(&mut self) -> Option<&mut Button<C>> {
        match self {
            Slot::Occupied(button) => Some(button),
            Slot::Empty => None,
        }
    }
}

/// Debounce and gesture state of one button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button<C> {
    channel: C,
    state: bool,
    previous_state: bool,
    /// Asserted samples in the current window, never above `filter_depth`.
    asserted_samples: u8,
    pulse: Pulse,
    /// Time spent asserted since the last release.
    held_ms: u32,
    /// `held_ms` as it was at the last release.
    previous_held_ms: u32,
    /// Time spent open since the last release.
    open_ms: u32,
    click_streak: u8,
}

impl<C: Copy> Button<C> {
    pub fn channel(&self) -> C {
        self.channel
    }
}

impl<C> Button<C> {
    pub(crate) fn new(channel: C) -> Self {
        Self {
            channel,
            state: false,
            previous_state: false,
            asserted_samples: 0,
            pulse: Pulse::Idle,
            held_ms: 0,
            previous_held_ms: 0,
            open_ms: 0,
            click_streak: 0,
        }
    }

    /// Record one raw sample taken `elapsed_ms` after the previous one.
    ///
    /// Also ends the pulse of the previous decimation cycle.
    pub(crate) fn sample(&mut self, asserted: bool, elapsed_ms: u32) {
        self.pulse = Pulse::Idle;
        if asserted {
            self.asserted_samples = self.asserted_samples.saturating_add(1);
            self.held_ms = self.held_ms.saturating_add(elapsed_ms);
        } else {
            self.open_ms = self.open_ms.saturating_add(elapsed_ms);
        }
    }

    /// Close the current window: majority-vote, detect the edge and
    /// classify it.
    ///
    /// A tie (possible only for an even `filter_depth`) votes off.
    pub(crate) fn decimate(&mut self, filter_depth: u8) -> Pulse {
        self.previous_state = self.state;
        self.state = self.asserted_samples > filter_depth / 2;
        self.asserted_samples = 0;

        // A long enough open gap makes any pending click stale. A release in
        // this same cycle still counts as the first click of a new streak.
        if self.open_ms >= DOUBLE_CLICK_WINDOW_MS {
            self.click_streak = 0;
        }

        self.pulse = match (self.previous_state, self.state) {
            (false, true) => Pulse::Pressed,
            (true, false) => Pulse::Released {
                double_click: self.conclude_press(),
            },
            _ => Pulse::Idle,
        };
        self.pulse
    }

    /// Returns whether this release completes a double-click.
    fn conclude_press(&mut self) -> bool {
        self.previous_held_ms = self.held_ms;
        self.held_ms = 0;
        self.open_ms = 0;

        if self.previous_held_ms >= DOUBLE_CLICK_WINDOW_MS {
            return false;
        }

        self.click_streak += 1;
        if self.click_streak >= DOUBLE_CLICK_COUNT {
            self.click_streak = 0;
            true
        } else {
            false
        }
    }

    pub fn pulse(&self) -> Pulse {
        self.pulse
    }

    pub fn on_press(&self) -> bool {
        self.pulse.is_press()
    }

    pub fn on_release(&self) -> bool {
        self.pulse.is_release()
    }

    pub fn on_double_click(&self) -> bool {
        self.pulse.is_double_click()
    }

    /// Released just now, after being held for at least `threshold_ms`.
    pub fn on_hold(&self, threshold_ms: u32) -> bool {
        self.on_release() && self.was_hold(threshold_ms)
    }

    /// Debounced state.
    pub fn is_on(&self) -> bool {
        self.state
    }

    /// Still pressed, and has been for at least `threshold_ms`.
    pub fn is_hold(&self, threshold_ms: u32) -> bool {
        self.held_ms >= threshold_ms
    }

    /// The last completed press lasted at least `threshold_ms`.
    pub fn was_hold(&self, threshold_ms: u32) -> bool {
        self.previous_held_ms >= threshold_ms
    }

    pub fn held_ms(&self) -> u32 {
        self.held_ms
    }

    pub fn previous_held_ms(&self) -> u32 {
        self.previous_held_ms
    }

    pub fn open_ms(&self) -> u32 {
        self.open_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed one full window of samples, each `step_ms` apart.
    fn window(button: &mut Button<u8>, depth: u8, asserted: u8, step_ms: u32) -> Pulse {
        for i in 0..depth {
            button.sample(i < asserted, step_ms);
        }
        button.decimate(depth)
    }

    /// Press for `held_ms`, then release; returns the release pulse.
    fn click(button: &mut Button<u8>, held_ms: u32) -> Pulse {
        window(button, 1, 1, held_ms);
        window(button, 1, 0, 0)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Majority Vote
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn strict_majority_turns_on() {
        let mut button = Button::new(0u8);
        window(&mut button, 3, 2, 1);
        assert!(button.is_on());
    }

    #[test]
    fn minority_stays_off() {
        let mut button = Button::new(0u8);
        window(&mut button, 3, 1, 1);
        assert!(!button.is_on());
    }

    #[test]
    fn even_depth_tie_votes_off() {
        let mut button = Button::new(0u8);
        window(&mut button, 4, 2, 1);
        assert!(!button.is_on());
        window(&mut button, 4, 3, 1);
        assert!(button.is_on());
        window(&mut button, 4, 2, 1);
        assert!(!button.is_on());
    }

    #[test]
    fn sample_counter_restarts_every_window() {
        let mut button = Button::new(0u8);
        window(&mut button, 5, 2, 1);
        // 2 leftover + 2 new would be a majority if the counter carried over
        window(&mut button, 5, 2, 1);
        assert!(!button.is_on());
        assert_eq!(button.asserted_samples, 0);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Edges
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn press_and_release_pulses_follow_transitions() {
        let mut button = Button::new(0u8);
        assert_eq!(window(&mut button, 3, 3, 10), Pulse::Pressed);
        assert_eq!(window(&mut button, 3, 3, 10), Pulse::Idle);
        assert!(window(&mut button, 3, 0, 10).is_release());
        assert_eq!(window(&mut button, 3, 0, 10), Pulse::Idle);
    }

    #[test]
    fn next_sample_clears_pulse() {
        let mut button = Button::new(0u8);
        window(&mut button, 2, 2, 10);
        assert!(button.on_press());
        button.sample(true, 10);
        assert!(!button.on_press());
        assert_eq!(button.pulse(), Pulse::Idle);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Timing
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn asserted_time_goes_to_held_and_open_time_to_open() {
        let mut button = Button::new(0u8);
        button.sample(true, 30);
        button.sample(false, 7);
        button.sample(true, 5);
        assert_eq!(button.held_ms(), 35);
        assert_eq!(button.open_ms(), 7);
    }

    #[test]
    fn release_moves_held_time_to_previous() {
        let mut button = Button::new(0u8);
        window(&mut button, 1, 0, 1000);
        window(&mut button, 1, 1, 450);
        window(&mut button, 1, 1, 50);
        window(&mut button, 1, 0, 20);
        assert_eq!(button.previous_held_ms(), 500);
        assert_eq!(button.held_ms(), 0);
        assert_eq!(button.open_ms(), 0);
        assert!(button.on_hold(500));
        assert!(!button.on_hold(501));
    }

    #[test]
    fn accumulators_saturate() {
        let mut button = Button::new(0u8);
        button.sample(true, u32::MAX);
        button.sample(true, 10);
        assert_eq!(button.held_ms(), u32::MAX);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Double Click
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn two_quick_clicks_make_a_double_click() {
        let mut button = Button::new(0u8);
        assert_eq!(click(&mut button, 50), Pulse::Released { double_click: false });
        window(&mut button, 1, 0, 100);
        assert_eq!(click(&mut button, 50), Pulse::Released { double_click: true });
        assert_eq!(button.click_streak, 0);
    }

    #[test]
    fn third_quick_click_starts_a_new_streak() {
        let mut button = Button::new(0u8);
        click(&mut button, 50);
        assert!(click(&mut button, 50).is_double_click());
        assert!(!click(&mut button, 50).is_double_click());
        assert!(click(&mut button, 50).is_double_click());
    }

    #[test]
    fn long_press_does_not_count_as_click() {
        let mut button = Button::new(0u8);
        click(&mut button, 50);
        assert!(!click(&mut button, DOUBLE_CLICK_WINDOW_MS).is_double_click());
        assert_eq!(button.click_streak, 1);
    }

    #[test]
    fn long_open_gap_drops_pending_click() {
        let mut button = Button::new(0u8);
        click(&mut button, 50);
        window(&mut button, 1, 0, DOUBLE_CLICK_WINDOW_MS);
        assert_eq!(button.click_streak, 0);
        assert!(!click(&mut button, 50).is_double_click());
        assert_eq!(button.click_streak, 1);
    }

    #[test]
    fn stale_gap_resets_before_release_counts() {
        let mut button = Button::new(0u8);
        click(&mut button, 50);
        // only a release clears open_ms, so the 300 ms gap is still stale here
        button.sample(false, 300);
        button.sample(true, 50);
        button.sample(true, 0);
        button.decimate(3);
        button.sample(false, 0);
        button.sample(false, 0);
        button.sample(false, 0);
        let pulse = button.decimate(3);
        assert_eq!(pulse, Pulse::Released { double_click: false });
        assert_eq!(button.click_streak, 1);
    }
}
