//! The button engine: a fixed table of slots advanced together every poll.
//!
//! Each [`poll`](ButtonEngine::poll) runs three stages:
//!
//! 1. **Sampling**: read every bound line and feed the slot's counters.
//! 2. **Decimation**: once every `filter_depth` polls, vote each slot into a
//!    debounced state and classify the edge (see [`Button`]).
//! 3. **Projection**: pack the debounced states into a `u32`, bit *i* = slot *i*.
//!
//! Press, release and double-click are pulses: visible until the next poll.

use heapless::Vec;

use crate::button::{Button, Pulse, Slot, SlotId};
use crate::config::{Config, MAX_BUTTONS};
use crate::error::Error;
use crate::hal::{Clock, Gpio, PinMode};
use crate::log::{debug, info};

/// Slot table plus the decimation bookkeeping. Exists only after setup.
struct Table<C> {
    slots: Vec<Slot<C>, MAX_BUTTONS>,
    filter_depth: u8,
    /// Polls sampled since the last decimation.
    polls_in_window: u8,
    /// Clock reading at the end of the last poll.
    last_poll_ms: u32,
}

impl<C: Copy + PartialEq> Table<C> {
    fn new(config: Config, now_ms: u32) -> Self {
        let mut slots = Vec::new();
        // capacity() never exceeds MAX_BUTTONS, so this cannot fail
        let _ = slots.resize(config.capacity(), Slot::Empty);
        Self {
            slots,
            filter_depth: config.depth(),
            polls_in_window: 0,
            last_poll_ms: now_ms,
        }
    }

    fn button(&self, slot: SlotId) -> Result<&Button<C>, Error> {
        self.slots
            .get(slot)
            .ok_or(Error::InvalidSlot(slot))?
            .button()
            .ok_or(Error::SlotUnassigned(slot))
    }

    fn find(&self, channel: C) -> Option<SlotId> {
        self.slots.iter().position(|slot| {
            slot.button()
                .is_some_and(|button| button.channel() == channel)
        })
    }

    fn occupied(&self) -> impl Iterator<Item = (SlotId, &Button<C>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.button().map(|button| (id, button)))
    }

    fn bitmask(&self) -> u32 {
        self.occupied()
            .filter(|(_, button)| button.is_on())
            .fold(0, |mask, (id, _)| mask | (1u32 << id))
    }
}

/// Polled debouncer for up to [`MAX_BUTTONS`] active-low buttons.
///
/// Created un-set-up with [`new`](Self::new); every table operation fails
/// with [`Error::NotInitialized`] until [`setup`](Self::setup) runs.
/// [`with_config`](Self::with_config) does both at once.
pub struct ButtonEngine<G: Gpio, K: Clock> {
    gpio: G,
    clock: K,
    table: Option<Table<G::Channel>>,
}

impl<G: Gpio, K: Clock> ButtonEngine<G, K> {
    pub fn new(gpio: G, clock: K) -> Self {
        Self {
            gpio,
            clock,
            table: None,
        }
    }

    pub fn with_config(gpio: G, clock: K, config: Config) -> Self {
        let mut engine = Self::new(gpio, clock);
        engine.install(config);
        engine
    }

    /// Size the table and start the clock. Only allowed once.
    pub fn setup(&mut self, config: Config) -> Result<(), Error> {
        if self.table.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        self.install(config);
        Ok(())
    }

    fn install(&mut self, config: Config) {
        info!(
            "setup: {} slots, filter depth {}",
            config.capacity(),
            config.depth()
        );
        self.table = Some(Table::new(config, self.clock.now_ms()));
    }

    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    fn table(&self) -> Result<&Table<G::Channel>, Error> {
        self.table.as_ref().ok_or(Error::NotInitialized)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Slot lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Bind `channel` to the lowest free slot and pull its line up.
    pub fn add_button(&mut self, channel: G::Channel) -> Result<SlotId, Error> {
        let table = self.table.as_mut().ok_or(Error::NotInitialized)?;
        if let Some(existing) = table.find(channel) {
            return Err(Error::ChannelInUse(existing));
        }
        let slot = table
            .slots
            .iter()
            .position(Slot::is_empty)
            .ok_or(Error::CapacityExceeded)?;

        table.slots[slot] = Slot::Occupied(Button::new(channel));
        self.gpio.configure(channel, PinMode::PullUpInput);
        info!("button added in slot {}", slot);
        Ok(slot)
    }

    /// Free `slot` and return its line to a plain input.
    pub fn remove_button(&mut self, slot: SlotId) -> Result<(), Error> {
        let table = self.table.as_mut().ok_or(Error::NotInitialized)?;
        let entry = table.slots.get_mut(slot).ok_or(Error::InvalidSlot(slot))?;
        let channel = entry
            .button()
            .map(Button::channel)
            .ok_or(Error::SlotUnassigned(slot))?;

        self.gpio.configure(channel, PinMode::Input);
        *entry = Slot::Empty;
        info!("button removed from slot {}", slot);
        Ok(())
    }

    pub fn capacity(&self) -> Result<usize, Error> {
        Ok(self.table()?.slots.len())
    }

    pub fn remaining_capacity(&self) -> Result<usize, Error> {
        Ok(self.table()?.slots.iter().filter(|slot| slot.is_empty()).count())
    }

    pub fn filter_depth(&self) -> Result<u8, Error> {
        Ok(self.table()?.filter_depth)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Polling
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance every bound button by one sample taken `elapsed_ms` after
    /// the previous poll. Returns the debounced bitmask.
    pub fn poll(&mut self, elapsed_ms: u32) -> Result<u32, Error> {
        let table = self.table.as_mut().ok_or(Error::NotInitialized)?;

        for button in table.slots.iter_mut().filter_map(|slot| slot.button_mut()) {
            let asserted = !self.gpio.read(button.channel());
            button.sample(asserted, elapsed_ms);
        }

        table.polls_in_window += 1;
        if table.polls_in_window >= table.filter_depth {
            table.polls_in_window = 0;
            let depth = table.filter_depth;
            for (id, slot) in table.slots.iter_mut().enumerate() {
                if let Some(button) = slot.button_mut() {
                    let pulse = button.decimate(depth);
                    if pulse != Pulse::Idle {
                        debug!("slot {}: {}", id, pulse);
                    }
                }
            }
        }

        table.last_poll_ms = self.clock.now_ms();
        Ok(table.bitmask())
    }

    /// [`poll`](Self::poll) with the time since the previous poll taken from
    /// the clock. Tolerates counter wraparound.
    pub fn poll_elapsed(&mut self) -> Result<u32, Error> {
        let last_poll_ms = self.table()?.last_poll_ms;
        let elapsed_ms = self.clock.now_ms().wrapping_sub(last_poll_ms);
        self.poll(elapsed_ms)
    }

    /// Debounced bitmask as of the last poll.
    pub fn bitmask(&self) -> Result<u32, Error> {
        Ok(self.table()?.bitmask())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn button(&self, slot: SlotId) -> Result<&Button<G::Channel>, Error> {
        self.table()?.button(slot)
    }

    pub fn channel(&self, slot: SlotId) -> Result<G::Channel, Error> {
        self.button(slot).map(Button::channel)
    }

    /// Bound slots in index order.
    pub fn occupied(
        &self,
    ) -> Result<impl Iterator<Item = (SlotId, &Button<G::Channel>)>, Error> {
        Ok(self.table()?.occupied())
    }

    pub fn on_press(&self, slot: SlotId) -> Result<bool, Error> {
        self.button(slot).map(Button::on_press)
    }

    pub fn on_release(&self, slot: SlotId) -> Result<bool, Error> {
        self.button(slot).map(Button::on_release)
    }

    pub fn on_double_click(&self, slot: SlotId) -> Result<bool, Error> {
        self.button(slot).map(Button::on_double_click)
    }

    pub fn on_hold(&self, slot: SlotId, threshold_ms: u32) -> Result<bool, Error> {
        self.button(slot).map(|button| button.on_hold(threshold_ms))
    }

    pub fn is_on(&self, slot: SlotId) -> Result<bool, Error> {
        self.button(slot).map(Button::is_on)
    }

    pub fn is_hold(&self, slot: SlotId, threshold_ms: u32) -> Result<bool, Error> {
        self.button(slot).map(|button| button.is_hold(threshold_ms))
    }

    pub fn was_hold(&self, slot: SlotId, threshold_ms: u32) -> Result<bool, Error> {
        self.button(slot).map(|button| button.was_hold(threshold_ms))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Backends
    // ═══════════════════════════════════════════════════════════════════════

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Mutable access to the line backend, e.g. to drive an owned
    /// [`SimLines`](crate::sim::SimLines) in place.
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    /// The clock the engine times [`poll_elapsed`](Self::poll_elapsed) with.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Give the backends back.
    pub fn release(self) -> (G, K) {
        (self.gpio, self.clock)
    }
}
