//! Unified error type for buttonpoll.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for on-target logging.

use core::fmt;

use crate::button::SlotId;

/// Error returned by every fallible engine operation.
///
/// None of these are fatal: the engine keeps working for all other slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Table
    /// `add_button` found no free slot.
    CapacityExceeded,

    /// Slot index is outside `0..capacity`.
    InvalidSlot(SlotId),

    /// Slot index is in range but no button is bound to it.
    SlotUnassigned(SlotId),

    /// The channel is already bound to the given live slot.
    ChannelInUse(SlotId),

    // Lifecycle
    /// A table operation ran before `setup`.
    NotInitialized,

    /// `setup` was called a second time.
    AlreadyInitialized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded => f.write_str("no free button slot"),
            Error::InvalidSlot(slot) => write!(f, "slot {} is out of range", slot),
            Error::SlotUnassigned(slot) => write!(f, "slot {} has no button", slot),
            Error::ChannelInUse(slot) => write!(f, "channel already bound to slot {}", slot),
            Error::NotInitialized => f.write_str("engine used before setup"),
            Error::AlreadyInitialized => f.write_str("engine set up twice"),
        }
    }
}
