//! Hardware seams.
//!
//! The engine never touches a pin or a timer directly: it reads raw line
//! levels through [`Gpio`] and the millisecond counter through [`Clock`].
//!
//! ## Backends
//!
//! - **`PinBank`** (feature `hal`): array of `embedded_hal` input pins
//! - **`SystemClock`** (feature `embassy`): `embassy_time::Instant`
//! - **`sim`**: in-memory lines and a hand-advanced clock for host tests

#[cfg(feature = "hal")]
use crate::log::warning;

/// How a line is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input with the internal pull-up on; used while a button is bound.
    PullUpInput,
    /// Plain floating input; restored when a button is removed.
    Input,
}

/// Digital input lines addressed by channel.
pub trait Gpio {
    /// Opaque identifier of one physical line.
    type Channel: Copy + PartialEq;

    fn configure(&mut self, channel: Self::Channel, mode: PinMode);

    /// Raw line level, `true` = high.
    ///
    /// Buttons are wired active-low, so a low line means pressed.
    fn read(&mut self, channel: Self::Channel) -> bool;
}

/// Monotonic millisecond counter. Wraps at `u32::MAX`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// embedded-hal
// ═══════════════════════════════════════════════════════════════════════════

/// [`Gpio`] over a fixed array of `embedded_hal` input pins.
///
/// The channel is the index into the array. Pull resistors are chosen when
/// the HAL pin is constructed, so `configure` only records the requested
/// mode. A failed read counts as high (released).
#[cfg(feature = "hal")]
pub struct PinBank<P, const N: usize> {
    pins: [P; N],
    modes: [Option<PinMode>; N],
}

#[cfg(feature = "hal")]
impl<P: embedded_hal::digital::InputPin, const N: usize> PinBank<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            modes: [None; N],
        }
    }

    /// Mode last requested for `channel`, `None` if never configured.
    pub fn mode(&self, channel: usize) -> Option<PinMode> {
        self.modes.get(channel).copied().flatten()
    }

    pub fn into_inner(self) -> [P; N] {
        self.pins
    }
}

#[cfg(feature = "hal")]
impl<P: embedded_hal::digital::InputPin, const N: usize> Gpio for PinBank<P, N> {
    type Channel = usize;

    fn configure(&mut self, channel: usize, mode: PinMode) {
        if let Some(slot) = self.modes.get_mut(channel) {
            *slot = Some(mode);
        }
    }

    fn read(&mut self, channel: usize) -> bool {
        let Some(pin) = self.pins.get_mut(channel) else {
            return true;
        };
        match pin.is_high() {
            Ok(high) => high,
            Err(_) => {
                warning!("PinBank: read of channel {} failed", channel);
                true
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// embassy-time
// ═══════════════════════════════════════════════════════════════════════════

/// [`Clock`] backed by the embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "embassy")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        // truncation gives the wrapping counter the engine expects
        embassy_time::Instant::now().as_millis() as u32
    }
}
