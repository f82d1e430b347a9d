//! Real-time counter abstractions
//!
//! A free-running counter clocked from the low-frequency oscillator,
//! with one alarm comparator that raises an interrupt when the count
//! reaches the programmed value.

use core::ops::BitOr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Event bits reported by the RTC interrupt
///
/// A single interrupt can carry several events at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcEvents(u32);

impl RtcEvents {
    /// Alarm comparator matched the counter
    pub const ALARM: Self = Self(1 << 2);
    /// Modulo-60 alarm
    pub const MOD60_ALARM: Self = Self(1 << 3);
    /// Posted write completed
    pub const WRITE_SYNC: Self = Self(1 << 6);
    /// Counter interrupt
    pub const COUNT: Self = Self(1 << 8);
    /// Counter rolled over from `u32::MAX` to zero
    pub const COUNT_ROLLOVER: Self = Self(1 << 10);

    /// No events
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap a raw status word
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw status word
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether no bits are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for RtcEvents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Trim direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrimDirection {
    /// Add trim ticks every interval
    Add,
    /// Subtract trim ticks every interval
    Subtract,
}

/// Counter trim applied to correct oscillator drift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RtcTrim {
    /// Trim interval as a power of two (14 = every 2^14 seconds)
    pub interval_pow2: u8,
    /// Ticks added or removed per interval (0-7)
    pub value: u8,
    /// Whether trim ticks are added or removed
    pub direction: TrimDirection,
}

/// RTC counter and alarm driver
///
/// Implementations must not fail; a driver fault is fatal at this layer.
pub trait RtcDriver {
    /// Set the counter prescaler as a power of two
    fn set_prescaler(&mut self, shift: u8);

    /// Bind the RTC interrupt to the Nocturne trampoline
    ///
    /// The trampoline forwards the pending status word to
    /// `AlarmDispatch::on_rtc_event`.
    fn bind_callback(&mut self);

    /// Read the current counter value in ticks
    fn count(&self) -> u32;

    /// Overwrite the counter value
    fn set_count(&mut self, count: u32);

    /// Program the trim settings
    fn set_trim(&mut self, trim: RtcTrim);

    /// Enable or disable trimming
    fn enable_trim(&mut self, enable: bool);

    /// Start or stop the counter
    fn enable(&mut self, enable: bool);

    /// Unmask or mask the alarm interrupt
    fn enable_alarm_interrupt(&mut self, enable: bool);

    /// Program the alarm comparator
    fn set_alarm(&mut self, ticks: u32);

    /// Enable or disable the alarm comparator
    fn enable_alarm(&mut self, enable: bool);
}
