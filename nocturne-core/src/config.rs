//! Configuration types
//!
//! Board-agnostic layout constants and the low-power ticker settings.
//! With the `serde` feature the ticker settings can be stored as
//! postcard binary data alongside the rest of the board configuration.

use nocturne_hal::{RtcTrim, TrimDirection};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of GPIO ports with interrupt-capable pins
pub const MAX_GPIO_PORTS: usize = 3;

/// Number of lines per GPIO port
pub const MAX_GPIO_LINES: usize = 16;

/// Nominal low-frequency crystal frequency in Hz
pub const LFCLK_FREQUENCY_HZ: u32 = 32_768;

/// Ticks needed to program and enable the alarm comparator
///
/// Deadlines closer than this are busy-waited instead of armed.
pub const DEFAULT_ALARM_SETUP_TICKS: u32 = 50;

/// Largest prescaler shift accepted by the RTC
pub const MAX_PRESCALER: u8 = 15;

/// Default drift trim: one tick removed every 2^14 seconds
pub const DEFAULT_TRIM: RtcTrim = RtcTrim {
    interval_pow2: 14,
    value: 1,
    direction: TrimDirection::Subtract,
};

/// Errors from storing or loading a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Buffer too small for the encoded data
    BufferTooSmall,
    /// Data corrupted or not a ticker configuration
    Corrupted,
}

/// Low-power ticker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickerConfig {
    /// Counter source clock in Hz
    pub lf_clock_hz: u32,
    /// Prescaler as a power of two (tick rate = clock >> prescaler)
    pub prescaler: u8,
    /// Safety margin in ticks before a deadline is considered too close to arm
    pub alarm_setup_ticks: u32,
    /// Drift trim, or None to leave trimming off
    pub trim: Option<RtcTrim>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerConfig {
    /// Create the default configuration for a 32.768 kHz crystal
    pub const fn new() -> Self {
        Self {
            lf_clock_hz: LFCLK_FREQUENCY_HZ,
            prescaler: 0,
            alarm_setup_ticks: DEFAULT_ALARM_SETUP_TICKS,
            trim: Some(DEFAULT_TRIM),
        }
    }

    /// Use a different counter source clock
    pub const fn with_clock_hz(mut self, hz: u32) -> Self {
        self.lf_clock_hz = hz;
        self
    }

    /// Use a prescaler, clamped to [`MAX_PRESCALER`]
    pub const fn with_prescaler(mut self, prescaler: u8) -> Self {
        self.prescaler = if prescaler > MAX_PRESCALER {
            MAX_PRESCALER
        } else {
            prescaler
        };
        self
    }

    /// Use a different alarm safety margin
    pub const fn with_alarm_setup_ticks(mut self, ticks: u32) -> Self {
        self.alarm_setup_ticks = ticks;
        self
    }

    /// Use a specific drift trim
    pub const fn with_trim(mut self, trim: RtcTrim) -> Self {
        self.trim = Some(trim);
        self
    }

    /// Disable drift trimming
    pub const fn without_trim(mut self) -> Self {
        self.trim = None;
        self
    }

    /// Effective counter tick rate
    pub const fn tick_rate(&self) -> crate::time::TickRate {
        crate::time::TickRate::from_clock(self.lf_clock_hz, self.prescaler)
    }

    /// Encode into `buf` as postcard bytes, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_postcard<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::BufferTooSmall)
    }

    /// Decode from postcard bytes
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        Ok(config.with_prescaler(config.prescaler))
    }
}
