//! Tick and microsecond conversion
//!
//! The counter advances at `clock >> prescaler` Hz. Conversions use
//! 64-bit integer intermediates and truncate toward zero in both
//! directions, so a microsecond value converted to ticks and back comes
//! out at most one tick period low.

/// Microseconds per second
pub const US_PER_SECOND: u64 = 1_000_000;

/// Counter tick rate derived once from the clock and prescaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickRate {
    hz: u32,
}

impl TickRate {
    /// Derive the tick rate from a source clock and prescaler shift
    ///
    /// The rate never drops below 1 Hz.
    pub const fn from_clock(clock_hz: u32, prescaler: u8) -> Self {
        let hz = if prescaler >= 32 { 0 } else { clock_hz >> prescaler };
        Self {
            hz: if hz == 0 { 1 } else { hz },
        }
    }

    /// Tick rate in Hz
    pub const fn hz(self) -> u32 {
        self.hz
    }

    /// Length of one tick in microseconds, rounded up
    pub const fn tick_period_us(self) -> u32 {
        let hz = self.hz as u64;
        ((US_PER_SECOND + hz - 1) / hz) as u32
    }

    /// Convert microseconds to ticks, truncating
    ///
    /// Saturates at `u32::MAX` for tick rates above 1 MHz.
    pub const fn us_to_ticks(self, us: u32) -> u32 {
        let ticks = us as u64 * self.hz as u64 / US_PER_SECOND;
        if ticks > u32::MAX as u64 {
            u32::MAX
        } else {
            ticks as u32
        }
    }

    /// Convert ticks to microseconds, truncating
    ///
    /// The result wraps like a 32-bit microsecond timestamp.
    pub const fn ticks_to_us(self, ticks: u32) -> u32 {
        (ticks as u64 * US_PER_SECOND / self.hz as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_32k_conversion() {
        let rate = TickRate::from_clock(32_768, 0);
        assert_eq!(rate.us_to_ticks(1_000_000), 32_768);
        assert_eq!(rate.ticks_to_us(32_768), 1_000_000);
        // 30.52us per tick
        assert_eq!(rate.us_to_ticks(30), 0);
        assert_eq!(rate.us_to_ticks(31), 1);
        assert_eq!(rate.ticks_to_us(1), 30);
        assert_eq!(rate.tick_period_us(), 31);
    }

    #[test]
    fn test_prescaler() {
        let rate = TickRate::from_clock(32_768, 5);
        assert_eq!(rate.hz(), 1024);
        assert_eq!(rate.us_to_ticks(1_000_000), 1024);
    }

    #[test]
    fn test_rate_floor() {
        assert_eq!(TickRate::from_clock(4, 8).hz(), 1);
        assert_eq!(TickRate::from_clock(32_768, 40).hz(), 1);
    }

    #[test]
    fn test_truncation_round_trip() {
        let rate = TickRate::from_clock(32_768, 0);
        // 61us is 1.99 ticks: truncates to one tick, which is 30us
        let back = rate.ticks_to_us(rate.us_to_ticks(61));
        assert_eq!(back, 30);
        assert!(61 - back <= rate.tick_period_us());
    }

    #[test]
    fn test_fast_clock_saturates() {
        let rate = TickRate::from_clock(16_000_000, 0);
        assert_eq!(rate.us_to_ticks(u32::MAX), u32::MAX);
        assert_eq!(rate.us_to_ticks(1), 16);
    }
}
