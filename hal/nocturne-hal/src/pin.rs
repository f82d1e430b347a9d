//! Packed pin names
//!
//! A pin name packs the GPIO port into the upper bits and the line
//! within the port into the low byte, matching the board pin maps.

/// Bit offset of the port number inside a [`PinName`]
pub const GPIO_PORT_SHIFT: u32 = 8;

/// Mask for the line number inside a [`PinName`]
pub const GPIO_LINE_MASK: u32 = 0xFF;

/// Packed GPIO pin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinName(u32);

impl PinName {
    /// "Not connected" sentinel
    pub const NC: PinName = PinName(0xFFFF_FFFF);

    /// Create a pin name from a port and a line within that port
    pub const fn new(port: u8, line: u8) -> Self {
        Self(((port as u32) << GPIO_PORT_SHIFT) | line as u32)
    }

    /// Wrap a raw board pin value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw packed value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Port number
    pub const fn port(self) -> u32 {
        self.0 >> GPIO_PORT_SHIFT
    }

    /// Line number within the port
    pub const fn line(self) -> u32 {
        self.0 & GPIO_LINE_MASK
    }

    /// Check whether this names a real pin
    pub const fn is_connected(self) -> bool {
        self.0 != Self::NC.0
    }
}
