//! GPIO group interrupt abstractions
//!
//! Each GPIO port has a bank of interrupt-enable bits for every group
//! interrupt line, plus one polarity register. A chip port maps these
//! onto its vendor driver calls.

/// Hardware group interrupt line
///
/// Every port can route any of its pins to either line. Nocturne keeps
/// rising-edge pins on [`IrqLine::A`] and falling-edge pins on
/// [`IrqLine::B`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqLine {
    /// Group interrupt A
    A,
    /// Group interrupt B
    B,
}

impl IrqLine {
    /// Both lines, in register order
    pub const ALL: [IrqLine; 2] = [IrqLine::A, IrqLine::B];

    /// The other group line
    pub const fn other(self) -> Self {
        match self {
            IrqLine::A => IrqLine::B,
            IrqLine::B => IrqLine::A,
        }
    }
}

/// GPIO group interrupt driver
///
/// Register-level access to a GPIO block with per-port interrupt
/// enable masks and polarity. Masks are 16 bits wide, one bit per line.
/// Implementations must not fail; a driver fault is fatal at this layer.
pub trait GpioGroupDriver {
    /// Enable or disable the input buffer for the pins in `pins`
    fn input_enable(&mut self, port: u8, pins: u16, enable: bool);

    /// Read the interrupt-enable mask of `port` for `line`
    fn group_interrupt_pins(&self, port: u8, line: IrqLine) -> u16;

    /// Write the interrupt-enable mask of `port` for `line`
    fn set_group_interrupt_pins(&mut self, port: u8, line: IrqLine, pins: u16);

    /// Read the polarity register of `port` (bit set = rising edge)
    fn interrupt_polarity(&self, port: u8) -> u16;

    /// Write the polarity register of `port`
    fn set_interrupt_polarity(&mut self, port: u8, polarity: u16);

    /// Bind the group line's interrupt to the Nocturne trampoline
    ///
    /// The trampoline forwards `(port, pending pins)` to
    /// `EdgeDemux::dispatch`. Binding twice is harmless.
    fn bind_callback(&mut self, line: IrqLine);
}
