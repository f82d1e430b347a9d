//! GPIO edge interrupts
//!
//! Split into two halves that share one [`ChannelRegistry`]:
//!
//! - [`GpioIrq`] runs in foreground context, owns the GPIO driver and
//!   configures pins.
//! - [`EdgeDemux`] runs in interrupt context. The group trampoline hands
//!   it a port number and the bitmask of pins that fired; it calls the
//!   registered [`EdgeHandler`] once per set bit.
//!
//! Rising-edge pins are routed to [`IrqLine::A`] and falling-edge pins to
//! [`IrqLine::B`], so a line's bitmask only ever holds pins of one edge
//! type and the demultiplexer never has to re-check polarity.

use core::fmt;

use nocturne_hal::{GpioGroupDriver, IrqLine, PinName};

use crate::channel::{ChannelEntry, ChannelIndex, ChannelRegistry, Edge};
use crate::handler::{HandlerSlot, Registration};

/// Receiver for pin edge events
///
/// Called from interrupt context with the pin's logical id and the edge
/// it was configured for.
pub trait EdgeHandler: Sync {
    /// Handle one edge on the pin registered as `id`
    fn on_edge(&self, id: u32, edge: Edge);
}

impl<F> EdgeHandler for F
where
    F: Fn(u32, Edge) + Sync,
{
    fn on_edge(&self, id: u32, edge: Edge) {
        self(id, edge)
    }
}

/// Errors from pin initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioIrqError {
    /// Pin is the "not connected" sentinel
    InvalidPin,
    /// Logical id 0 is reserved
    InvalidId,
    /// Pin lies outside the port/line table
    PinOutOfRange,
    /// Slot is still owned by a pin that was not freed
    PinInUse,
}

impl fmt::Display for GpioIrqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioIrqError::InvalidPin => f.write_str("pin is not connected"),
            GpioIrqError::InvalidId => f.write_str("logical id 0 is reserved"),
            GpioIrqError::PinOutOfRange => f.write_str("pin outside the interrupt table"),
            GpioIrqError::PinInUse => f.write_str("pin already initialized"),
        }
    }
}

/// Interrupt-context demultiplexer
pub struct EdgeDemux<'a> {
    channels: &'a ChannelRegistry,
    handler: HandlerSlot<'a, dyn EdgeHandler + 'a>,
}

impl<'a> EdgeDemux<'a> {
    /// Create a demultiplexer reading from `channels`
    pub const fn new(channels: &'a ChannelRegistry) -> Self {
        Self {
            channels,
            handler: HandlerSlot::new(),
        }
    }

    /// Registry this demultiplexer reads
    pub fn channels(&self) -> &'a ChannelRegistry {
        self.channels
    }

    /// Install the handler for all pins, replacing any previous one
    pub fn register(&self, handler: &'a (dyn EdgeHandler + 'a)) -> Registration {
        self.handler.register(handler)
    }

    /// Remove the handler if `registration` is still current
    pub fn unregister(&self, registration: Registration) -> bool {
        self.handler.unregister(registration)
    }

    /// Check whether a handler is installed
    pub fn has_handler(&self) -> bool {
        self.handler.get().is_some()
    }

    /// Hardware callback entry point
    ///
    /// `group` is the port whose group interrupt fired and `pins` the
    /// asserted lines. Calls the handler once per set bit, lowest line
    /// first, and not at all when no handler is installed.
    pub fn dispatch(&self, group: u32, pins: u16) {
        let Some(handler) = self.handler.get() else {
            return;
        };
        let port = group as usize;

        let mut pending = pins;
        let mut line = 0usize;
        while pending != 0 {
            if pending & 0x01 != 0 {
                match self.channels.lookup_raw(port, line) {
                    Some(entry) => handler.on_edge(entry.logical_id, entry.edge),
                    None => {
                        warn!("edge on unknown group {} line {}", group, line);
                        return;
                    }
                }
            }
            line += 1;
            pending >>= 1;
        }
    }
}

/// Handle to an initialized interrupt pin
///
/// Not `Clone`: each (port, line) slot has exactly one owner.
/// [`GpioIrq::init`] refuses a slot that is still owned, and
/// [`GpioIrq::free`] consumes the handle to give it back.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioIrqPin {
    pin: PinName,
    index: ChannelIndex,
    id: u32,
}

impl GpioIrqPin {
    /// Pin name this handle was created for
    pub fn pin(&self) -> PinName {
        self.pin
    }

    /// Registry slot of the pin
    pub fn index(&self) -> ChannelIndex {
        self.index
    }

    /// Logical id delivered to the handler
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Line carrying interrupts for `edge`
fn line_for(edge: Edge) -> Option<IrqLine> {
    match edge {
        Edge::Rising => Some(IrqLine::A),
        Edge::Falling => Some(IrqLine::B),
        Edge::None => None,
    }
}

/// Foreground pin configuration
pub struct GpioIrq<'a, D> {
    driver: D,
    demux: &'a EdgeDemux<'a>,
}

impl<'a, D: GpioGroupDriver> GpioIrq<'a, D> {
    /// Create the pin API over `driver`, feeding `demux`
    pub fn new(driver: D, demux: &'a EdgeDemux<'a>) -> Self {
        Self { driver, demux }
    }

    /// Access the underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Give the driver back
    ///
    /// Every claimed pin is masked first, so no group interrupt can reach
    /// the demultiplexer once nothing maintains the masks. The pins stay
    /// claimed.
    pub fn release(mut self) -> D {
        self.disable_all();
        self.driver
    }

    /// Mask every claimed pin on both group lines
    ///
    /// Edges and ids are kept; [`enable`](Self::enable) turns a pin back on.
    pub fn disable_all(&mut self) {
        for (index, entry) in self.demux.channels().active_channels() {
            self.mask_all_lines(index);
            if entry.enabled {
                self.demux.channels().set_enabled(index, false);
            }
        }
        debug!("gpio irq all pins masked");
    }

    /// Current registry entry for `pin`
    pub fn entry(&self, pin: &GpioIrqPin) -> ChannelEntry {
        self.demux.channels().lookup(pin.index)
    }

    fn mask_line(&mut self, index: ChannelIndex, line: IrqLine) {
        let port = index.port();
        let pins = self.driver.group_interrupt_pins(port, line);
        self.driver
            .set_group_interrupt_pins(port, line, pins & !index.line_mask());
    }

    fn unmask_line(&mut self, index: ChannelIndex, line: IrqLine) {
        let port = index.port();
        let pins = self.driver.group_interrupt_pins(port, line);
        self.driver
            .set_group_interrupt_pins(port, line, pins | index.line_mask());
    }

    fn mask_all_lines(&mut self, index: ChannelIndex) {
        for line in IrqLine::ALL {
            self.mask_line(index, line);
        }
    }

    /// Claim `pin` for edge interrupts under logical id `id`
    ///
    /// The pin is masked on both group lines, switched to input and
    /// left with no edge configured. When `handler` is given it becomes
    /// the handler for every pin; otherwise the current one is kept.
    ///
    /// Fails without touching the hardware if the slot is still owned.
    pub fn init(
        &mut self,
        pin: PinName,
        handler: Option<&'a (dyn EdgeHandler + 'a)>,
        id: u32,
    ) -> Result<GpioIrqPin, GpioIrqError> {
        if !pin.is_connected() {
            warn!("gpio irq init on NC pin");
            return Err(GpioIrqError::InvalidPin);
        }
        if id == 0 {
            warn!("gpio irq init with reserved id 0");
            return Err(GpioIrqError::InvalidId);
        }
        let Some(index) = ChannelIndex::from_pin(pin) else {
            warn!("gpio irq pin {=u32:#x} outside table", pin.raw());
            return Err(GpioIrqError::PinOutOfRange);
        };
        if !self.demux.channels().lookup(index).is_unused() {
            warn!(
                "gpio irq port {} line {} already in use",
                index.port(),
                index.line()
            );
            return Err(GpioIrqError::PinInUse);
        }

        if let Some(handler) = handler {
            // Last registration wins; the token is not needed to keep it installed
            let _registration = self.demux.register(handler);
        }

        self.mask_all_lines(index);
        self.driver
            .input_enable(index.port(), index.line_mask(), true);
        self.demux.channels().init(index, id);

        debug!(
            "gpio irq init port {} line {} id {}",
            index.port(),
            index.line(),
            id
        );
        Ok(GpioIrqPin { pin, index, id })
    }

    /// Release `pin`, masking it first
    pub fn free(&mut self, pin: GpioIrqPin) {
        self.disable(&pin);
        self.demux.channels().clear(pin.index);
        debug!(
            "gpio irq free port {} line {}",
            pin.index.port(),
            pin.index.line()
        );
    }

    /// Configure the edge for `pin`, then enable or disable it
    ///
    /// `Edge::None` is ignored and leaves the pin as it was.
    pub fn set_event(&mut self, pin: &GpioIrqPin, edge: Edge, enable: bool) {
        if edge == Edge::None {
            return;
        }

        let port = pin.index.port();
        let polarity = self.driver.interrupt_polarity(port);
        let polarity = match edge {
            Edge::Rising => polarity | pin.index.line_mask(),
            _ => polarity & !pin.index.line_mask(),
        };
        self.driver.set_interrupt_polarity(port, polarity);

        self.demux.channels().set_event(pin.index, edge);

        if enable {
            self.enable(pin);
        } else {
            self.disable(pin);
        }
    }

    /// Unmask `pin` on the group line for its edge
    ///
    /// Does nothing while no edge is configured.
    pub fn enable(&mut self, pin: &GpioIrqPin) {
        let entry = self.entry(pin);
        let Some(line) = line_for(entry.edge) else {
            return;
        };

        // An earlier edge may still be unmasked on the other line
        self.mask_line(pin.index, line.other());
        self.driver.bind_callback(line);
        self.unmask_line(pin.index, line);
        self.demux.channels().set_enabled(pin.index, true);
    }

    /// Mask `pin` on both group lines
    ///
    /// Does nothing while no edge is configured.
    pub fn disable(&mut self, pin: &GpioIrqPin) {
        let entry = self.entry(pin);
        if entry.edge == Edge::None {
            return;
        }

        self.mask_all_lines(pin.index);
        self.demux.channels().set_enabled(pin.index, false);
    }
}
