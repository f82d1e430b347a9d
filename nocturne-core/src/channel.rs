//! Interrupt channel registry
//!
//! Fixed table of one entry per (port, line) slot. Entries are written
//! only from foreground code and read from interrupt context; each
//! access runs inside a critical section and copies the entry out, so a
//! reader never sees a half-updated slot.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use nocturne_hal::PinName;

use crate::config::{MAX_GPIO_LINES, MAX_GPIO_PORTS};

/// Total number of channel slots
pub const MAX_CHANNELS: usize = MAX_GPIO_PORTS * MAX_GPIO_LINES;

/// Pin transition a channel is armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Not configured
    #[default]
    None,
    /// Low-to-high transition
    Rising,
    /// High-to-low transition
    Falling,
}

/// Typed (port, line) index into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelIndex {
    port: u8,
    line: u8,
}

impl ChannelIndex {
    /// Create an index, or None if it falls outside the table
    pub const fn new(port: u8, line: u8) -> Option<Self> {
        if (port as usize) < MAX_GPIO_PORTS && (line as usize) < MAX_GPIO_LINES {
            Some(Self { port, line })
        } else {
            None
        }
    }

    /// Index for a pin name, or None for `NC` or pins outside the table
    pub fn from_pin(pin: PinName) -> Option<Self> {
        if !pin.is_connected() {
            return None;
        }
        let port = u8::try_from(pin.port()).ok()?;
        let line = u8::try_from(pin.line()).ok()?;
        Self::new(port, line)
    }

    /// Port number
    pub const fn port(self) -> u8 {
        self.port
    }

    /// Line number within the port
    pub const fn line(self) -> u8 {
        self.line
    }

    /// Single-bit mask for this line in a port register
    pub const fn line_mask(self) -> u16 {
        1 << self.line
    }
}

/// One registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelEntry {
    /// Caller-chosen id delivered to the handler (0 = unused)
    pub logical_id: u32,
    /// Edge the pin is armed for
    pub edge: Edge,
    /// Whether the pin's interrupt is unmasked
    pub enabled: bool,
}

impl ChannelEntry {
    /// Entry for a slot nobody owns
    pub const UNUSED: ChannelEntry = ChannelEntry {
        logical_id: 0,
        edge: Edge::None,
        enabled: false,
    };

    /// Check whether the slot is unowned
    pub fn is_unused(&self) -> bool {
        self.logical_id == 0
    }
}

impl Default for ChannelEntry {
    fn default() -> Self {
        Self::UNUSED
    }
}

type ChannelTable = [[ChannelEntry; MAX_GPIO_LINES]; MAX_GPIO_PORTS];

/// Registry of interrupt channels
///
/// Shared by reference between the foreground pin API and the
/// interrupt-context demultiplexer.
pub struct ChannelRegistry {
    table: Mutex<CriticalSectionRawMutex, RefCell<ChannelTable>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    /// Create a registry with every slot unused
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(
                [[ChannelEntry::UNUSED; MAX_GPIO_LINES]; MAX_GPIO_PORTS],
            )),
        }
    }

    fn update<R>(&self, index: ChannelIndex, f: impl FnOnce(&mut ChannelEntry) -> R) -> R {
        self.table.lock(|table| {
            let mut table = table.borrow_mut();
            f(&mut table[index.port as usize][index.line as usize])
        })
    }

    /// Claim a slot for `id`
    ///
    /// The slot comes back with no edge and disabled. Returns None and
    /// leaves the slot untouched when `id` is 0.
    pub fn init(&self, index: ChannelIndex, id: u32) -> Option<ChannelEntry> {
        if id == 0 {
            return None;
        }
        Some(self.update(index, |entry| {
            *entry = ChannelEntry {
                logical_id: id,
                edge: Edge::None,
                enabled: false,
            };
            *entry
        }))
    }

    /// Record the edge a slot is armed for
    ///
    /// `Edge::None` is ignored so an existing configuration survives.
    pub fn set_event(&self, index: ChannelIndex, edge: Edge) {
        if edge == Edge::None {
            return;
        }
        self.update(index, |entry| entry.edge = edge);
    }

    /// Record whether the slot's interrupt is unmasked
    pub fn set_enabled(&self, index: ChannelIndex, enabled: bool) {
        self.update(index, |entry| entry.enabled = enabled);
    }

    /// Return a slot to the unused state
    pub fn clear(&self, index: ChannelIndex) {
        self.update(index, |entry| *entry = ChannelEntry::UNUSED);
    }

    /// Read a slot
    pub fn lookup(&self, index: ChannelIndex) -> ChannelEntry {
        self.table
            .lock(|table| table.borrow()[index.port as usize][index.line as usize])
    }

    /// Read a slot by raw coordinates, as delivered by the hardware
    pub fn lookup_raw(&self, port: usize, line: usize) -> Option<ChannelEntry> {
        self.table
            .lock(|table| table.borrow().get(port)?.get(line).copied())
    }

    /// Snapshot of every claimed slot, in port then line order
    pub fn active_channels(&self) -> Vec<(ChannelIndex, ChannelEntry), MAX_CHANNELS> {
        let mut active = Vec::new();
        self.table.lock(|table| {
            let table = table.borrow();
            for (port, lines) in table.iter().enumerate() {
                for (line, entry) in lines.iter().enumerate() {
                    if entry.is_unused() {
                        continue;
                    }
                    let index = ChannelIndex {
                        port: port as u8,
                        line: line as u8,
                    };
                    // Capacity equals the table size
                    let _ = active.push((index, *entry));
                }
            }
        });
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(port: u8, line: u8) -> ChannelIndex {
        ChannelIndex::new(port, line).unwrap()
    }

    #[test]
    fn test_new_registry_is_unused() {
        let registry = ChannelRegistry::new();
        assert_eq!(registry.lookup(idx(0, 0)), ChannelEntry::UNUSED);
        assert_eq!(registry.lookup(idx(2, 15)), ChannelEntry::UNUSED);
        assert!(registry.active_channels().is_empty());
    }

    #[test]
    fn test_index_bounds() {
        assert!(ChannelIndex::new(2, 15).is_some());
        assert!(ChannelIndex::new(3, 0).is_none());
        assert!(ChannelIndex::new(0, 16).is_none());
        assert_eq!(idx(1, 4).line_mask(), 0x0010);
    }

    #[test]
    fn test_index_from_pin() {
        assert_eq!(ChannelIndex::from_pin(PinName::new(1, 9)), Some(idx(1, 9)));
        assert_eq!(ChannelIndex::from_pin(PinName::NC), None);
        assert_eq!(ChannelIndex::from_pin(PinName::new(7, 0)), None);
        assert_eq!(ChannelIndex::from_pin(PinName::from_raw(0x1_0000)), None);
    }

    #[test]
    fn test_init_resets_slot() {
        let registry = ChannelRegistry::new();
        let entry = registry.init(idx(1, 3), 42).unwrap();
        assert_eq!(entry.logical_id, 42);
        assert_eq!(entry.edge, Edge::None);
        assert!(!entry.enabled);
        assert_eq!(registry.lookup(idx(1, 3)), entry);
    }

    #[test]
    fn test_init_rejects_zero_id() {
        let registry = ChannelRegistry::new();
        registry.init(idx(0, 1), 5).unwrap();
        assert!(registry.init(idx(0, 1), 0).is_none());
        assert_eq!(registry.lookup(idx(0, 1)).logical_id, 5);
    }

    #[test]
    fn test_set_event_none_is_ignored() {
        let registry = ChannelRegistry::new();
        registry.init(idx(0, 2), 1);
        registry.set_event(idx(0, 2), Edge::Falling);
        registry.set_event(idx(0, 2), Edge::None);
        assert_eq!(registry.lookup(idx(0, 2)).edge, Edge::Falling);
    }

    #[test]
    fn test_clear() {
        let registry = ChannelRegistry::new();
        registry.init(idx(2, 7), 9);
        registry.set_event(idx(2, 7), Edge::Rising);
        registry.set_enabled(idx(2, 7), true);
        registry.clear(idx(2, 7));
        assert_eq!(registry.lookup(idx(2, 7)), ChannelEntry::UNUSED);
    }

    #[test]
    fn test_lookup_raw_out_of_range() {
        let registry = ChannelRegistry::new();
        assert!(registry.lookup_raw(3, 0).is_none());
        assert!(registry.lookup_raw(0, 16).is_none());
        assert_eq!(registry.lookup_raw(0, 0), Some(ChannelEntry::UNUSED));
    }

    #[test]
    fn test_active_channels_order() {
        let registry = ChannelRegistry::new();
        registry.init(idx(2, 1), 30);
        registry.init(idx(0, 5), 10);
        registry.init(idx(1, 0), 20);

        let active = registry.active_channels();
        let ids: Vec<u32, MAX_CHANNELS> = active.iter().map(|(_, e)| e.logical_id).collect();
        assert_eq!(&ids[..], &[10, 20, 30]);
        assert_eq!(active[0].0, idx(0, 5));
    }
}
