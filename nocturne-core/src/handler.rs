//! Process-wide handler slots
//!
//! Each service has exactly one handler. Registering replaces whatever
//! was there before, and hands back a [`Registration`] that can later
//! remove the handler again, but only while it is still the current one.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Proof of a handler registration
///
/// Returned by `register`; pass it back to `unregister` to remove the
/// handler. A registration that has since been replaced is stale and
/// unregistering it does nothing.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "dropping a Registration makes the handler impossible to unregister"]
pub struct Registration {
    generation: u32,
}

impl Registration {
    /// Sequence number of this registration
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

struct SlotState<'a, H: ?Sized> {
    handler: Option<&'a H>,
    generation: u32,
}

impl<H: ?Sized> Clone for SlotState<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: ?Sized> Copy for SlotState<'_, H> {}

/// Single handler slot shared between foreground and interrupt context
pub(crate) struct HandlerSlot<'a, H: ?Sized> {
    state: Mutex<CriticalSectionRawMutex, Cell<SlotState<'a, H>>>,
}

impl<'a, H: ?Sized> HandlerSlot<'a, H> {
    pub(crate) const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(SlotState {
                handler: None,
                generation: 0,
            })),
        }
    }

    /// Install `handler`, replacing any previous one
    pub(crate) fn register(&self, handler: &'a H) -> Registration {
        self.state.lock(|cell| {
            let generation = cell.get().generation.wrapping_add(1);
            cell.set(SlotState {
                handler: Some(handler),
                generation,
            });
            Registration { generation }
        })
    }

    /// Remove the handler if `registration` is still current
    pub(crate) fn unregister(&self, registration: Registration) -> bool {
        self.state.lock(|cell| {
            let state = cell.get();
            if state.handler.is_some() && state.generation == registration.generation {
                cell.set(SlotState {
                    handler: None,
                    generation: state.generation,
                });
                true
            } else {
                false
            }
        })
    }

    /// Current handler, copied out of the critical section
    pub(crate) fn get(&self) -> Option<&'a H> {
        self.state.lock(|cell| cell.get().handler)
    }
}
