//! Nocturne Hardware Abstraction Layer
//!
//! This crate defines the seam between the Nocturne interrupt logic and
//! the vendor peripheral driver. A chip port implements these traits on
//! top of its register-level driver; the logic in `nocturne-core` only
//! ever talks to the traits, so it can be exercised on the host against
//! simulated hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (pin handlers, alarm client)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nocturne-core (demux, ticker)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nocturne-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vendor GPIO / RTC driver               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioGroupDriver`] - Per-port group interrupt masks and polarity
//! - [`rtc::RtcDriver`] - Free-running counter with an alarm comparator

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pin;
pub mod rtc;

// Re-export key types at crate root for convenience
pub use gpio::{GpioGroupDriver, IrqLine};
pub use pin::PinName;
pub use rtc::{RtcDriver, RtcEvents, RtcTrim, TrimDirection};
