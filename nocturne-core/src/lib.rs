//! Interrupt-driven GPIO and low-power timing for small MCUs
//!
//! This crate turns coarse hardware interrupts into single logical
//! callbacks:
//!
//! - Channel registry mapping (port, line) slots to logical pin ids
//! - GPIO edge demultiplexer recovering pins from a group bitmask
//! - Low-power ticker arming a single deadline on the RTC comparator
//! - Ticker configuration and tick/microsecond conversion
//!
//! Every component is split into a foreground half, which owns the
//! hardware driver, and an interrupt half, which only holds shared
//! references and may be called from an ISR at any time.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod channel;
pub mod config;
pub mod gpio_irq;
pub mod handler;
pub mod ticker;
pub mod time;

pub use channel::{ChannelEntry, ChannelIndex, ChannelRegistry, Edge};
pub use config::{ConfigError, TickerConfig, MAX_GPIO_LINES, MAX_GPIO_PORTS};
pub use gpio_irq::{EdgeDemux, EdgeHandler, GpioIrq, GpioIrqError, GpioIrqPin};
pub use handler::Registration;
pub use ticker::{AlarmDispatch, AlarmHandler, ArmOutcome, LowPowerTicker};
pub use time::TickRate;
