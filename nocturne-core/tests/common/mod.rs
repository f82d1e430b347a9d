//! Simulated hardware shared by the integration tests

#![allow(dead_code)]

use std::cell::Cell;
use std::sync::atomic::{AtomicU16, Ordering};

use nocturne_core::MAX_GPIO_PORTS;
use nocturne_hal::{GpioGroupDriver, IrqLine, RtcDriver, RtcEvents, RtcTrim};

/// GPIO block with plain register arrays
#[derive(Debug, Default)]
pub struct MockGpio {
    pub inputs: [u16; MAX_GPIO_PORTS],
    pub group_a: [u16; MAX_GPIO_PORTS],
    pub group_b: [u16; MAX_GPIO_PORTS],
    pub polarity: [u16; MAX_GPIO_PORTS],
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins unmasked on `line` for `port`
    pub fn unmasked(&self, port: usize, line: IrqLine) -> u16 {
        match line {
            IrqLine::A => self.group_a[port],
            IrqLine::B => self.group_b[port],
        }
    }
}

impl GpioGroupDriver for MockGpio {
    fn input_enable(&mut self, port: u8, pins: u16, enable: bool) {
        if enable {
            self.inputs[port as usize] |= pins;
        } else {
            self.inputs[port as usize] &= !pins;
        }
    }

    fn group_interrupt_pins(&self, port: u8, line: IrqLine) -> u16 {
        self.unmasked(port as usize, line)
    }

    fn set_group_interrupt_pins(&mut self, port: u8, line: IrqLine, pins: u16) {
        match line {
            IrqLine::A => self.group_a[port as usize] = pins,
            IrqLine::B => self.group_b[port as usize] = pins,
        }
    }

    fn interrupt_polarity(&self, port: u8) -> u16 {
        self.polarity[port as usize]
    }

    fn set_interrupt_polarity(&mut self, port: u8, polarity: u16) {
        self.polarity[port as usize] = polarity;
    }

    fn bind_callback(&mut self, _line: IrqLine) {}
}

/// GPIO block whose registers another thread can read
///
/// The driver is `&SharedGpio`, so the foreground owns a reference while a
/// thread standing in for the interrupt reads the group masks.
#[derive(Debug, Default)]
pub struct SharedGpio {
    inputs: [AtomicU16; MAX_GPIO_PORTS],
    group_a: [AtomicU16; MAX_GPIO_PORTS],
    group_b: [AtomicU16; MAX_GPIO_PORTS],
    polarity: [AtomicU16; MAX_GPIO_PORTS],
}

impl SharedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn group(&self, line: IrqLine) -> &[AtomicU16; MAX_GPIO_PORTS] {
        match line {
            IrqLine::A => &self.group_a,
            IrqLine::B => &self.group_b,
        }
    }

    /// Pins unmasked on `line` for `port`
    pub fn unmasked(&self, port: usize, line: IrqLine) -> u16 {
        self.group(line)[port].load(Ordering::SeqCst)
    }
}

impl GpioGroupDriver for &SharedGpio {
    fn input_enable(&mut self, port: u8, pins: u16, enable: bool) {
        let inputs = &self.inputs[port as usize];
        if enable {
            inputs.fetch_or(pins, Ordering::SeqCst);
        } else {
            inputs.fetch_and(!pins, Ordering::SeqCst);
        }
    }

    fn group_interrupt_pins(&self, port: u8, line: IrqLine) -> u16 {
        self.unmasked(port as usize, line)
    }

    fn set_group_interrupt_pins(&mut self, port: u8, line: IrqLine, pins: u16) {
        self.group(line)[port as usize].store(pins, Ordering::SeqCst);
    }

    fn interrupt_polarity(&self, port: u8) -> u16 {
        self.polarity[port as usize].load(Ordering::SeqCst)
    }

    fn set_interrupt_polarity(&mut self, port: u8, polarity: u16) {
        self.polarity[port as usize].store(polarity, Ordering::SeqCst);
    }

    fn bind_callback(&mut self, _line: IrqLine) {}
}

/// RTC whose count advances by `step` on every read
#[derive(Debug)]
pub struct SimRtc {
    pub count: Cell<u32>,
    pub step: u32,
    pub enabled: bool,
    pub alarm_irq: bool,
    pub alarm: u32,
    pub alarm_enabled: bool,
}

impl SimRtc {
    pub fn new(step: u32) -> Self {
        Self {
            count: Cell::new(0),
            step,
            enabled: false,
            alarm_irq: false,
            alarm: 0,
            alarm_enabled: false,
        }
    }

    /// Move the counter forward, reporting a comparator match
    pub fn advance(&mut self, ticks: u32) -> RtcEvents {
        let before = self.count.get();
        let after = before.saturating_add(ticks);
        self.count.set(after);
        if self.alarm_enabled && self.alarm_irq && before < self.alarm && self.alarm <= after {
            RtcEvents::ALARM
        } else {
            RtcEvents::empty()
        }
    }
}

impl RtcDriver for SimRtc {
    fn set_prescaler(&mut self, _shift: u8) {}

    fn bind_callback(&mut self) {}

    fn count(&self) -> u32 {
        let now = self.count.get();
        self.count.set(now.saturating_add(self.step));
        now
    }

    fn set_count(&mut self, count: u32) {
        self.count.set(count);
    }

    fn set_trim(&mut self, _trim: RtcTrim) {}

    fn enable_trim(&mut self, _enable: bool) {}

    fn enable(&mut self, enable: bool) {
        self.enabled = enable;
    }

    fn enable_alarm_interrupt(&mut self, enable: bool) {
        self.alarm_irq = enable;
    }

    fn set_alarm(&mut self, ticks: u32) {
        self.alarm = ticks;
    }

    fn enable_alarm(&mut self, enable: bool) {
        self.alarm_enabled = enable;
    }
}
