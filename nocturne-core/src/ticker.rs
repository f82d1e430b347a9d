//! Low-power ticker
//!
//! Single-shot deadline timer on the RTC counter and its alarm
//! comparator. Only one deadline is ever outstanding; arming a new one
//! replaces the old.
//!
//! Arming has three outcomes, picked from one fresh counter read:
//!
//! - deadline already reached: the handler runs before `set_interrupt`
//!   returns and the alarm registers are left alone
//! - deadline within `alarm_setup_ticks` of now: the comparator may miss
//!   a match this close, so the counter is polled until the deadline and
//!   the handler runs before `set_interrupt` returns
//! - otherwise the comparator is programmed and the handler runs later
//!   from [`AlarmDispatch::on_rtc_event`]

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nocturne_hal::{RtcDriver, RtcEvents};

use crate::config::TickerConfig;
use crate::handler::{HandlerSlot, Registration};
use crate::time::TickRate;

/// Receiver for alarm expiry
pub trait AlarmHandler: Sync {
    /// The armed deadline has been reached
    fn on_alarm(&self);
}

impl<F> AlarmHandler for F
where
    F: Fn() + Sync,
{
    fn on_alarm(&self) {
        self()
    }
}

/// How a deadline was handled when armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmOutcome {
    /// Deadline had already passed; handler ran immediately
    Elapsed,
    /// Deadline was too close to arm; handler ran after polling
    Polled,
    /// Comparator armed; handler runs from the RTC interrupt
    Armed,
}

/// Interrupt-context half of the ticker
///
/// Holds the expiry handler and the pending deadline, shared with the
/// foreground [`LowPowerTicker`].
pub struct AlarmDispatch<'a> {
    handler: HandlerSlot<'a, dyn AlarmHandler + 'a>,
    pending: Mutex<CriticalSectionRawMutex, Cell<Option<u32>>>,
}

impl Default for AlarmDispatch<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AlarmDispatch<'a> {
    /// Create a dispatcher with no handler and nothing pending
    pub const fn new() -> Self {
        Self {
            handler: HandlerSlot::new(),
            pending: Mutex::new(Cell::new(None)),
        }
    }

    /// Install the expiry handler, replacing any previous one
    pub fn register(&self, handler: &'a (dyn AlarmHandler + 'a)) -> Registration {
        self.handler.register(handler)
    }

    /// Remove the handler if `registration` is still current
    pub fn unregister(&self, registration: Registration) -> bool {
        self.handler.unregister(registration)
    }

    /// Armed deadline in ticks that has not fired yet
    pub fn pending_deadline(&self) -> Option<u32> {
        self.pending.lock(|p| p.get())
    }

    fn set_pending(&self, deadline: Option<u32>) {
        self.pending.lock(|p| p.set(deadline));
    }

    /// Hardware callback entry point
    ///
    /// Runs the handler once when `events` carries the alarm match and
    /// drops the pending deadline; every other status bit is ignored.
    /// The driver clears the hardware status.
    pub fn on_rtc_event(&self, events: RtcEvents) {
        if events.contains(RtcEvents::ALARM) {
            self.set_pending(None);
            self.fire();
        }
    }

    fn fire(&self) {
        if let Some(handler) = self.handler.get() {
            handler.on_alarm();
        }
    }
}

/// Foreground half of the ticker, owning the RTC driver
pub struct LowPowerTicker<'a, R> {
    rtc: R,
    config: TickerConfig,
    rate: TickRate,
    dispatch: &'a AlarmDispatch<'a>,
    running: bool,
}

impl<'a, R: RtcDriver> LowPowerTicker<'a, R> {
    /// Create a ticker; the counter is not started until [`init`](Self::init)
    pub fn new(rtc: R, config: TickerConfig, dispatch: &'a AlarmDispatch<'a>) -> Self {
        Self {
            rtc,
            rate: config.tick_rate(),
            config,
            dispatch,
            running: false,
        }
    }

    /// Bring up the counter
    ///
    /// Sets the prescaler, binds the interrupt, resets the count to zero,
    /// applies the configured trim and starts counting.
    pub fn init(&mut self) {
        self.rtc.set_prescaler(self.config.prescaler);
        self.rtc.bind_callback();
        self.rtc.set_count(0);

        match self.config.trim {
            Some(trim) => {
                self.rtc.set_trim(trim);
                self.rtc.enable_trim(true);
            }
            None => self.rtc.enable_trim(false),
        }

        self.rtc.enable(true);
        self.running = true;
        info!("low-power ticker running at {} Hz", self.rate.hz());
    }

    /// Stop the counter and drop any pending deadline
    pub fn shutdown(&mut self) {
        self.disable_interrupt();
        self.rtc.enable(false);
        self.running = false;
    }

    /// Whether the counter has been started
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Active configuration
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Tick rate derived from the configuration
    pub fn tick_rate(&self) -> TickRate {
        self.rate
    }

    /// Access the underlying driver
    pub fn rtc(&self) -> &R {
        &self.rtc
    }

    /// Mutable access to the underlying driver
    pub fn rtc_mut(&mut self) -> &mut R {
        &mut self.rtc
    }

    /// Current counter value in ticks
    pub fn read_ticks(&self) -> u32 {
        self.rtc.count()
    }

    /// Current time in microseconds
    pub fn read(&self) -> u32 {
        self.rate.ticks_to_us(self.rtc.count())
    }

    /// Arm the alarm for `timestamp_us`
    ///
    /// Replaces any deadline armed earlier. May run the handler before
    /// returning; see the module docs for when.
    pub fn set_interrupt(&mut self, timestamp_us: u32) -> ArmOutcome {
        let deadline = self.rate.us_to_ticks(timestamp_us);
        let now = self.rtc.count();

        if deadline <= now {
            trace!("deadline {} already passed at {}", deadline, now);
            self.cancel_replaced();
            self.dispatch.fire();
            return ArmOutcome::Elapsed;
        }

        // Counter wrap during the poll is not handled
        if deadline <= now.saturating_add(self.config.alarm_setup_ticks) {
            trace!("deadline {} too close to {}, polling", deadline, now);
            self.cancel_replaced();
            let mut count = now;
            while count < deadline {
                core::hint::spin_loop();
                count = self.rtc.count();
            }
            self.dispatch.fire();
            return ArmOutcome::Polled;
        }

        trace!("arming alarm for {} at {}", deadline, now);
        self.rtc.enable_alarm_interrupt(true);
        self.rtc.set_alarm(deadline);
        self.rtc.enable_alarm(true);
        self.dispatch.set_pending(Some(deadline));
        ArmOutcome::Armed
    }

    /// A deadline still armed in hardware would fire again later
    fn cancel_replaced(&mut self) {
        if self.dispatch.pending_deadline().is_some() {
            self.disable_interrupt();
        }
    }

    /// Disarm the alarm; harmless when nothing is pending
    pub fn disable_interrupt(&mut self) {
        self.rtc.enable_alarm(false);
        self.rtc.enable_alarm_interrupt(false);
        self.dispatch.set_pending(None);
    }

    /// Acknowledge the alarm interrupt
    ///
    /// The RTC driver clears the status before the callback runs, so
    /// there is nothing left to do here.
    pub fn clear_interrupt(&mut self) {}
}
