//! # Run Control
//!
//! [`RunControl`] lets a controller thread (a debugger UI, a test) start,
//! pause, single-step and cancel a CPU whose run loop executes on another
//! thread.
//!
//! Two independent signals guard every instruction boundary:
//!
//! - **Hold**: the engine may run freely.
//! - **Step**: the engine may execute exactly one instruction, then park again.
//!
//! When neither signal grants permission the engine parks on a condition
//! variable. Each park is bounded by the maximum event duration; if no
//! controller event arrives in that time the run loop fails with
//! [`ExecutionError::ControlTimeout`]. A timeout means the controller stopped
//! responding, which is a different thing from the program halting.
//!
//! # Example
//!
//! ```
//! use sim6502::{RunControl, RunOptions, StopReason, FlatMemory, MemoryBus, CPU};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let mut mem = FlatMemory::new();
//! mem.write_word(0xFFFC, 0x0200);
//! mem.write(0x0200, 0x4C); // JMP $0200
//! mem.write_word(0x0201, 0x0200);
//!
//! let control = Arc::new(RunControl::paused());
//! let mut cpu = CPU::new(mem);
//! cpu.set_run_control(Arc::clone(&control));
//!
//! let engine = thread::spawn(move || cpu.run(RunOptions::default()));
//!
//! control.step();
//! control.go();
//! control.cancel();
//!
//! let outcome = engine.join().unwrap();
//! assert_eq!(outcome, Ok(StopReason::Cancelled));
//! ```

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, trace};

use crate::breakpoint::BreakpointHit;
use crate::cpu::StopReason;
use crate::ExecutionError;

/// Default bound on a single engine-side wait.
pub const DEFAULT_MAX_EVENT_DURATION: Duration = Duration::from_secs(60 * 60);

/// Notification sent to controller subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// A breakpoint paused execution before the instruction at `hit.address`.
    Breakpoint(BreakpointHit),
    /// The run loop returned.
    Finished(StopReason),
}

#[derive(Debug)]
struct Signals {
    hold: bool,
    step: bool,
    cancelled: bool,
}

/// Hold gate, step gate and cancellation signal shared by a controller and
/// an engine thread.
#[derive(Debug)]
pub struct RunControl {
    signals: Mutex<Signals>,
    changed: Condvar,
    max_event_duration: Duration,
    subscribers: Mutex<Vec<Sender<ControlEvent>>>,
}

impl RunControl {
    /// Creates a gate that lets the engine run freely.
    pub fn new() -> Self {
        Self::with_state(true)
    }

    /// Creates a gate that parks the engine until `go()` or `step()`.
    pub fn paused() -> Self {
        Self::with_state(false)
    }

    fn with_state(hold: bool) -> Self {
        Self {
            signals: Mutex::new(Signals {
                hold,
                step: false,
                cancelled: false,
            }),
            changed: Condvar::new(),
            max_event_duration: DEFAULT_MAX_EVENT_DURATION,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Sets the bound on each engine-side wait.
    pub fn with_max_event_duration(mut self, duration: Duration) -> Self {
        self.max_event_duration = duration;
        self
    }

    pub fn max_event_duration(&self) -> Duration {
        self.max_event_duration
    }

    /// Lets the engine run freely.
    pub fn go(&self) {
        self.update(|s| {
            s.hold = true;
            s.step = false;
        });
        debug!("run control: go");
    }

    /// Parks the engine before its next instruction.
    ///
    /// An engine currently waiting wakes up and re-parks without executing
    /// anything.
    pub fn stop(&self) {
        self.update(|s| {
            s.hold = false;
            s.step = false;
        });
        debug!("run control: stop");
    }

    /// Pauses the engine and grants it exactly one instruction.
    pub fn step(&self) {
        self.update(|s| {
            s.hold = false;
            s.step = true;
        });
        trace!("run control: step");
    }

    /// Asks the run loop to return [`StopReason::Cancelled`] at the next
    /// instruction boundary. Wakes a parked engine.
    pub fn cancel(&self) {
        self.update(|s| s.cancelled = true);
        debug!("run control: cancel");
    }

    /// Withdraws a previous cancellation so the gate can be reused.
    pub fn reset_cancel(&self) {
        self.update(|s| s.cancelled = false);
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Returns true while the hold signal lets the engine run freely.
    pub fn is_running(&self) -> bool {
        self.lock().hold
    }

    /// Registers a new event subscriber.
    pub fn subscribe(&self) -> Receiver<ControlEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Sends `event` to every live subscriber, dropping disconnected ones.
    pub(crate) fn publish(&self, event: ControlEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Breakpoint hit: same effect as `stop()`, plus a notification.
    pub(crate) fn pause_at(&self, hit: BreakpointHit) {
        debug!(%hit, "breakpoint hit");
        self.stop();
        self.publish(ControlEvent::Breakpoint(hit));
    }

    /// Engine side: may the next instruction execute?
    ///
    /// Returns `Ok(false)` when the engine should skip this boundary (paused
    /// and woken without a grant, cancelled, or `within` elapsed first) and
    /// an error when no controller event arrived within the maximum event
    /// duration. `within` is the time the caller has left, if it is bounded.
    pub(crate) fn acquire(&self, within: Option<Duration>) -> Result<bool, ExecutionError> {
        let mut signals = self.lock();
        if let Some(granted) = Self::try_grant(&mut signals) {
            return Ok(granted);
        }

        let wait_for = within.map_or(self.max_event_duration, |left| {
            left.min(self.max_event_duration)
        });
        let (mut signals, wait) = self
            .changed
            .wait_timeout(signals, wait_for)
            .unwrap_or_else(PoisonError::into_inner);

        match Self::try_grant(&mut signals) {
            Some(granted) => Ok(granted),
            None if wait.timed_out() && wait_for == self.max_event_duration => {
                Err(ExecutionError::ControlTimeout {
                    waited: self.max_event_duration,
                })
            }
            None => Ok(false),
        }
    }

    fn try_grant(signals: &mut Signals) -> Option<bool> {
        if signals.cancelled {
            Some(false)
        } else if signals.hold {
            Some(true)
        } else if signals.step {
            signals.step = false;
            Some(true)
        } else {
            None
        }
    }

    fn update(&self, f: impl FnOnce(&mut Signals)) {
        let mut signals = self.lock();
        f(&mut signals);
        self.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Signals> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_running_gate_grants_immediately() {
        let control = RunControl::new();
        assert_eq!(control.acquire(None), Ok(true));
        assert_eq!(control.acquire(None), Ok(true));
    }

    #[test]
    fn test_step_grants_exactly_once() {
        let control = RunControl::paused().with_max_event_duration(Duration::from_millis(20));
        control.step();
        assert_eq!(control.acquire(None), Ok(true));
        assert!(matches!(
            control.acquire(None),
            Err(ExecutionError::ControlTimeout { .. })
        ));
    }

    #[test]
    fn test_bounded_wait_returns_without_timeout() {
        let control = RunControl::paused().with_max_event_duration(Duration::from_secs(5));
        let started = Instant::now();
        assert_eq!(control.acquire(Some(Duration::from_millis(10))), Ok(false));
        assert!(started.elapsed() < Duration::from_secs(1));

        // a bound longer than the event duration still times out
        let control = RunControl::paused().with_max_event_duration(Duration::from_millis(10));
        assert!(matches!(
            control.acquire(Some(Duration::from_secs(5))),
            Err(ExecutionError::ControlTimeout { .. })
        ));
    }

    #[test]
    fn test_paused_gate_times_out() {
        let control = RunControl::paused().with_max_event_duration(Duration::from_millis(10));
        assert_eq!(
            control.acquire(None),
            Err(ExecutionError::ControlTimeout {
                waited: Duration::from_millis(10)
            })
        );
    }

    #[test]
    fn test_stop_wakes_waiter_without_grant() {
        let control = Arc::new(RunControl::paused());
        let waiter = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.acquire(None))
        };

        thread::sleep(Duration::from_millis(20));
        control.stop();

        assert_eq!(waiter.join().unwrap(), Ok(false));
    }

    #[test]
    fn test_cancel_denies() {
        let control = RunControl::new();
        control.cancel();
        assert!(control.is_cancelled());
        assert_eq!(control.acquire(None), Ok(false));
        control.reset_cancel();
        assert_eq!(control.acquire(None), Ok(true));
    }

    #[test]
    fn test_breakpoint_pauses_and_notifies() {
        let control = RunControl::new();
        let events = control.subscribe();

        let hit = BreakpointHit {
            description: "test".to_string(),
            address: 0x1234,
            value: 0xEA,
        };
        control.pause_at(hit.clone());

        assert!(!control.is_running());
        assert_eq!(events.try_recv(), Ok(ControlEvent::Breakpoint(hit)));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let control = RunControl::new();
        drop(control.subscribe());
        let live = control.subscribe();

        control.publish(ControlEvent::Finished(StopReason::Cancelled));
        assert_eq!(
            live.try_recv(),
            Ok(ControlEvent::Finished(StopReason::Cancelled))
        );
        assert_eq!(control.subscribers.lock().unwrap().len(), 1);
    }
}
