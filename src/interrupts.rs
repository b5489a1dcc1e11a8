//! Interrupt request lines shared between devices and the CPU.
//!
//! Devices hold an `Arc<InterruptLines>` and call [`assert_nmi`] or
//! [`request_irq`] from whatever thread they run on (a keyboard bridge, a
//! timer). The engine samples the pending flags only at instruction
//! boundaries, never in the middle of an instruction, and always services a
//! pending NMI before a pending IRQ.
//!
//! ## Service sequence
//!
//! When the CPU accepts an interrupt it:
//!
//! 1. Pushes PC (high byte, then low byte) to the stack
//! 2. Pushes the packed status register
//! 3. Sets the I flag (IRQ only)
//! 4. Loads PC from the NMI vector (0xFFFA) or IRQ vector (0xFFFE)
//!
//! No further interrupt of either kind is accepted until the handler returns
//! with RTI.
//!
//! [`assert_nmi`]: InterruptLines::assert_nmi
//! [`request_irq`]: InterruptLines::request_irq

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// NMI and IRQ pending flags plus a mirror of the CPU's I flag.
#[derive(Debug)]
pub struct InterruptLines {
    nmi: AtomicBool,
    irq: AtomicBool,
    interrupt_disable: Mutex<bool>,
    enabled: Condvar,
}

impl InterruptLines {
    /// Creates lines with nothing pending. Interrupts start disabled, as
    /// after a CPU reset.
    pub fn new() -> Self {
        Self {
            nmi: AtomicBool::new(false),
            irq: AtomicBool::new(false),
            interrupt_disable: Mutex::new(true),
            enabled: Condvar::new(),
        }
    }

    /// Marks a non-maskable interrupt as pending. Returns immediately.
    pub fn assert_nmi(&self) {
        self.nmi.store(true, Ordering::Release);
    }

    /// Marks a maskable interrupt as pending, then blocks the caller until
    /// the CPU's InterruptDisable flag is clear.
    ///
    /// This models a device that waits for the CPU to be ready to accept
    /// its request. Never call it from the engine thread itself (for example
    /// from a device `write`) while interrupts are disabled; that thread is
    /// the only one that can clear the flag.
    pub fn request_irq(&self) {
        self.irq.store(true, Ordering::Release);
        let mut disabled = self.lock();
        while *disabled {
            disabled = self
                .enabled
                .wait(disabled)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`request_irq`](Self::request_irq), but gives up waiting after
    /// `timeout`. The request stays pending either way.
    ///
    /// Returns true if interrupts were enabled before the timeout.
    pub fn request_irq_timeout(&self, timeout: Duration) -> bool {
        self.irq.store(true, Ordering::Release);
        let deadline = Instant::now() + timeout;
        let mut disabled = self.lock();
        while *disabled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            disabled = self
                .enabled
                .wait_timeout(disabled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Returns true if an NMI is waiting to be serviced.
    pub fn nmi_pending(&self) -> bool {
        self.nmi.load(Ordering::Acquire)
    }

    /// Returns true if an IRQ is waiting to be serviced.
    pub fn irq_pending(&self) -> bool {
        self.irq.load(Ordering::Acquire)
    }

    /// Drops any pending requests.
    pub fn clear(&self) {
        self.nmi.store(false, Ordering::Release);
        self.irq.store(false, Ordering::Release);
    }

    pub(crate) fn acknowledge_nmi(&self) {
        self.nmi.store(false, Ordering::Release);
    }

    pub(crate) fn acknowledge_irq(&self) {
        self.irq.store(false, Ordering::Release);
    }

    /// Called by the engine whenever its I flag changes.
    pub(crate) fn set_interrupt_disable(&self, disabled: bool) {
        let mut guard = self.lock();
        *guard = disabled;
        if !disabled {
            self.enabled.notify_all();
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.interrupt_disable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InterruptLines {
    fn default() -> Self {
        Self::new()
    }
}
