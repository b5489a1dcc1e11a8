//! # Status Register and Change Notification
//!
//! The packed processor status byte (`NV1BDIZC`) and the set of observable
//! quantities an external UI can watch. Every register or flag assignment in
//! the engine goes through one set-and-notify path that compares old and new
//! values and reports the change through [`RegisterObserver`].

use bitflags::bitflags;

bitflags! {
    /// Packed 6502 status register.
    ///
    /// Bit 5 (`BREAK2`) is unused by the hardware and always reads as 1 in
    /// the packed form returned by the engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const BREAK2 = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

impl Status {
    /// Status after reset: interrupts disabled, bit 5 set.
    pub const RESET: Status = Status::INTERRUPT_DISABLE.union(Status::BREAK2);

    /// Short name of a single flag, as shown by register displays.
    ///
    /// Returns `"?"` for values that are not exactly one flag.
    pub fn flag_name(self) -> &'static str {
        const NAMES: [(Status, &str); 8] = [
            (Status::CARRY, "C"),
            (Status::ZERO, "Z"),
            (Status::INTERRUPT_DISABLE, "I"),
            (Status::DECIMAL, "D"),
            (Status::BREAK, "B"),
            (Status::BREAK2, "B2"),
            (Status::OVERFLOW, "V"),
            (Status::NEGATIVE, "N"),
        ];
        NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or("?", |(_, name)| *name)
    }
}

/// A register or flag whose changes are reported to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observable {
    A,
    X,
    Y,
    Pc,
    Sp,
    /// A single status flag.
    Flag(Status),
}

impl Observable {
    pub fn name(self) -> &'static str {
        match self {
            Observable::A => "A",
            Observable::X => "X",
            Observable::Y => "Y",
            Observable::Pc => "PC",
            Observable::Sp => "SP",
            Observable::Flag(flag) => flag.flag_name(),
        }
    }
}

/// Receives register and flag changes from the engine.
///
/// Purely diagnostic: an observer never influences emulation. Flags are
/// reported as 0 or 1.
///
/// Any `FnMut(Observable, u16) + Send` closure is an observer:
///
/// ```
/// use sim6502::{FlatMemory, MemoryBus, Observable, CPU};
/// use std::sync::{Arc, Mutex};
///
/// let mut mem = FlatMemory::new();
/// mem.write_word(0xFFFC, 0x8000);
/// let mut cpu = CPU::new(mem);
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// cpu.set_observer(move |what: Observable, value: u16| {
///     sink.lock().unwrap().push((what.name(), value));
/// });
///
/// cpu.set_a(0x42);
/// cpu.set_a(0x42); // unchanged, not reported
/// assert_eq!(*seen.lock().unwrap(), vec![("A", 0x42)]);
/// ```
pub trait RegisterObserver: Send {
    fn changed(&mut self, what: Observable, value: u16);
}

impl<F> RegisterObserver for F
where
    F: FnMut(Observable, u16) + Send,
{
    fn changed(&mut self, what: Observable, value: u16) {
        self(what, value)
    }
}
