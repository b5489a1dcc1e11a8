//! Breakpoint evaluation boundary.
//!
//! The engine asks a [`BreakpointEvaluator`] once per instruction boundary,
//! before fetching, whether execution should pause. Concrete condition types
//! (opcode matches, memory watches, expressions) belong to the debugger
//! front end; the crate only ships [`PcBreakpoints`], a plain address set.

use std::collections::BTreeSet;
use std::fmt;

use crate::status::Status;
use crate::MemoryBus;

/// Machine state handed to a breakpoint evaluator.
///
/// `opcode` is the byte at `pc` that is about to execute.
pub struct MachineState<'a> {
    pub pc: u16,
    pub opcode: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub status: Status,
    pub memory: &'a dyn MemoryBus,
}

/// Why execution paused: the matching condition and the triggering
/// address and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointHit {
    pub description: String,
    pub address: u16,
    pub value: u16,
}

impl fmt::Display for BreakpointHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ${:04X} (value ${:04X})",
            self.description, self.address, self.value
        )
    }
}

/// Decides whether the engine should pause before the next instruction.
pub trait BreakpointEvaluator: Send {
    fn evaluate(&mut self, state: &MachineState<'_>) -> Option<BreakpointHit>;
}

impl<F> BreakpointEvaluator for F
where
    F: FnMut(&MachineState<'_>) -> Option<BreakpointHit> + Send,
{
    fn evaluate(&mut self, state: &MachineState<'_>) -> Option<BreakpointHit> {
        self(state)
    }
}

/// Pauses whenever PC reaches one of a set of addresses.
#[derive(Debug, Clone, Default)]
pub struct PcBreakpoints {
    addresses: BTreeSet<u16>,
}

impl PcBreakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, addr: u16) {
        self.addresses.insert(addr);
    }

    pub fn remove(&mut self, addr: u16) -> bool {
        self.addresses.remove(&addr)
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.addresses.contains(&addr)
    }
}

impl BreakpointEvaluator for PcBreakpoints {
    fn evaluate(&mut self, state: &MachineState<'_>) -> Option<BreakpointHit> {
        self.addresses.contains(&state.pc).then(|| BreakpointHit {
            description: format!("PC == ${:04X}", state.pc),
            address: state.pc,
            value: state.opcode as u16,
        })
    }
}
