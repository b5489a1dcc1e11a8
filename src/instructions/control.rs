//! # Control Flow Instructions
//!
//! This module implements:
//! - JMP: absolute and indirect jumps
//! - JSR / RTS: subroutine call and return
//! - RTI: return from interrupt
//! - BRK: halt the program
//! - NOP: no operation, optionally throttled

use crate::cpu::HaltReason;
use crate::status::Status;
use crate::{AddressingMode, MemoryBus, CPU};

/// Executes the JMP instruction.
///
/// Indirect mode reproduces the NMOS page-wrap bug: `JMP ($10FF)` reads its
/// high byte from $1000, not $1100.
pub(crate) fn execute_jmp<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    cpu.pc = cpu.operand_address(mode);
}

/// Executes the JSR (Jump to Subroutine) instruction.
///
/// Pushes the address of the last byte of the JSR instruction (high byte
/// first) and jumps to the target.
pub(crate) fn execute_jsr<M: MemoryBus>(cpu: &mut CPU<M>) {
    let target = cpu.fetch_word();
    let [lo, hi] = cpu.pc.wrapping_sub(1).to_le_bytes();
    cpu.push(hi);
    cpu.push(lo);
    cpu.pc = target;
}

/// Executes the RTS (Return from Subroutine) instruction.
///
/// Pulls the return address (low byte first) and resumes one byte past it.
pub(crate) fn execute_rts<M: MemoryBus>(cpu: &mut CPU<M>) {
    let lo = cpu.pull();
    let hi = cpu.pull();
    cpu.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
}

/// Executes the RTI (Return from Interrupt) instruction.
///
/// Pulls status (Break and bit 5 ignored), then PC low and high bytes,
/// clears Interrupt Disable and ends interrupt servicing.
pub(crate) fn execute_rti<M: MemoryBus>(cpu: &mut CPU<M>) {
    let status = cpu.pull();
    cpu.set_status(status);
    let lo = cpu.pull();
    let hi = cpu.pull();
    cpu.pc = u16::from_le_bytes([lo, hi]);
    cpu.set_flag(Status::INTERRUPT_DISABLE, false);
    cpu.end_interrupt();
}

/// Executes the BRK instruction.
///
/// Sets the Break flag and records [`HaltReason::Break`]. PC is left on the
/// BRK opcode so the halt address is visible to the caller.
pub(crate) fn execute_brk<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.pc = cpu.pc.wrapping_sub(1);
    cpu.halt(HaltReason::Break);
}

pub(crate) fn execute_nop<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.throttle();
}
