//! # Stack Instructions
//!
//! PHA/PLA move the accumulator; PHP/PLP move the packed status register.
//! PHP pushes with the Break bit set, as the hardware does; PLP ignores
//! Break and bit 5.

use crate::status::Status;
use crate::{MemoryBus, CPU};

pub(crate) fn execute_pha<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.push(cpu.a);
}

pub(crate) fn execute_php<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.push(cpu.status() | Status::BREAK.bits());
}

pub(crate) fn execute_pla<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.pull();
    cpu.set_a(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_plp<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.pull();
    cpu.set_status(value);
}
