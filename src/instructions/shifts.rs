//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL and ROR operate on the accumulator or a memory operand.
//! The bit shifted out lands in Carry; rotates shift the old Carry in.

use crate::status::Status;
use crate::{AddressingMode, MemoryBus, CPU};

pub(crate) fn execute_asl<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.modify(mode, |cpu, value| {
        cpu.set_flag(Status::CARRY, value & 0x80 != 0);
        value << 1
    });
    cpu.update_zn(result);
}

pub(crate) fn execute_lsr<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.modify(mode, |cpu, value| {
        cpu.set_flag(Status::CARRY, value & 0x01 != 0);
        value >> 1
    });
    cpu.update_zn(result);
}

pub(crate) fn execute_rol<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.modify(mode, |cpu, value| {
        let carry_in = cpu.flag(Status::CARRY) as u8;
        cpu.set_flag(Status::CARRY, value & 0x80 != 0);
        (value << 1) | carry_in
    });
    cpu.update_zn(result);
}

pub(crate) fn execute_ror<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.modify(mode, |cpu, value| {
        let carry_in = cpu.flag(Status::CARRY) as u8;
        cpu.set_flag(Status::CARRY, value & 0x01 != 0);
        (value >> 1) | (carry_in << 7)
    });
    cpu.update_zn(result);
}
