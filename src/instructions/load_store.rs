//! # Load and Store Instructions
//!
//! Loads (LDA, LDX, LDY) update Z and N; stores (STA, STX, STY) affect no
//! flags.

use crate::{AddressingMode, MemoryBus, CPU};

pub(crate) fn execute_lda<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    cpu.set_a(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_ldx<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    cpu.set_x(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_ldy<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    cpu.set_y(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_sta<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let addr = cpu.operand_address(mode);
    cpu.memory.write(addr, cpu.a);
}

pub(crate) fn execute_stx<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let addr = cpu.operand_address(mode);
    cpu.memory.write(addr, cpu.x);
}

pub(crate) fn execute_sty<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let addr = cpu.operand_address(mode);
    cpu.memory.write(addr, cpu.y);
}
