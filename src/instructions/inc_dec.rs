//! # Increment and Decrement Instructions
//!
//! INC/DEC modify memory; INX, INY, DEX and DEY modify index registers.
//! All wrap at the byte boundary and update Z and N.

use crate::{AddressingMode, MemoryBus, CPU};

pub(crate) fn execute_inc<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.modify(mode, |_, value| value.wrapping_add(1));
    cpu.update_zn(result);
}

pub(crate) fn execute_dec<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.modify(mode, |_, value| value.wrapping_sub(1));
    cpu.update_zn(result);
}

pub(crate) fn execute_inx<M: MemoryBus>(cpu: &mut CPU<M>) {
    let result = cpu.x.wrapping_add(1);
    cpu.set_x(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_iny<M: MemoryBus>(cpu: &mut CPU<M>) {
    let result = cpu.y.wrapping_add(1);
    cpu.set_y(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_dex<M: MemoryBus>(cpu: &mut CPU<M>) {
    let result = cpu.x.wrapping_sub(1);
    cpu.set_x(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_dey<M: MemoryBus>(cpu: &mut CPU<M>) {
    let result = cpu.y.wrapping_sub(1);
    cpu.set_y(result);
    cpu.update_zn(result);
}
