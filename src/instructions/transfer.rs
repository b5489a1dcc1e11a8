//! # Register Transfer Instructions
//!
//! TAX, TAY, TXA, TYA and TSX update Z and N from the copied value. TXS
//! changes no flags.

use crate::{MemoryBus, CPU};

pub(crate) fn execute_tax<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.a;
    cpu.set_x(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_tay<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.a;
    cpu.set_y(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_txa<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.x;
    cpu.set_a(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_tya<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.y;
    cpu.set_a(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_tsx<M: MemoryBus>(cpu: &mut CPU<M>) {
    let value = cpu.sp;
    cpu.set_x(value);
    cpu.update_zn(value);
}

pub(crate) fn execute_txs<M: MemoryBus>(cpu: &mut CPU<M>) {
    cpu.set_sp(cpu.x);
}
