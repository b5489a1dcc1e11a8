//! # Branch Instructions
//!
//! BCC, BCS, BEQ, BNE, BMI, BPL, BVC and BVS share one implementation: each
//! tests a single flag against an expected state.
//!
//! All branches use relative addressing with a signed 8-bit offset measured
//! from the address after the two-byte instruction. No flags are affected.

use crate::status::Status;
use crate::{AddressingMode, MemoryBus, CPU};

pub(crate) fn execute_branch<M: MemoryBus>(cpu: &mut CPU<M>, flag: Status, when_set: bool) {
    let target = cpu.operand_address(AddressingMode::Relative);
    if cpu.flag(flag) == when_set {
        cpu.pc = target;
    }
}
