//! # Flag Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED and CLV each set or clear a single status
//! flag. Changing Interrupt Disable also wakes devices blocked in
//! `InterruptLines::request_irq`.

use crate::status::Status;
use crate::{MemoryBus, CPU};

pub(crate) fn execute_flag<M: MemoryBus>(cpu: &mut CPU<M>, flag: Status, value: bool) {
    cpu.set_flag(flag, value);
}
