//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the 6502 processor state and
//! the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next instruction
//! - **Stack pointer** (SP): 8-bit offset into stack page (0x0100-0x01FF)
//! - **Status flags**: packed [`Status`] register, bit 5 always set
//! - **Halt reason**: why the last run stopped
//!
//! ## Execution Model
//!
//! - [`CPU::step`]: one instruction boundary, ignoring run control
//! - [`CPU::run`]: the run loop, consulting [`RunControl`] before every
//!   instruction, servicing interrupts, and stopping on halt, cancellation
//!   or an elapsed time limit
//!
//! Every register and flag assignment goes through a single set-and-notify
//! path, so an attached [`RegisterObserver`] sees exactly the values that
//! changed.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::breakpoint::{BreakpointEvaluator, MachineState};
use crate::control::{ControlEvent, RunControl};
use crate::instructions;
use crate::interrupts::InterruptLines;
use crate::status::{Observable, RegisterObserver, Status};
use crate::{AddressingMode, ExecutionError, MemoryBus, OPCODE_TABLE};

/// Base address of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// Address of the NMI vector.
pub const NMI_VECTOR: u16 = 0xFFFA;

/// Address of the reset vector.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Address of the IRQ vector.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Longest single sleep while the NOP throttle is active. Interrupts are
/// checked between slices.
const SLEEP_SLICE: Duration = Duration::from_millis(1);

/// Why the engine halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HaltReason {
    #[default]
    None,
    /// A BRK instruction executed.
    Break,
    /// A push with SP at 0x00.
    StackOverflow,
    /// A pull with SP at 0xFF.
    StackUnderflow,
}

/// Why [`CPU::run`] returned normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The program halted; see [`HaltReason`].
    Halted(HaltReason),
    /// The caller's wall-clock limit elapsed.
    TimeLimit,
    /// [`RunControl::cancel`] was called.
    Cancelled,
}

/// Options for a single [`CPU::run`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop with [`StopReason::TimeLimit`] once this much wall-clock time has
    /// passed. Guards against runaway or interrupt-starved programs. Also
    /// bounds a wait at a paused run control, so a limit shorter than the
    /// maximum event duration ends the run before a `ControlTimeout`.
    pub time_limit: Option<Duration>,

    /// Wall-clock delay the mainline sleeps after every NOP. Interrupts are
    /// still serviced while the mainline sleeps.
    pub nop_delay: Option<Duration>,
}

impl RunOptions {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_nop_delay(mut self, delay: Duration) -> Self {
        self.nop_delay = Some(delay);
        self
    }
}

/// 6502 CPU state and execution context.
///
/// Generic over the memory implementation via the `MemoryBus` trait.
///
/// # Examples
///
/// ```
/// use sim6502::{CPU, FlatMemory, HaltReason, MemoryBus, RunOptions, StopReason};
///
/// let mut memory = FlatMemory::new();
/// memory.write_word(0xFFFC, 0x8000);
/// memory.write(0x8000, 0xA9); // LDA #$34
/// memory.write(0x8001, 0x34);
/// memory.write(0x8002, 0x00); // BRK
///
/// let mut cpu = CPU::new(memory);
/// assert_eq!(cpu.pc(), 0x8000);
/// assert_eq!(cpu.sp(), 0xFF);
/// assert!(cpu.flag_i());
///
/// let outcome = cpu.run(RunOptions::default());
/// assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::Break)));
/// assert_eq!(cpu.a(), 0x34);
/// ```
pub struct CPU<M: MemoryBus> {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) pc: u16,
    pub(crate) sp: u8,
    pub(crate) status: Status,

    pub(crate) memory: M,

    /// Set on interrupt entry, cleared only by RTI.
    servicing: bool,
    halt_reason: HaltReason,
    invalid_opcodes: u64,
    instructions: u64,

    interrupts: Arc<InterruptLines>,
    control: Arc<RunControl>,
    observer: Option<Box<dyn RegisterObserver>>,
    breakpoints: Option<Box<dyn BreakpointEvaluator>>,
    /// PC of the last breakpoint hit; skipped once when execution resumes.
    resume_pc: Option<u16>,
    /// Last PC value reported to the observer.
    reported_pc: u16,

    nop_delay: Option<Duration>,
    sleeping_until: Option<Instant>,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a new CPU with the given memory bus and performs a reset.
    ///
    /// - PC is loaded from the reset vector at 0xFFFC/0xFFFD
    /// - SP is set to 0xFF (empty stack)
    /// - Status has Interrupt Disable and bit 5 set
    /// - A, X and Y are zeroed
    pub fn new(memory: M) -> Self {
        let pc = memory.read_word(RESET_VECTOR);
        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            pc,
            sp: 0xFF,
            status: Status::RESET,
            memory,
            servicing: false,
            halt_reason: HaltReason::None,
            invalid_opcodes: 0,
            instructions: 0,
            interrupts: Arc::new(InterruptLines::new()),
            control: Arc::new(RunControl::new()),
            observer: None,
            breakpoints: None,
            resume_pc: None,
            reported_pc: pc,
            nop_delay: None,
            sleeping_until: None,
        }
    }

    /// Reinitializes registers and flags and reloads PC from the reset vector.
    ///
    /// Pending interrupt requests, the halt reason and the invalid opcode
    /// counter are cleared. Attached observer, breakpoints and run control
    /// are kept.
    pub fn reset(&mut self) {
        self.assign(Observable::A, 0);
        self.assign(Observable::X, 0);
        self.assign(Observable::Y, 0);
        self.assign(Observable::Sp, 0xFF);
        self.set_status(Status::RESET.bits());
        self.set_flag(Status::BREAK, false);
        self.pc = self.memory.read_word(RESET_VECTOR);
        self.report_pc();

        self.servicing = false;
        self.halt_reason = HaltReason::None;
        self.invalid_opcodes = 0;
        self.instructions = 0;
        self.resume_pc = None;
        self.sleeping_until = None;
        self.interrupts.clear();
        debug!(pc = format_args!("0x{:04X}", self.pc), "cpu reset");
    }

    // ========== Execution ==========

    /// Executes one instruction boundary without consulting run control.
    ///
    /// A pending interrupt is entered instead of executing an instruction;
    /// otherwise one instruction is fetched and executed. The NOP throttle
    /// does not apply.
    pub fn step(&mut self) {
        if !self.enter_pending_interrupt() {
            self.execute_next();
        }
        self.report_pc();
    }

    /// Runs until the program halts, the time limit elapses or the run is
    /// cancelled.
    ///
    /// The Break flag and halt reason are cleared on entry. Each iteration:
    ///
    /// 1. Returns [`StopReason::Cancelled`] if run control was cancelled
    /// 2. Enters a pending NMI, else a pending unmasked IRQ
    /// 3. Otherwise, unless the mainline is sleeping after a NOP, asks run
    ///    control for permission, consults the breakpoint evaluator and
    ///    executes one instruction
    /// 4. Returns [`StopReason::Halted`] if the Break flag is now set
    /// 5. Returns [`StopReason::TimeLimit`] if the time limit elapsed
    ///
    /// # Errors
    ///
    /// [`ExecutionError::ControlTimeout`] when run control denied permission
    /// and no controller event arrived within its maximum event duration.
    pub fn run(&mut self, options: RunOptions) -> Result<StopReason, ExecutionError> {
        self.halt_reason = HaltReason::None;
        self.set_flag(Status::BREAK, false);
        self.nop_delay = options.nop_delay.filter(|d| !d.is_zero());
        self.sleeping_until = None;
        debug!(pc = format_args!("0x{:04X}", self.pc), "run started");

        let started = Instant::now();
        let outcome = self.run_loop(started, options.time_limit);

        match &outcome {
            Ok(reason) => {
                debug!(
                    ?reason,
                    pc = format_args!("0x{:04X}", self.pc),
                    instructions = self.instructions,
                    "run finished"
                );
                self.control.publish(ControlEvent::Finished(*reason));
            }
            Err(err) => warn!(%err, "run aborted"),
        }
        outcome
    }

    fn run_loop(
        &mut self,
        started: Instant,
        time_limit: Option<Duration>,
    ) -> Result<StopReason, ExecutionError> {
        loop {
            if self.control.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }

            if self.enter_pending_interrupt() {
                // the entry sequence is this iteration's work
            } else if let Some(remaining) = self.sleep_remaining() {
                thread::sleep(remaining.min(SLEEP_SLICE));
            } else {
                let left = time_limit.map(|limit| limit.saturating_sub(started.elapsed()));
                if self.control.acquire(left)? && !self.breakpoint_pauses() {
                    self.execute_next();
                }
            }
            self.report_pc();

            if self.status.contains(Status::BREAK) {
                if self.halt_reason == HaltReason::None {
                    self.halt_reason = HaltReason::Break;
                }
                return Ok(StopReason::Halted(self.halt_reason));
            }

            if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                return Ok(StopReason::TimeLimit);
            }
        }
    }

    fn execute_next(&mut self) {
        let opcode_pc = self.pc;
        let opcode = self.fetch_byte();
        self.instructions += 1;

        match OPCODE_TABLE[opcode as usize] {
            Some(metadata) => {
                trace!(
                    pc = format_args!("0x{:04X}", opcode_pc),
                    mnemonic = metadata.mnemonic.as_str(),
                    "execute"
                );
                instructions::execute(self, metadata);
            }
            None => {
                self.invalid_opcodes += 1;
                warn!(
                    opcode = format_args!("0x{:02X}", opcode),
                    pc = format_args!("0x{:04X}", opcode_pc),
                    "invalid opcode"
                );
            }
        }
    }

    /// Enters a pending interrupt if one may be accepted now.
    fn enter_pending_interrupt(&mut self) -> bool {
        if self.servicing {
            return false;
        }

        if self.interrupts.nmi_pending() {
            self.interrupts.acknowledge_nmi();
            self.push_interrupt_frame();
            self.servicing = true;
            self.pc = self.memory.read_word(NMI_VECTOR);
            debug!(handler = format_args!("0x{:04X}", self.pc), "NMI entered");
            true
        } else if self.interrupts.irq_pending() && !self.status.contains(Status::INTERRUPT_DISABLE)
        {
            self.interrupts.acknowledge_irq();
            self.push_interrupt_frame();
            self.set_flag(Status::INTERRUPT_DISABLE, true);
            self.servicing = true;
            self.pc = self.memory.read_word(IRQ_VECTOR);
            debug!(handler = format_args!("0x{:04X}", self.pc), "IRQ entered");
            true
        } else {
            false
        }
    }

    fn push_interrupt_frame(&mut self) {
        let [lo, hi] = self.pc.to_le_bytes();
        self.push(hi);
        self.push(lo);
        self.push(self.status());
    }

    /// Asks the breakpoint evaluator about the instruction at PC. A hit
    /// pauses run control and skips the instruction.
    fn breakpoint_pauses(&mut self) -> bool {
        let pc = self.pc;
        if self.resume_pc.take() == Some(pc) {
            return false;
        }

        let Some(evaluator) = self.breakpoints.as_mut() else {
            return false;
        };
        let state = MachineState {
            pc,
            opcode: self.memory.read(pc),
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            status: self.status | Status::BREAK2,
            memory: &self.memory,
        };

        match evaluator.evaluate(&state) {
            Some(hit) => {
                self.resume_pc = Some(pc);
                self.control.pause_at(hit);
                true
            }
            None => false,
        }
    }

    fn sleep_remaining(&mut self) -> Option<Duration> {
        if self.servicing {
            return None;
        }
        let until = self.sleeping_until?;
        let now = Instant::now();
        if now < until {
            Some(until - now)
        } else {
            self.sleeping_until = None;
            None
        }
    }

    /// Starts the NOP throttle, if configured.
    pub(crate) fn throttle(&mut self) {
        if let Some(delay) = self.nop_delay {
            self.sleeping_until = Some(Instant::now() + delay);
        }
    }

    /// Records a fatal condition. The first reason of a run wins.
    pub(crate) fn halt(&mut self, reason: HaltReason) {
        if self.halt_reason == HaltReason::None {
            self.halt_reason = reason;
            debug!(?reason, pc = format_args!("0x{:04X}", self.pc), "cpu halted");
        }
        self.set_flag(Status::BREAK, true);
    }

    /// Marks the end of an interrupt handler (RTI).
    pub(crate) fn end_interrupt(&mut self) {
        self.servicing = false;
    }

    // ========== Set and Notify ==========

    fn current(&self, what: Observable) -> u16 {
        match what {
            Observable::A => self.a as u16,
            Observable::X => self.x as u16,
            Observable::Y => self.y as u16,
            Observable::Pc => self.pc,
            Observable::Sp => self.sp as u16,
            Observable::Flag(flag) => self.status.contains(flag) as u16,
        }
    }

    /// Assigns a register or flag and reports the change, if any.
    fn assign(&mut self, what: Observable, value: u16) {
        if self.current(what) == value {
            return;
        }

        match what {
            Observable::A => self.a = value as u8,
            Observable::X => self.x = value as u8,
            Observable::Y => self.y = value as u8,
            Observable::Pc => self.pc = value,
            Observable::Sp => self.sp = value as u8,
            Observable::Flag(flag) => {
                self.status.set(flag, value != 0);
                if flag == Status::INTERRUPT_DISABLE {
                    self.interrupts.set_interrupt_disable(value != 0);
                }
            }
        }

        if let Some(observer) = self.observer.as_mut() {
            observer.changed(what, value);
        }
    }

    /// PC moves on every fetched byte; it is reported once per boundary.
    fn report_pc(&mut self) {
        if self.pc != self.reported_pc {
            self.reported_pc = self.pc;
            if let Some(observer) = self.observer.as_mut() {
                observer.changed(Observable::Pc, self.pc);
            }
        }
    }

    /// Sets or clears a single status flag.
    ///
    /// Bit 5 cannot be cleared.
    pub fn set_flag(&mut self, flag: Status, value: bool) {
        if flag == Status::BREAK2 {
            return;
        }
        self.assign(Observable::Flag(flag), value as u16);
    }

    /// Returns whether `flag` is set.
    pub fn flag(&self, flag: Status) -> bool {
        (self.status | Status::BREAK2).contains(flag)
    }

    /// Recomputes Zero and Negative from `value`.
    pub(crate) fn update_zn(&mut self, value: u8) {
        self.set_flag(Status::ZERO, value == 0);
        self.set_flag(Status::NEGATIVE, value & 0x80 != 0);
    }

    // ========== Operand Fetching ==========

    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let value = self.memory.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte();
        let hi = self.fetch_byte();
        u16::from_le_bytes([lo, hi])
    }

    /// Reads a pointer from zero page; the high byte wraps within page zero.
    fn read_zero_page_word(&self, zp: u8) -> u16 {
        let lo = self.memory.read(zp as u16);
        let hi = self.memory.read(zp.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    /// Consumes the operand bytes of `mode` and returns the effective address.
    ///
    /// For `Immediate` this is the address of the operand byte itself; for
    /// `Relative` it is the branch target.
    pub(crate) fn operand_address(&mut self, mode: AddressingMode) -> u16 {
        use AddressingMode::*;

        match mode {
            Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            ZeroPage => self.fetch_byte() as u16,
            ZeroPageX => self.fetch_byte().wrapping_add(self.x) as u16,
            ZeroPageY => self.fetch_byte().wrapping_add(self.y) as u16,
            Absolute => self.fetch_word(),
            AbsoluteX => self.fetch_word().wrapping_add(self.x as u16),
            AbsoluteY => self.fetch_word().wrapping_add(self.y as u16),
            Indirect => {
                // NMOS quirk: the high byte is read from the same page.
                let ptr = self.fetch_word();
                let lo = self.memory.read(ptr);
                let hi = self.memory.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
                u16::from_le_bytes([lo, hi])
            }
            IndirectX => {
                let zp = self.fetch_byte().wrapping_add(self.x);
                self.read_zero_page_word(zp)
            }
            IndirectY => {
                let zp = self.fetch_byte();
                self.read_zero_page_word(zp).wrapping_add(self.y as u16)
            }
            Relative => {
                let offset = self.fetch_byte() as i8;
                self.pc.wrapping_add_signed(offset as i16)
            }
            Implicit | Accumulator => unreachable!("{:?} has no operand address", mode),
        }
    }

    /// Consumes the operand bytes of `mode` and returns the operand value.
    pub(crate) fn operand_value(&mut self, mode: AddressingMode) -> u8 {
        match mode {
            AddressingMode::Accumulator => self.a,
            _ => {
                let addr = self.operand_address(mode);
                self.memory.read(addr)
            }
        }
    }

    /// Read-modify-write on the accumulator or a memory operand.
    pub(crate) fn modify(
        &mut self,
        mode: AddressingMode,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) -> u8 {
        if mode == AddressingMode::Accumulator {
            let value = self.a;
            let result = f(self, value);
            self.set_a(result);
            result
        } else {
            let addr = self.operand_address(mode);
            let value = self.memory.read(addr);
            let result = f(self, value);
            self.memory.write(addr, result);
            result
        }
    }

    // ========== Stack ==========

    /// Pushes a byte: write to 0x0100 + SP, then decrement SP.
    ///
    /// Pushing with SP at 0x00 halts with [`HaltReason::StackOverflow`].
    pub(crate) fn push(&mut self, value: u8) {
        self.memory.write(STACK_BASE | self.sp as u16, value);
        if self.sp == 0x00 {
            self.halt(HaltReason::StackOverflow);
        } else {
            self.set_sp(self.sp - 1);
        }
    }

    /// Pulls a byte: increment SP, then read 0x0100 + SP.
    ///
    /// Pulling with SP at 0xFF halts with [`HaltReason::StackUnderflow`] and
    /// yields 0.
    pub(crate) fn pull(&mut self) -> u8 {
        if self.sp == 0xFF {
            self.halt(HaltReason::StackUnderflow);
            return 0;
        }
        self.set_sp(self.sp + 1);
        self.memory.read(STACK_BASE | self.sp as u16)
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value. The stack occupies 0x0100-0x01FF and
    /// grows downward.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the status register as a packed byte (`NV1BDIZC`).
    ///
    /// Bit 5 is always 1.
    pub fn status(&self) -> u8 {
        (self.status | Status::BREAK2).bits()
    }

    pub fn flag_n(&self) -> bool {
        self.flag(Status::NEGATIVE)
    }

    pub fn flag_v(&self) -> bool {
        self.flag(Status::OVERFLOW)
    }

    pub fn flag_b(&self) -> bool {
        self.flag(Status::BREAK)
    }

    pub fn flag_d(&self) -> bool {
        self.flag(Status::DECIMAL)
    }

    pub fn flag_i(&self) -> bool {
        self.flag(Status::INTERRUPT_DISABLE)
    }

    pub fn flag_z(&self) -> bool {
        self.flag(Status::ZERO)
    }

    pub fn flag_c(&self) -> bool {
        self.flag(Status::CARRY)
    }

    /// Why the last run halted.
    pub fn halt_reason(&self) -> HaltReason {
        self.halt_reason
    }

    /// True once the Break flag is set.
    pub fn is_halted(&self) -> bool {
        self.status.contains(Status::BREAK)
    }

    /// Number of unmapped opcodes fetched since reset.
    pub fn invalid_opcode_count(&self) -> u64 {
        self.invalid_opcodes
    }

    /// Number of opcodes fetched since reset.
    pub fn instruction_count(&self) -> u64 {
        self.instructions
    }

    /// True between interrupt entry and the matching RTI.
    pub fn is_servicing_interrupt(&self) -> bool {
        self.servicing
    }

    // ========== Register Setters ==========

    pub fn set_a(&mut self, value: u8) {
        self.assign(Observable::A, value as u16);
    }

    pub fn set_x(&mut self, value: u8) {
        self.assign(Observable::X, value as u16);
    }

    pub fn set_y(&mut self, value: u8) {
        self.assign(Observable::Y, value as u16);
    }

    pub fn set_sp(&mut self, value: u8) {
        self.assign(Observable::Sp, value as u16);
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
        self.report_pc();
    }

    /// Loads all flags from a packed byte. Break and bit 5 are not taken
    /// from `value`: Break keeps its current state and bit 5 stays set.
    pub fn set_status(&mut self, value: u8) {
        let packed = Status::from_bits_retain(value);
        for flag in [
            Status::CARRY,
            Status::ZERO,
            Status::INTERRUPT_DISABLE,
            Status::DECIMAL,
            Status::OVERFLOW,
            Status::NEGATIVE,
        ] {
            self.set_flag(flag, packed.contains(flag));
        }
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.set_flag(Status::CARRY, value);
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.set_flag(Status::ZERO, value);
    }

    pub fn set_flag_i(&mut self, value: bool) {
        self.set_flag(Status::INTERRUPT_DISABLE, value);
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.set_flag(Status::DECIMAL, value);
    }

    pub fn set_flag_b(&mut self, value: bool) {
        self.set_flag(Status::BREAK, value);
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.set_flag(Status::OVERFLOW, value);
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.set_flag(Status::NEGATIVE, value);
    }

    // ========== Collaborators ==========

    /// Shared access to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Exclusive access to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consumes the CPU, returning its memory bus.
    pub fn into_memory(self) -> M {
        self.memory
    }

    /// Handle devices use to raise interrupts.
    pub fn interrupt_lines(&self) -> Arc<InterruptLines> {
        Arc::clone(&self.interrupts)
    }

    /// Replaces the interrupt lines, syncing them with the current I flag.
    pub fn set_interrupt_lines(&mut self, lines: Arc<InterruptLines>) {
        lines.set_interrupt_disable(self.status.contains(Status::INTERRUPT_DISABLE));
        self.interrupts = lines;
    }

    /// Shortcut for `interrupt_lines().assert_nmi()`.
    pub fn assert_nmi(&self) {
        self.interrupts.assert_nmi();
    }

    /// Handle of the gate consulted by [`run`](Self::run).
    pub fn run_control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    pub fn set_run_control(&mut self, control: Arc<RunControl>) {
        self.control = control;
    }

    /// Attaches a register/flag observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl RegisterObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Attaches the breakpoint evaluator consulted by [`run`](Self::run).
    pub fn set_breakpoints(&mut self, evaluator: impl BreakpointEvaluator + 'static) {
        self.breakpoints = Some(Box::new(evaluator));
        self.resume_pc = None;
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints = None;
        self.resume_pc = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatMemory;

    fn setup_cpu() -> CPU<FlatMemory> {
        let mut mem = FlatMemory::new();
        mem.write_word(RESET_VECTOR, 0x8000);
        CPU::new(mem)
    }

    #[test]
    fn test_cpu_initialization() {
        let cpu = setup_cpu();

        assert_eq!(cpu.pc(), 0x8000);
        assert_eq!(cpu.sp(), 0xFF);
        assert_eq!(cpu.a(), 0x00);
        assert_eq!(cpu.x(), 0x00);
        assert_eq!(cpu.y(), 0x00);
        assert_eq!(cpu.status(), 0b0010_0100);
        assert_eq!(cpu.halt_reason(), HaltReason::None);
    }

    #[test]
    fn test_status_always_has_bit5() {
        let mut cpu = setup_cpu();
        cpu.set_status(0x00);
        assert_eq!(cpu.status(), 0b0010_0000);
        cpu.set_flag(Status::BREAK2, false);
        assert!(cpu.flag(Status::BREAK2));
    }

    #[test]
    fn test_set_status_keeps_break() {
        let mut cpu = setup_cpu();
        cpu.set_status(0xFF);
        assert!(!cpu.flag_b());
        assert_eq!(cpu.status(), 0xEF);
    }

    #[test]
    fn test_operand_addressing_modes() {
        let mut cpu = setup_cpu();
        cpu.set_x(0x05);
        cpu.set_y(0x10);
        cpu.memory_mut().write(0x8000, 0xFE);
        cpu.memory_mut().write(0x8001, 0x34);
        cpu.memory_mut().write(0x8002, 0x12);

        cpu.pc = 0x8000;
        assert_eq!(cpu.operand_address(AddressingMode::ZeroPageX), 0x0003);
        assert_eq!(cpu.pc, 0x8001);

        cpu.pc = 0x8001;
        assert_eq!(cpu.operand_address(AddressingMode::AbsoluteY), 0x1244);
        assert_eq!(cpu.pc, 0x8003);
    }

    #[test]
    fn test_indirect_indexed_addressing() {
        let mut cpu = setup_cpu();
        cpu.set_x(0x04);
        cpu.set_y(0x02);
        cpu.memory_mut().write_word(0x0024, 0x3000);
        cpu.memory_mut().write_word(0x0020, 0x4000);
        cpu.memory_mut().write(0x8000, 0x20);

        cpu.pc = 0x8000;
        assert_eq!(cpu.operand_address(AddressingMode::IndirectX), 0x3000);

        cpu.pc = 0x8000;
        assert_eq!(cpu.operand_address(AddressingMode::IndirectY), 0x4002);
    }

    #[test]
    fn test_zero_page_pointer_wraps() {
        let mut cpu = setup_cpu();
        cpu.memory_mut().write(0x00FF, 0x34);
        cpu.memory_mut().write(0x0000, 0x12);
        cpu.memory_mut().write(0x8000, 0xFF);

        cpu.pc = 0x8000;
        assert_eq!(cpu.operand_address(AddressingMode::IndirectY), 0x1234);
    }

    #[test]
    fn test_relative_target_after_operand() {
        let mut cpu = setup_cpu();
        cpu.memory_mut().write(0x8000, 0xFC); // -4

        cpu.pc = 0x8000;
        assert_eq!(cpu.operand_address(AddressingMode::Relative), 0x7FFD);
        assert_eq!(cpu.pc, 0x8001);
    }

    #[test]
    fn test_push_pull_and_limits() {
        let mut cpu = setup_cpu();
        cpu.push(0xAB);
        assert_eq!(cpu.sp(), 0xFE);
        assert_eq!(cpu.memory().read(0x01FF), 0xAB);
        assert_eq!(cpu.pull(), 0xAB);
        assert_eq!(cpu.sp(), 0xFF);
        assert!(!cpu.is_halted());

        cpu.pull();
        assert!(cpu.is_halted());
        assert_eq!(cpu.halt_reason(), HaltReason::StackUnderflow);
    }

    #[test]
    fn test_push_at_bottom_overflows() {
        let mut cpu = setup_cpu();
        cpu.set_sp(0x00);
        cpu.push(0x11);
        assert_eq!(cpu.halt_reason(), HaltReason::StackOverflow);
        assert!(cpu.flag_b());
        assert_eq!(cpu.sp(), 0x00);
    }

    #[test]
    fn test_invalid_opcode_is_counted_and_skipped() {
        let mut cpu = setup_cpu();
        cpu.memory_mut().write(0x8000, 0x02);
        cpu.step();
        assert_eq!(cpu.invalid_opcode_count(), 1);
        assert_eq!(cpu.pc(), 0x8001);
        assert!(!cpu.is_halted());
    }

    #[test]
    fn test_interrupt_disable_mirrored_to_lines() {
        let mut cpu = setup_cpu();
        let lines = cpu.interrupt_lines();
        cpu.set_flag_i(false);
        assert!(lines.request_irq_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_reset_restores_power_on_state() {
        let mut cpu = setup_cpu();
        cpu.set_a(0x12);
        cpu.set_sp(0x80);
        cpu.set_flag_c(true);
        cpu.set_pc(0x1234);

        cpu.reset();

        assert_eq!(cpu.a(), 0);
        assert_eq!(cpu.sp(), 0xFF);
        assert!(!cpu.flag_c());
        assert!(cpu.flag_i());
        assert_eq!(cpu.pc(), 0x8000);
    }
}
