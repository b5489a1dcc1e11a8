//! # 6502 CPU Simulator
//!
//! An NMOS 6502 instruction-level simulator with a device-mapped memory bus,
//! a relocating loader and a debugger-grade run control layer.
//!
//! This crate provides:
//!
//! - the execution engine: registers, packed status flags, the 151 documented
//!   opcodes, interrupt servicing and halt semantics
//! - a memory bus that routes every address to exactly one installed device
//! - a cursor-based loader that resolves forward label references in a
//!   fixup pass
//! - a run control gate so another thread can pause, step, resume and cancel
//!   the engine
//!
//! ## Quick Start
//!
//! ```rust
//! use sim6502::{CPU, FlatMemory, MemoryBus, RunOptions, StopReason, HaltReason};
//!
//! // Create 64KB flat memory
//! let mut memory = FlatMemory::new();
//!
//! // Set reset vector to point to program start at 0x8000
//! memory.write(0xFFFC, 0x00); // Low byte
//! memory.write(0xFFFD, 0x80); // High byte
//!
//! // LDA #$34 ; BRK
//! memory.write(0x8000, 0xA9);
//! memory.write(0x8001, 0x34);
//! memory.write(0x8002, 0x00);
//!
//! // Initialize CPU - it will load PC from the reset vector
//! let mut cpu = CPU::new(memory);
//! assert_eq!(cpu.pc(), 0x8000);
//! assert_eq!(cpu.sp(), 0xFF);
//! assert_eq!(cpu.flag_i(), true);
//!
//! let outcome = cpu.run(RunOptions::default());
//! assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::Break)));
//! assert_eq!(cpu.a(), 0x34);
//! assert_eq!(cpu.pc(), 0x8002);
//! ```
//!
//! ## Loading programs
//!
//! ```rust
//! use sim6502::{AddressingMode::*, LabelTable, Loader, MappedMemory, Mnemonic::*, RamDevice};
//! use std::sync::Arc;
//!
//! let mut bus = MappedMemory::new();
//! bus.install(Arc::new(RamDevice::new(0x0000, 0x1_0000)));
//!
//! let mut labels = LabelTable::new();
//! let mut loader = Loader::new(&mut bus, &mut labels);
//! loader.from(0x0200);
//! loader.ins(Ldx, Immediate).write(0x05);
//! loader.label("loop");
//! loader.ins(Dex, Implicit);
//! loader.ins(Bne, Relative).relative_ref("loop");
//! loader.ins(Brk, Implicit);
//! loader.fixup().unwrap();
//! ```
//!
//! ## Modules
//!
//! - `cpu` - CPU state and the run loop
//! - `memory` - MemoryBus trait and FlatMemory
//! - `devices` - Device trait, MappedMemory, RAM and ROM devices
//! - `opcodes` - Opcode metadata table
//! - `addressing` - Addressing mode enumeration
//! - `status` - Packed status register and observer hook
//! - `interrupts` - NMI and IRQ request lines
//! - `control` - Run control gate
//! - `breakpoint` - Breakpoint evaluation boundary
//! - `assembler` - Loader, label table and binary images
//! - `disassembler` - Bus contents back to assembly text

pub mod addressing;
pub mod assembler;
pub mod breakpoint;
pub mod control;
pub mod cpu;
pub mod devices;
pub mod disassembler;
pub mod interrupts;
pub mod memory;
pub mod opcodes;
pub mod status;

// Internal instruction implementations (not part of public API)
mod instructions;

use std::time::Duration;

use thiserror::Error;

// Re-export public API
pub use addressing::AddressingMode;
pub use assembler::{
    encode_image, BinaryImage, FixupError, ImageError, LabelError, LabelTable, Loader,
    LoaderError,
};
pub use breakpoint::{BreakpointEvaluator, BreakpointHit, MachineState, PcBreakpoints};
pub use control::{ControlEvent, RunControl};
pub use cpu::{HaltReason, RunOptions, StopReason, CPU};
pub use devices::{Device, DeviceId, MappedMemory, RamDevice, RomDevice};
pub use disassembler::{disassemble, disassemble_instruction, DisassemblyOptions, Instruction};
pub use interrupts::InterruptLines;
pub use memory::{FlatMemory, MemoryBus};
pub use opcodes::{find_opcode, Mnemonic, OpcodeMetadata, OPCODE_TABLE};
pub use status::{Observable, RegisterObserver, Status};

/// Errors that end a run abnormally.
///
/// Program faults (BRK, stack misuse, invalid opcodes) are not errors: they
/// surface as [`HaltReason`] or counters on the CPU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The engine waited for a run control event longer than the maximum
    /// event duration.
    #[error("no run control event within {waited:?}")]
    ControlTimeout { waited: Duration },
}
