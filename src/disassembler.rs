//! 6502 Disassembler Module
//!
//! Reads machine code back off a [`MemoryBus`] and renders it as assembly
//! text. Operand addresses that match a visible label in a [`LabelTable`]
//! are printed by name.
//!
//! # Examples
//!
//! ```
//! use sim6502::{disassemble, DisassemblyOptions, FlatMemory, MemoryBus};
//! use sim6502::disassembler::formatter::format_instruction;
//!
//! let mut mem = FlatMemory::new();
//! mem.write(0x0200, 0xA9); // LDA #$42
//! mem.write(0x0201, 0x42);
//! mem.write(0x0202, 0x00); // BRK
//!
//! let options = DisassemblyOptions {
//!     start_address: 0x0200,
//!     max_instructions: 2,
//!     ..Default::default()
//! };
//! let listing: Vec<String> = disassemble(&mem, options)
//!     .iter()
//!     .map(|instr| format_instruction(instr, None))
//!     .collect();
//! assert_eq!(listing, ["LDA #$42", "BRK"]);
//! ```

pub mod decoder;
pub mod formatter;

use crate::addressing::AddressingMode;
use crate::opcodes::Mnemonic;
use crate::MemoryBus;

pub use decoder::decode_instruction as disassemble_instruction;

/// A single disassembled instruction with full metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Memory address where this instruction starts
    pub address: u16,

    /// The opcode byte value (0x00-0xFF)
    pub opcode: u8,

    /// Instruction mnemonic, or `None` for a byte that is not a documented
    /// opcode
    pub mnemonic: Option<Mnemonic>,

    /// Addressing mode used by this instruction
    pub addressing_mode: AddressingMode,

    /// Operand bytes (0-2 bytes depending on addressing mode)
    pub operand_bytes: Vec<u8>,

    /// Total size in bytes (1-3 bytes: opcode + operands)
    pub size_bytes: u8,
}

impl Instruction {
    /// Operand as a 16-bit value: the byte for one-byte operands, the
    /// little-endian word for two.
    pub fn operand(&self) -> Option<u16> {
        match self.operand_bytes[..] {
            [lo] => Some(lo as u16),
            [lo, hi] => Some(u16::from_le_bytes([lo, hi])),
            _ => None,
        }
    }

    /// Branch target for relative instructions.
    pub fn branch_target(&self) -> Option<u16> {
        match (self.addressing_mode, &self.operand_bytes[..]) {
            (AddressingMode::Relative, [offset]) => Some(
                self.address
                    .wrapping_add(2)
                    .wrapping_add_signed(*offset as i8 as i16),
            ),
            _ => None,
        }
    }
}

/// Options controlling disassembly output
#[derive(Debug, Clone, Copy)]
pub struct DisassemblyOptions {
    /// Address of the first instruction
    pub start_address: u16,

    /// Stop after this many instructions
    pub max_instructions: usize,

    /// Whether listings include the raw instruction bytes
    pub hex_dump: bool,
}

impl Default for DisassemblyOptions {
    fn default() -> Self {
        Self {
            start_address: 0x0000,
            max_instructions: 16,
            hex_dump: false,
        }
    }
}

/// Disassembles consecutive instructions starting at `options.start_address`.
///
/// Stops early rather than wrapping past 0xFFFF.
pub fn disassemble<M: MemoryBus + ?Sized>(
    bus: &M,
    options: DisassemblyOptions,
) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(options.max_instructions);
    let mut address = options.start_address as u32;

    while instructions.len() < options.max_instructions && address <= 0xFFFF {
        let instr = decoder::decode_instruction(bus, address as u16);
        address += instr.size_bytes as u32;
        instructions.push(instr);
    }

    instructions
}
