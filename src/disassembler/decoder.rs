//! Instruction decoder for the 6502 disassembler

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;
use crate::opcodes::OPCODE_TABLE;
use crate::MemoryBus;

/// Decodes the instruction at `address`.
///
/// An undocumented opcode decodes as a one-byte data instruction with no
/// mnemonic. Operand bytes past 0xFFFF wrap to the bottom of memory, as the
/// CPU's fetch does.
pub fn decode_instruction<M: MemoryBus + ?Sized>(bus: &M, address: u16) -> Instruction {
    let opcode = bus.read(address);

    let Some(metadata) = OPCODE_TABLE[opcode as usize] else {
        return Instruction {
            address,
            opcode,
            mnemonic: None,
            addressing_mode: AddressingMode::Implicit,
            operand_bytes: Vec::new(),
            size_bytes: 1,
        };
    };

    let operand_bytes = (1..metadata.size_bytes as u16)
        .map(|i| bus.read(address.wrapping_add(i)))
        .collect();

    Instruction {
        address,
        opcode,
        mnemonic: Some(metadata.mnemonic),
        addressing_mode: metadata.addressing_mode,
        operand_bytes,
        size_bytes: metadata.size_bytes,
    }
}
