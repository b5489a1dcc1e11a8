//! # Addressing Modes
//!
//! The 6502 encodes how an instruction finds its operand in the opcode byte
//! itself. Each mode consumes between zero and two operand bytes that follow
//! the opcode.

/// 6502 addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implicit, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implicit,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: LSR A, ROL A, ASL A
    Accumulator,

    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ZeroPage,

    /// Zero page address indexed by X register, wrapping within zero page.
    ZeroPageX,

    /// Zero page address indexed by Y register, wrapping within zero page.
    ZeroPageY,

    /// Signed 8-bit offset for branch instructions.
    ///
    /// The offset is added to the PC *after* the offset byte has been consumed.
    Relative,

    /// Full 16-bit address.
    Absolute,

    /// 16-bit address indexed by X register.
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    AbsoluteY,

    /// Indirect jump through 16-bit pointer. Only used by JMP.
    Indirect,

    /// Indexed indirect: (ZP + X) used as a zero page pointer.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: zero page pointer dereferenced, then + Y.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_size(self) -> u8 {
        use AddressingMode::*;
        match self {
            Implicit | Accumulator => 0,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | Relative | IndirectX | IndirectY => 1,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 2,
        }
    }
}
