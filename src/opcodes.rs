//! # Opcode Table
//!
//! The 256-entry opcode table is the single source of truth for decoding. The
//! engine, the loader's `ins` helper and the disassembler all index into it.
//!
//! The table covers the 151 documented NMOS 6502 opcodes. The remaining 105
//! byte values are `None`: the engine counts them as invalid and moves on.

use std::fmt;
use std::str::FromStr;

use crate::addressing::AddressingMode;

/// Instruction mnemonics of the documented 6502 instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

#[rustfmt::skip]
const ALL_MNEMONICS: [Mnemonic; 56] = {
    use Mnemonic::*;
    [
        Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
        Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
        Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
        Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    ]
};

impl Mnemonic {
    /// Upper-case three letter name, e.g. `"LDA"`.
    #[rustfmt::skip]
    pub const fn as_str(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA",
        }
    }

    /// Returns true for the eight conditional branches.
    pub fn is_branch(self) -> bool {
        use Mnemonic::*;
        matches!(self, Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bvc | Bvs)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a documented instruction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mnemonic '{0}'")]
pub struct UnknownMnemonic(pub String);

impl FromStr for Mnemonic {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MNEMONICS
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

/// Metadata for a single mapped opcode.
///
/// # Examples
///
/// ```
/// use sim6502::{AddressingMode, Mnemonic, OPCODE_TABLE};
///
/// let lda_imm = OPCODE_TABLE[0xA9].unwrap();
/// assert_eq!(lda_imm.mnemonic, Mnemonic::Lda);
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.size_bytes, 2);
///
/// // 0x02 is not a documented opcode
/// assert!(OPCODE_TABLE[0x02].is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// Addressing mode for this instruction.
    pub addressing_mode: AddressingMode,

    /// Total instruction size in bytes (opcode + operands, 1-3).
    pub size_bytes: u8,
}

impl OpcodeMetadata {
    const fn new(mnemonic: Mnemonic, addressing_mode: AddressingMode) -> Self {
        Self {
            mnemonic,
            addressing_mode,
            size_bytes: 1 + addressing_mode.operand_size(),
        }
    }
}

#[rustfmt::skip]
const DOCUMENTED: [(u8, Mnemonic, AddressingMode); 151] = {
    use AddressingMode::*;
    use Mnemonic::*;
    [
        (0x69, Adc, Immediate), (0x65, Adc, ZeroPage), (0x75, Adc, ZeroPageX), (0x6D, Adc, Absolute),
        (0x7D, Adc, AbsoluteX), (0x79, Adc, AbsoluteY), (0x61, Adc, IndirectX), (0x71, Adc, IndirectY),

        (0x29, And, Immediate), (0x25, And, ZeroPage), (0x35, And, ZeroPageX), (0x2D, And, Absolute),
        (0x3D, And, AbsoluteX), (0x39, And, AbsoluteY), (0x21, And, IndirectX), (0x31, And, IndirectY),

        (0x0A, Asl, Accumulator), (0x06, Asl, ZeroPage), (0x16, Asl, ZeroPageX), (0x0E, Asl, Absolute),
        (0x1E, Asl, AbsoluteX),

        (0x90, Bcc, Relative), (0xB0, Bcs, Relative), (0xF0, Beq, Relative), (0x30, Bmi, Relative),
        (0xD0, Bne, Relative), (0x10, Bpl, Relative), (0x50, Bvc, Relative), (0x70, Bvs, Relative),

        (0x24, Bit, ZeroPage), (0x2C, Bit, Absolute),

        (0x00, Brk, Implicit),

        (0x18, Clc, Implicit), (0xD8, Cld, Implicit), (0x58, Cli, Implicit), (0xB8, Clv, Implicit),

        (0xC9, Cmp, Immediate), (0xC5, Cmp, ZeroPage), (0xD5, Cmp, ZeroPageX), (0xCD, Cmp, Absolute),
        (0xDD, Cmp, AbsoluteX), (0xD9, Cmp, AbsoluteY), (0xC1, Cmp, IndirectX), (0xD1, Cmp, IndirectY),

        (0xE0, Cpx, Immediate), (0xE4, Cpx, ZeroPage), (0xEC, Cpx, Absolute),
        (0xC0, Cpy, Immediate), (0xC4, Cpy, ZeroPage), (0xCC, Cpy, Absolute),

        (0xC6, Dec, ZeroPage), (0xD6, Dec, ZeroPageX), (0xCE, Dec, Absolute), (0xDE, Dec, AbsoluteX),
        (0xCA, Dex, Implicit), (0x88, Dey, Implicit),

        (0x49, Eor, Immediate), (0x45, Eor, ZeroPage), (0x55, Eor, ZeroPageX), (0x4D, Eor, Absolute),
        (0x5D, Eor, AbsoluteX), (0x59, Eor, AbsoluteY), (0x41, Eor, IndirectX), (0x51, Eor, IndirectY),

        (0xE6, Inc, ZeroPage), (0xF6, Inc, ZeroPageX), (0xEE, Inc, Absolute), (0xFE, Inc, AbsoluteX),
        (0xE8, Inx, Implicit), (0xC8, Iny, Implicit),

        (0x4C, Jmp, Absolute), (0x6C, Jmp, Indirect), (0x20, Jsr, Absolute),

        (0xA9, Lda, Immediate), (0xA5, Lda, ZeroPage), (0xB5, Lda, ZeroPageX), (0xAD, Lda, Absolute),
        (0xBD, Lda, AbsoluteX), (0xB9, Lda, AbsoluteY), (0xA1, Lda, IndirectX), (0xB1, Lda, IndirectY),

        (0xA2, Ldx, Immediate), (0xA6, Ldx, ZeroPage), (0xB6, Ldx, ZeroPageY), (0xAE, Ldx, Absolute),
        (0xBE, Ldx, AbsoluteY),

        (0xA0, Ldy, Immediate), (0xA4, Ldy, ZeroPage), (0xB4, Ldy, ZeroPageX), (0xAC, Ldy, Absolute),
        (0xBC, Ldy, AbsoluteX),

        (0x4A, Lsr, Accumulator), (0x46, Lsr, ZeroPage), (0x56, Lsr, ZeroPageX), (0x4E, Lsr, Absolute),
        (0x5E, Lsr, AbsoluteX),

        (0xEA, Nop, Implicit),

        (0x09, Ora, Immediate), (0x05, Ora, ZeroPage), (0x15, Ora, ZeroPageX), (0x0D, Ora, Absolute),
        (0x1D, Ora, AbsoluteX), (0x19, Ora, AbsoluteY), (0x01, Ora, IndirectX), (0x11, Ora, IndirectY),

        (0x48, Pha, Implicit), (0x08, Php, Implicit), (0x68, Pla, Implicit), (0x28, Plp, Implicit),

        (0x2A, Rol, Accumulator), (0x26, Rol, ZeroPage), (0x36, Rol, ZeroPageX), (0x2E, Rol, Absolute),
        (0x3E, Rol, AbsoluteX),

        (0x6A, Ror, Accumulator), (0x66, Ror, ZeroPage), (0x76, Ror, ZeroPageX), (0x6E, Ror, Absolute),
        (0x7E, Ror, AbsoluteX),

        (0x40, Rti, Implicit), (0x60, Rts, Implicit),

        (0xE9, Sbc, Immediate), (0xE5, Sbc, ZeroPage), (0xF5, Sbc, ZeroPageX), (0xED, Sbc, Absolute),
        (0xFD, Sbc, AbsoluteX), (0xF9, Sbc, AbsoluteY), (0xE1, Sbc, IndirectX), (0xF1, Sbc, IndirectY),

        (0x38, Sec, Implicit), (0xF8, Sed, Implicit), (0x78, Sei, Implicit),

        (0x85, Sta, ZeroPage), (0x95, Sta, ZeroPageX), (0x8D, Sta, Absolute), (0x9D, Sta, AbsoluteX),
        (0x99, Sta, AbsoluteY), (0x81, Sta, IndirectX), (0x91, Sta, IndirectY),

        (0x86, Stx, ZeroPage), (0x96, Stx, ZeroPageY), (0x8E, Stx, Absolute),
        (0x84, Sty, ZeroPage), (0x94, Sty, ZeroPageX), (0x8C, Sty, Absolute),

        (0xAA, Tax, Implicit), (0xA8, Tay, Implicit), (0xBA, Tsx, Implicit),
        (0x8A, Txa, Implicit), (0x9A, Txs, Implicit), (0x98, Tya, Implicit),
    ]
};

const fn build_table() -> [Option<OpcodeMetadata>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < DOCUMENTED.len() {
        let (opcode, mnemonic, mode) = DOCUMENTED[i];
        table[opcode as usize] = Some(OpcodeMetadata::new(mnemonic, mode));
        i += 1;
    }
    table
}

/// Complete 256-entry opcode table indexed by opcode byte value.
///
/// Read-only after compilation, so the engine thread and any tooling thread
/// can share it without locking.
pub static OPCODE_TABLE: [Option<OpcodeMetadata>; 256] = build_table();

/// Finds the opcode byte encoding `mnemonic` in `mode`, if the 6502 has one.
///
/// # Examples
///
/// ```
/// use sim6502::{find_opcode, AddressingMode, Mnemonic};
///
/// assert_eq!(find_opcode(Mnemonic::Sta, AddressingMode::Absolute), Some(0x8D));
/// assert_eq!(find_opcode(Mnemonic::Sta, AddressingMode::Immediate), None);
/// ```
pub fn find_opcode(mnemonic: Mnemonic, mode: AddressingMode) -> Option<u8> {
    DOCUMENTED
        .iter()
        .find(|(_, m, am)| *m == mnemonic && *am == mode)
        .map(|(opcode, _, _)| *opcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_opcode_count() {
        let mapped = OPCODE_TABLE.iter().filter(|m| m.is_some()).count();
        assert_eq!(mapped, 151);
    }

    #[test]
    fn test_no_duplicate_opcodes() {
        let mut seen = [false; 256];
        for (opcode, _, _) in DOCUMENTED.iter() {
            assert!(!seen[*opcode as usize], "opcode {:02X} listed twice", opcode);
            seen[*opcode as usize] = true;
        }
    }

    #[test]
    fn test_sizes_follow_addressing_mode() {
        let jmp_ind = OPCODE_TABLE[0x6C].unwrap();
        assert_eq!(jmp_ind.mnemonic, Mnemonic::Jmp);
        assert_eq!(jmp_ind.size_bytes, 3);

        let brk = OPCODE_TABLE[0x00].unwrap();
        assert_eq!(brk.size_bytes, 1);

        let bne = OPCODE_TABLE[0xD0].unwrap();
        assert_eq!(bne.addressing_mode, AddressingMode::Relative);
        assert_eq!(bne.size_bytes, 2);
    }

    #[test]
    fn test_mnemonic_parse_is_case_insensitive() {
        assert_eq!("lda".parse::<Mnemonic>(), Ok(Mnemonic::Lda));
        assert_eq!("TyA".parse::<Mnemonic>(), Ok(Mnemonic::Tya));
        assert!("XYZ".parse::<Mnemonic>().is_err());
    }

    #[test]
    fn test_find_opcode_round_trips_table() {
        for (index, entry) in OPCODE_TABLE.iter().enumerate() {
            if let Some(meta) = entry {
                assert_eq!(
                    find_opcode(meta.mnemonic, meta.addressing_mode),
                    Some(index as u8)
                );
            }
        }
    }
}
