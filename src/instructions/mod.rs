//! # 6502 Instruction Implementations
//!
//! This module contains the implementations of all 56 documented 6502
//! instructions, organized by category. Each instruction is a standalone
//! function taking the CPU and the addressing mode from the opcode table.
//! The opcode byte has already been fetched; each function consumes its own
//! operand bytes.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT)
//! - **branches**: Conditional branch instructions (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS)
//! - **shifts**: Shift and rotate operations (ASL, LSR, ROL, ROR)
//! - **load_store**: Load and store instructions (LDA, LDX, LDY, STA, STX, STY)
//! - **inc_dec**: Increment and decrement operations (INC, DEC, INX, INY, DEX, DEY)
//! - **control**: Control flow instructions (JMP, JSR, RTS, RTI, BRK, NOP)
//! - **stack**: Stack operations (PHA, PHP, PLA, PLP)
//! - **flags**: Status flag manipulation (CLC, SEC, CLI, SEI, CLD, SED, CLV)
//! - **transfer**: Register transfer operations (TAX, TAY, TXA, TYA, TSX, TXS)

pub mod alu;
pub mod branches;
pub mod control;
pub mod flags;
pub mod inc_dec;
pub mod load_store;
pub mod shifts;
pub mod stack;
pub mod transfer;

use crate::opcodes::{Mnemonic, OpcodeMetadata};
use crate::status::Status;
use crate::{MemoryBus, CPU};

/// Dispatches one decoded instruction.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut CPU<M>, metadata: OpcodeMetadata) {
    use Mnemonic::*;

    let mode = metadata.addressing_mode;
    match metadata.mnemonic {
        Adc => alu::execute_adc(cpu, mode),
        Sbc => alu::execute_sbc(cpu, mode),
        And => alu::execute_and(cpu, mode),
        Ora => alu::execute_ora(cpu, mode),
        Eor => alu::execute_eor(cpu, mode),
        Cmp => alu::execute_cmp(cpu, mode),
        Cpx => alu::execute_cpx(cpu, mode),
        Cpy => alu::execute_cpy(cpu, mode),
        Bit => alu::execute_bit(cpu, mode),

        Bcc => branches::execute_branch(cpu, Status::CARRY, false),
        Bcs => branches::execute_branch(cpu, Status::CARRY, true),
        Bne => branches::execute_branch(cpu, Status::ZERO, false),
        Beq => branches::execute_branch(cpu, Status::ZERO, true),
        Bpl => branches::execute_branch(cpu, Status::NEGATIVE, false),
        Bmi => branches::execute_branch(cpu, Status::NEGATIVE, true),
        Bvc => branches::execute_branch(cpu, Status::OVERFLOW, false),
        Bvs => branches::execute_branch(cpu, Status::OVERFLOW, true),

        Asl => shifts::execute_asl(cpu, mode),
        Lsr => shifts::execute_lsr(cpu, mode),
        Rol => shifts::execute_rol(cpu, mode),
        Ror => shifts::execute_ror(cpu, mode),

        Lda => load_store::execute_lda(cpu, mode),
        Ldx => load_store::execute_ldx(cpu, mode),
        Ldy => load_store::execute_ldy(cpu, mode),
        Sta => load_store::execute_sta(cpu, mode),
        Stx => load_store::execute_stx(cpu, mode),
        Sty => load_store::execute_sty(cpu, mode),

        Inc => inc_dec::execute_inc(cpu, mode),
        Dec => inc_dec::execute_dec(cpu, mode),
        Inx => inc_dec::execute_inx(cpu),
        Iny => inc_dec::execute_iny(cpu),
        Dex => inc_dec::execute_dex(cpu),
        Dey => inc_dec::execute_dey(cpu),

        Jmp => control::execute_jmp(cpu, mode),
        Jsr => control::execute_jsr(cpu),
        Rts => control::execute_rts(cpu),
        Rti => control::execute_rti(cpu),
        Brk => control::execute_brk(cpu),
        Nop => control::execute_nop(cpu),

        Pha => stack::execute_pha(cpu),
        Php => stack::execute_php(cpu),
        Pla => stack::execute_pla(cpu),
        Plp => stack::execute_plp(cpu),

        Clc => flags::execute_flag(cpu, Status::CARRY, false),
        Sec => flags::execute_flag(cpu, Status::CARRY, true),
        Cli => flags::execute_flag(cpu, Status::INTERRUPT_DISABLE, false),
        Sei => flags::execute_flag(cpu, Status::INTERRUPT_DISABLE, true),
        Cld => flags::execute_flag(cpu, Status::DECIMAL, false),
        Sed => flags::execute_flag(cpu, Status::DECIMAL, true),
        Clv => flags::execute_flag(cpu, Status::OVERFLOW, false),

        Tax => transfer::execute_tax(cpu),
        Tay => transfer::execute_tay(cpu),
        Txa => transfer::execute_txa(cpu),
        Tya => transfer::execute_tya(cpu),
        Tsx => transfer::execute_tsx(cpu),
        Txs => transfer::execute_txs(cpu),
    }
}
