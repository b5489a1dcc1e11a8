//! Formatting functions for disassembled instructions

use std::fmt::Write;

use crate::addressing::AddressingMode;
use crate::assembler::LabelTable;
use crate::disassembler::{DisassemblyOptions, Instruction};

/// Formats a single instruction as assembly text.
///
/// With a label table, absolute, zero-page and branch operands that match a
/// visible label print as the label name.
pub fn format_instruction(instr: &Instruction, labels: Option<&LabelTable>) -> String {
    let Some(mnemonic) = instr.mnemonic else {
        return format!(".byte ${:02X}", instr.opcode);
    };

    let operand = format_operand(instr, labels);
    if operand.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{} {}", mnemonic, operand)
    }
}

/// Formats a listing, one instruction per line, with label definitions on
/// their own lines.
///
/// ```text
/// loop:
/// 0202  CA        DEX
/// 0203  D0 FD     BNE loop
/// ```
///
/// The byte column appears only with `options.hex_dump`.
pub fn format_listing(
    instructions: &[Instruction],
    options: &DisassemblyOptions,
    labels: Option<&LabelTable>,
) -> String {
    let mut out = String::new();
    for instr in instructions {
        if let Some(name) = labels.and_then(|l| l.name_of(instr.address)) {
            let _ = writeln!(out, "{}:", name);
        }

        let _ = write!(out, "{:04X}  ", instr.address);
        if options.hex_dump {
            let bytes: Vec<String> = std::iter::once(instr.opcode)
                .chain(instr.operand_bytes.iter().copied())
                .map(|b| format!("{:02X}", b))
                .collect();
            let _ = write!(out, "{:<10}", bytes.join(" "));
        }
        let _ = writeln!(out, "{}", format_instruction(instr, labels));
    }
    out
}

/// Format the operand based on addressing mode
fn format_operand(instr: &Instruction, labels: Option<&LabelTable>) -> String {
    use AddressingMode::*;

    let name = |addr: u16| labels.and_then(|l| l.name_of(addr)).map(str::to_string);
    let label_or = |fallback: String| match instr.operand() {
        Some(value) => name(value).unwrap_or(fallback),
        None => "$??".to_string(),
    };
    let value = instr.operand().unwrap_or(0);

    match instr.addressing_mode {
        Implicit => String::new(),
        Accumulator => "A".to_string(),
        Immediate => format!("#${:02X}", value),
        ZeroPage => label_or(format!("${:02X}", value)),
        ZeroPageX => format!("{},X", label_or(format!("${:02X}", value))),
        ZeroPageY => format!("{},Y", label_or(format!("${:02X}", value))),
        Absolute => label_or(format!("${:04X}", value)),
        AbsoluteX => format!("{},X", label_or(format!("${:04X}", value))),
        AbsoluteY => format!("{},Y", label_or(format!("${:04X}", value))),
        Indirect => format!("({})", label_or(format!("${:04X}", value))),
        IndirectX => format!("({},X)", label_or(format!("${:02X}", value))),
        IndirectY => format!("({}),Y", label_or(format!("${:02X}", value))),
        Relative => match instr.branch_target() {
            Some(target) => name(target).unwrap_or_else(|| format!("${:04X}", target)),
            None => "$????".to_string(),
        },
    }
}
