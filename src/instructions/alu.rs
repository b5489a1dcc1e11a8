//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC, SBC: binary add/subtract with carry
//! - AND, ORA, EOR: bitwise logic on the accumulator
//! - CMP, CPX, CPY: register comparison
//! - BIT: bit test
//!
//! Decimal mode is not emulated: the D flag can be set and cleared but ADC
//! and SBC always perform binary arithmetic.

use crate::status::Status;
use crate::{AddressingMode, MemoryBus, CPU};

/// Executes the ADC (Add with Carry) instruction.
///
/// A = A + M + C. Carry is set on unsigned overflow past 0xFF; Overflow is
/// set when both operands share a sign bit and the result's sign differs.
pub(crate) fn execute_adc<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    add_with_carry(cpu, value);
}

/// Executes the SBC (Subtract with Carry) instruction.
///
/// A = A - M - (1 - C), computed as ADC of the operand's one's complement.
/// Carry clear afterwards means a borrow occurred.
pub(crate) fn execute_sbc<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    add_with_carry(cpu, !value);
}

fn add_with_carry<M: MemoryBus>(cpu: &mut CPU<M>, value: u8) {
    let a = cpu.a;
    let sum = a as u16 + value as u16 + cpu.flag(Status::CARRY) as u16;
    let result = sum as u8;

    cpu.set_flag(Status::CARRY, sum > 0xFF);
    // V = (A^result) & (M^result) & 0x80
    cpu.set_flag(Status::OVERFLOW, (a ^ result) & (value ^ result) & 0x80 != 0);
    cpu.set_a(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_and<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.a & cpu.operand_value(mode);
    cpu.set_a(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_ora<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.a | cpu.operand_value(mode);
    cpu.set_a(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_eor<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let result = cpu.a ^ cpu.operand_value(mode);
    cpu.set_a(result);
    cpu.update_zn(result);
}

pub(crate) fn execute_cmp<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    let register = cpu.a;
    compare(cpu, register, value);
}

pub(crate) fn execute_cpx<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    let register = cpu.x;
    compare(cpu, register, value);
}

pub(crate) fn execute_cpy<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    let register = cpu.y;
    compare(cpu, register, value);
}

/// Compares `register` against `operand`.
///
/// - equal: Z and C set, N clear
/// - operand greater: C clear, N copies bit 7 of the operand
/// - operand smaller: C set, N copies bit 7 of the operand
fn compare<M: MemoryBus>(cpu: &mut CPU<M>, register: u8, operand: u8) {
    let equal = register == operand;
    cpu.set_flag(Status::ZERO, equal);
    cpu.set_flag(Status::CARRY, register >= operand);
    cpu.set_flag(Status::NEGATIVE, !equal && operand & 0x80 != 0);
}

/// Executes the BIT (Bit Test) instruction.
///
/// Z reflects `A & M`; N and V are copied from bits 7 and 6 of the operand.
/// The accumulator is unchanged.
pub(crate) fn execute_bit<M: MemoryBus>(cpu: &mut CPU<M>, mode: AddressingMode) {
    let value = cpu.operand_value(mode);
    cpu.set_flag(Status::ZERO, cpu.a & value == 0);
    cpu.set_flag(Status::NEGATIVE, value & 0x80 != 0);
    cpu.set_flag(Status::OVERFLOW, value & 0x40 != 0);
}
