//! Tests for ASL, LSR, ROL and ROR on the accumulator and memory.

use sim6502::{FlatMemory, MemoryBus, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

fn accumulator_op(opcode: u8, a: u8, carry: bool) -> CPU<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, opcode);
    cpu.set_a(a);
    cpu.set_flag_c(carry);
    cpu.step();
    cpu
}

// ========== ASL ==========

#[test]
fn test_asl_accumulator_carry_out() {
    let cpu = accumulator_op(0x0A, 0x81, false);

    assert_eq!(cpu.a(), 0x02);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
    assert_eq!(cpu.pc(), 0x8001);
}

#[test]
fn test_asl_zero_page() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x0040, 0x40);
    cpu.memory_mut().write(0x8000, 0x06);
    cpu.memory_mut().write(0x8001, 0x40);

    cpu.step();

    assert_eq!(cpu.memory().read(0x0040), 0x80);
    assert!(cpu.flag_n());
    assert!(!cpu.flag_c());
    assert_eq!(cpu.a(), 0x00);
}

// ========== LSR ==========

#[test]
fn test_lsr_accumulator_to_zero() {
    let cpu = accumulator_op(0x4A, 0x01, false);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_lsr_absolute_x() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x2005, 0xFE);
    cpu.memory_mut().write(0x8000, 0x5E);
    cpu.memory_mut().write_word(0x8001, 0x2000);
    cpu.set_x(0x05);

    cpu.step();

    assert_eq!(cpu.memory().read(0x2005), 0x7F);
    assert!(!cpu.flag_c());
}

// ========== ROL ==========

#[test]
fn test_rol_shifts_carry_in() {
    let cpu = accumulator_op(0x2A, 0x80, true);

    assert_eq!(cpu.a(), 0x01);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_z());
}

#[test]
fn test_rol_memory_without_carry() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x0010, 0x40);
    cpu.memory_mut().write(0x8000, 0x26);
    cpu.memory_mut().write(0x8001, 0x10);

    cpu.step();

    assert_eq!(cpu.memory().read(0x0010), 0x80);
    assert!(cpu.flag_n());
}

// ========== ROR ==========

#[test]
fn test_ror_shifts_carry_into_bit7() {
    let cpu = accumulator_op(0x6A, 0x02, true);

    assert_eq!(cpu.a(), 0x81);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

#[test]
fn test_ror_carry_out() {
    let cpu = accumulator_op(0x6A, 0x01, false);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
}
