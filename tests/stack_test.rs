//! Tests for PHA, PLA, PHP, PLP and the stack limits.
//!
//! The stack lives in page one and grows downward from SP = $FF. Pushing
//! with SP at $00 or pulling with SP at $FF halts the CPU.

use sim6502::{FlatMemory, HaltReason, MemoryBus, RunOptions, StopReason, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

fn load_program(cpu: &mut CPU<FlatMemory>, program: &[u8]) {
    for (i, &byte) in program.iter().enumerate() {
        cpu.memory_mut().write(0x8000 + i as u16, byte);
    }
}

#[test]
fn test_pha_pla() {
    let mut cpu = setup_cpu();
    load_program(&mut cpu, &[0x48, 0xA9, 0x00, 0x68]); // PHA; LDA #0; PLA
    cpu.set_a(0x9C);

    cpu.step();
    assert_eq!(cpu.sp(), 0xFE);
    assert_eq!(cpu.memory().read(0x01FF), 0x9C);

    cpu.step();
    cpu.step();
    assert_eq!(cpu.a(), 0x9C);
    assert_eq!(cpu.sp(), 0xFF);
    assert!(cpu.flag_n());
    assert!(!cpu.flag_z());
}

#[test]
fn test_stack_is_lifo() {
    let mut cpu = setup_cpu();
    let values: Vec<u8> = (1..=100).collect();

    let mut program = Vec::new();
    for &value in &values {
        program.extend_from_slice(&[0xA9, value, 0x48]); // LDA #v; PHA
    }
    for i in 0..values.len() {
        program.extend_from_slice(&[0x68, 0x85, i as u8]); // PLA; STA i
    }
    program.push(0x00);
    load_program(&mut cpu, &program);

    let outcome = cpu.run(RunOptions::default());
    assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::Break)));

    for (i, &value) in values.iter().rev().enumerate() {
        assert_eq!(cpu.memory().read(i as u16), value);
    }
    assert_eq!(cpu.sp(), 0xFF);
}

#[test]
fn test_php_sets_break_and_bit5_in_pushed_copy() {
    let mut cpu = setup_cpu();
    load_program(&mut cpu, &[0x08]);
    cpu.set_status(0x00);
    cpu.set_flag_c(true);

    cpu.step();

    assert_eq!(cpu.memory().read(0x01FF), 0b0011_0001);
    assert!(!cpu.flag_b());
}

#[test]
fn test_plp_ignores_break_and_bit5() {
    let mut cpu = setup_cpu();
    load_program(&mut cpu, &[0xA9, 0xFF, 0x48, 0x28]); // LDA #$FF; PHA; PLP

    cpu.step();
    cpu.step();
    cpu.step();

    assert_eq!(cpu.status(), 0xEF);
    assert!(!cpu.flag_b());
    assert!(!cpu.is_halted());
}

#[test]
fn test_pull_from_empty_stack_underflows() {
    let mut cpu = setup_cpu();
    load_program(&mut cpu, &[0x68, 0xEA]); // PLA; NOP

    let outcome = cpu.run(RunOptions::default());

    assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::StackUnderflow)));
    assert_eq!(cpu.halt_reason(), HaltReason::StackUnderflow);
    assert!(cpu.flag_b());
    assert_eq!(cpu.pc(), 0x8001);
}

#[test]
fn test_push_past_bottom_overflows() {
    let mut cpu = setup_cpu();
    // loop: PHA; JMP loop
    load_program(&mut cpu, &[0x48, 0x4C, 0x00, 0x80]);

    let outcome = cpu.run(RunOptions::default());

    assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::StackOverflow)));
    assert_eq!(cpu.sp(), 0x00);
    // 255 pushes fit, the 256th wrote slot $0100 and halted
    assert_eq!(cpu.instruction_count(), 2 * 255 + 1);
}
