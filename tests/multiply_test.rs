//! Exhaustive check of an 8x8 shift-and-add multiply routine.
//!
//! The routine is placed with the loader and run once for every pair of
//! operands; the 16-bit product must match native multiplication.

use sim6502::{
    AddressingMode::*, FlatMemory, HaltReason, LabelTable, Loader, MemoryBus, Mnemonic::*,
    RunOptions, StopReason, CPU,
};

const NUM1: u16 = 0x0010;
const NUM2: u16 = 0x0011;
const PRODUCT_HI: u16 = 0x0012;
const ROUTINE: u16 = 0x0200;

fn load_multiply() -> CPU<FlatMemory> {
    let mut mem = FlatMemory::new();
    let mut labels = LabelTable::new();
    {
        let mut loader = Loader::new(&mut mem, &mut labels);
        loader.from(NUM1).label("num1");
        loader.from(NUM2).label("num2");
        loader.from(PRODUCT_HI).label("hi");
        loader.from(0xFFFC).ref_word("multiply");

        loader.from(ROUTINE).label("multiply");
        loader.ins(Lda, Immediate).write(0x00);
        loader.ins(Ldx, Immediate).write(0x08);
        loader.ins(Lsr, ZeroPage).ref_byte("num1");
        loader.label("loop");
        loader.ins(Bcc, Relative).relative_ref("skip");
        loader.ins(Clc, Implicit);
        loader.ins(Adc, ZeroPage).ref_byte("num2");
        loader.label("skip");
        loader.ins(Ror, Accumulator);
        loader.ins(Ror, ZeroPage).ref_byte("num1");
        loader.ins(Dex, Implicit);
        loader.ins(Bne, Relative).relative_ref("loop");
        loader.ins(Sta, ZeroPage).ref_byte("hi");
        loader.ins(Brk, Implicit);
        loader.fixup().unwrap();
    }
    CPU::new(mem)
}

fn multiply(cpu: &mut CPU<FlatMemory>, a: u8, b: u8) -> u16 {
    cpu.memory_mut().write(NUM1, a);
    cpu.memory_mut().write(NUM2, b);
    cpu.set_pc(ROUTINE);

    let outcome = cpu.run(RunOptions::default());
    assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::Break)));

    u16::from_le_bytes([cpu.memory().read(NUM1), cpu.memory().read(PRODUCT_HI)])
}

#[test]
fn test_multiply_examples() {
    let mut cpu = load_multiply();

    assert_eq!(multiply(&mut cpu, 0, 0), 0);
    assert_eq!(multiply(&mut cpu, 1, 1), 1);
    assert_eq!(multiply(&mut cpu, 12, 10), 120);
    assert_eq!(multiply(&mut cpu, 0xFF, 0xFF), 0xFE01);
    assert_eq!(cpu.sp(), 0xFF);
}

#[test]
fn test_multiply_all_operand_pairs() {
    let mut cpu = load_multiply();

    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            assert_eq!(
                multiply(&mut cpu, a, b),
                a as u16 * b as u16,
                "{} * {}",
                a,
                b
            );
        }
    }
    assert_eq!(cpu.invalid_opcode_count(), 0);
}
