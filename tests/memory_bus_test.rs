//! Integration tests for the device-routing memory bus.

use std::sync::Arc;

use sim6502::{
    Device, FlatMemory, HaltReason, MappedMemory, MemoryBus, RamDevice, RomDevice, RunOptions,
    StopReason, CPU,
};

#[test]
fn test_flat_memory_word_access_wraps() {
    let mut mem = FlatMemory::new();
    mem.write_word(0xFFFF, 0xBEEF);

    assert_eq!(mem.read(0xFFFF), 0xEF);
    assert_eq!(mem.read(0x0000), 0xBE);
    assert_eq!(mem.read_word(0xFFFF), 0xBEEF);
}

#[test]
fn test_unowned_addresses_read_zero_and_drop_writes() {
    let mut bus = MappedMemory::new();
    bus.install(Arc::new(RamDevice::new(0x0000, 0x0100)));

    bus.write(0x4000, 0x55);

    assert_eq!(bus.read(0x4000), 0x00);
    assert_eq!(bus.owner_of(0x4000), None);
}

#[test]
fn test_ram_and_rom_regions() {
    let mut bus = MappedMemory::new();
    let ram = Arc::new(RamDevice::new(0x0000, 0x8000));
    let rom = Arc::new(RomDevice::new(0xF000, vec![0xEA; 0x1000]));
    let ram_id = bus.install(Arc::clone(&ram));
    let rom_id = bus.install(Arc::clone(&rom));

    bus.write(0x1234, 0x42);
    bus.write(0xF010, 0x42);

    assert_eq!(bus.read(0x1234), 0x42);
    assert_eq!(ram.read(0x1234), 0x42);
    assert_eq!(bus.read(0xF010), 0xEA);
    assert_eq!(bus.owner_of(0x7FFF), Some(ram_id));
    assert_eq!(bus.owner_of(0xFFFF), Some(rom_id));
    assert_eq!(bus.device(rom_id).map(|d| d.size()), Some(0x1000));

    rom.set_burn(true);
    bus.write(0xF010, 0x42);
    rom.set_burn(false);
    bus.write(0xF010, 0x00);

    assert_eq!(bus.read(0xF010), 0x42);
}

#[test]
fn test_later_install_owns_overlap() {
    let mut bus = MappedMemory::new();
    let low = Arc::new(RamDevice::new(0x0000, 0x1000));
    let window = Arc::new(RamDevice::new(0x0800, 0x0100));
    let low_id = bus.install(Arc::clone(&low));
    let window_id = bus.install(Arc::clone(&window));

    bus.write(0x0810, 0x77);

    assert_eq!(bus.owner_of(0x07FF), Some(low_id));
    assert_eq!(bus.owner_of(0x0800), Some(window_id));
    assert_eq!(bus.owner_of(0x0900), Some(low_id));
    assert_eq!(window.read(0x0010), 0x77);
    assert_eq!(low.read(0x0810), 0x00);
}

#[test]
fn test_write_watermark() {
    let mut bus = MappedMemory::new();
    bus.install(Arc::new(RamDevice::new(0x0000, 0x1000)));
    assert_eq!(bus.write_range(), None);

    bus.write(0x0300, 1);
    bus.write(0x0120, 2);
    bus.write(0xC000, 3); // unowned writes still count
    assert_eq!(bus.write_range(), Some(0x0120..=0xC000));

    bus.reset_watermark();
    assert_eq!(bus.write_range(), None);
}

#[test]
fn test_cpu_boots_from_rom() {
    let mut image = vec![0xEA; 0x1000];
    // $F000: LDA #$21; STA $0200; BRK
    image[..6].copy_from_slice(&[0xA9, 0x21, 0x8D, 0x00, 0x02, 0x00]);
    image[0x0FFC] = 0x00;
    image[0x0FFD] = 0xF0;

    let mut bus = MappedMemory::new();
    let ram = Arc::new(RamDevice::new(0x0000, 0x8000));
    bus.install(Arc::clone(&ram));
    bus.install(Arc::new(RomDevice::new(0xF000, image)));

    let mut cpu = CPU::new(bus);
    assert_eq!(cpu.pc(), 0xF000);

    let outcome = cpu.run(RunOptions::default());

    assert_eq!(outcome, Ok(StopReason::Halted(HaltReason::Break)));
    assert_eq!(ram.read(0x0200), 0x21);
    assert_eq!(cpu.memory().write_range(), Some(0x0200..=0x0200));
}

#[test]
#[should_panic(expected = "extends past the end of the address space")]
fn test_device_past_end_of_address_space_panics() {
    let mut bus = MappedMemory::new();
    bus.install(Arc::new(RamDevice::new(0xFF00, 0x0200)));
}
