//! ROM device implementation.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::{Device, ADDRESS_SPACE};

/// Read-only memory with an optional burn mode.
///
/// Writes are ignored while burn mode is off, matching real ROM. Enabling
/// burn mode turns the device writable so a loader can place a program image
/// into it; disabling it makes the contents read-only again.
///
/// # Examples
///
/// ```rust
/// use sim6502::{Device, RomDevice};
///
/// let rom = RomDevice::new(0xF000, vec![0xEA; 16]);
///
/// rom.write(0, 0xFF);
/// assert_eq!(rom.read(0), 0xEA);
///
/// rom.set_burn(true);
/// rom.write(0, 0xFF);
/// assert_eq!(rom.read(0), 0xFF);
/// ```
pub struct RomDevice {
    base: u16,
    data: Box<[AtomicU8]>,
    burn: AtomicBool,
}

impl RomDevice {
    /// Creates a ROM at `base` holding `data`.
    pub fn new(base: u16, data: Vec<u8>) -> Self {
        assert!(data.len() as u32 <= ADDRESS_SPACE, "ROM larger than the address space");
        Self {
            base,
            data: data.into_iter().map(AtomicU8::new).collect(),
            burn: AtomicBool::new(false),
        }
    }

    /// Creates a zero-filled ROM of `size` bytes, usually burned afterwards.
    pub fn blank(base: u16, size: u32) -> Self {
        Self::new(base, vec![0; size as usize])
    }

    /// Enables or disables burn mode.
    pub fn set_burn(&self, enabled: bool) {
        self.burn.store(enabled, Ordering::Release);
    }

    /// Returns true while burn mode is enabled.
    pub fn burning(&self) -> bool {
        self.burn.load(Ordering::Acquire)
    }
}

impl Device for RomDevice {
    fn can_write(&self) -> bool {
        self.burning()
    }

    fn base_address(&self) -> u16 {
        self.base
    }

    fn size(&self) -> u32 {
        self.data.len() as u32
    }

    fn read(&self, offset: u16) -> u8 {
        self.data[offset as usize].load(Ordering::Relaxed)
    }

    fn write(&self, offset: u16, value: u8) {
        if self.burning() {
            self.data[offset as usize].store(value, Ordering::Relaxed);
        }
    }
}
