//! RAM device implementation.

use std::sync::atomic::{AtomicU8, Ordering};

use super::{Device, ADDRESS_SPACE};

/// Readable and writable memory.
///
/// Bytes are stored as atomic cells, so a debugger thread can read a RAM
/// region through its own `Arc<RamDevice>` while the engine thread writes to
/// it through the bus.
///
/// # Examples
///
/// ```rust
/// use sim6502::{Device, RamDevice};
///
/// let ram = RamDevice::new(0x0200, 1024);
///
/// ram.write(0x42, 0xAA);
/// assert_eq!(ram.read(0x42), 0xAA);
/// assert_eq!(ram.base_address(), 0x0200);
/// ```
pub struct RamDevice {
    base: u16,
    data: Box<[AtomicU8]>,
}

impl RamDevice {
    /// Creates a zero-filled RAM region of `size` bytes starting at `base`.
    pub fn new(base: u16, size: u32) -> Self {
        assert!(size <= ADDRESS_SPACE, "RAM larger than the address space");
        Self {
            base,
            data: (0..size).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// Copies `bytes` into RAM starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + bytes.len()` exceeds the device size.
    pub fn load_bytes(&self, offset: u16, bytes: &[u8]) {
        let start = offset as usize;
        let end = start + bytes.len();
        assert!(end <= self.data.len(), "load past end of RAM");
        for (cell, byte) in self.data[start..end].iter().zip(bytes) {
            cell.store(*byte, Ordering::Relaxed);
        }
    }

    /// Copies the current contents out.
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

impl Device for RamDevice {
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
        self.data[offset as usize].store(value, Ordering::Relaxed);
    }
}
