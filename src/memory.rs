//! # Memory Bus Abstraction
//!
//! The `MemoryBus` trait decouples the CPU from the memory implementation.
//! Two implementations ship with the crate:
//!
//! - [`FlatMemory`]: 64KB of plain RAM, handy for tests
//! - [`MappedMemory`](crate::MappedMemory): a device-routing bus where every
//!   address is owned by at most one installed device
//!
//! ## Design Principles
//!
//! The bus follows 6502 hardware behavior: there are no bus errors. Reads
//! and writes always succeed, unmapped reads yield a fixed value and writes
//! to read-only or unmapped regions are dropped.

/// Memory bus trait for CPU to read/write bytes.
///
/// # Examples
///
/// ```
/// use sim6502::{MemoryBus, FlatMemory};
///
/// let mut mem = FlatMemory::new();
///
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
///
/// // Words are little-endian
/// mem.write_word(0xFFFC, 0x8000);
/// assert_eq!(mem.read(0xFFFC), 0x00);
/// assert_eq!(mem.read(0xFFFD), 0x80);
/// assert_eq!(mem.read_word(0xFFFC), 0x8000);
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    ///
    /// Must never panic for any address.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    ///
    /// Must never panic for any address. Writes to read-only or unmapped
    /// locations are ignored.
    fn write(&mut self, addr: u16, value: u8);

    /// Reads a little-endian word: low byte at `addr`, high byte at `addr + 1`.
    fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Writes a little-endian word: low byte at `addr`, high byte at `addr + 1`.
    fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }
}

/// Simple 64KB flat memory implementation.
///
/// All 65536 addresses are mapped to a single contiguous RAM array
/// initialized to zero.
pub struct FlatMemory {
    data: Box<[u8; 65536]>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 65536]),
        }
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_memory_read_write() {
        let mut mem = FlatMemory::new();

        assert_eq!(mem.read(0x0000), 0x00);
        assert_eq!(mem.read(0xFFFF), 0x00);

        mem.write(0x1234, 0x42);
        assert_eq!(mem.read(0x1234), 0x42);

        assert_eq!(mem.read(0x1233), 0x00);
        assert_eq!(mem.read(0x1235), 0x00);
    }

    #[test]
    fn test_word_access_wraps_at_top_of_memory() {
        let mut mem = FlatMemory::new();

        mem.write_word(0xFFFF, 0xBEEF);
        assert_eq!(mem.read(0xFFFF), 0xEF);
        assert_eq!(mem.read(0x0000), 0xBE);
        assert_eq!(mem.read_word(0xFFFF), 0xBEEF);
    }
}
