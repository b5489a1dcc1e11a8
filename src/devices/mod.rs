//! Memory-mapped device support.
//!
//! This module provides the device-routing memory bus. Hardware components
//! (RAM, ROM, or any user-defined peripheral) are installed over a range of
//! the 64K address space and the bus forwards every access to the device that
//! owns the address.
//!
//! # Architecture
//!
//! - **Device trait**: Interface for memory-mapped components. A device knows
//!   its own base address and size.
//! - **MappedMemory**: An arena of installed devices plus a 65,536-entry
//!   redirection table holding, for every address, the index of its owner.
//! - **Device implementations**: [`RamDevice`] and [`RomDevice`].
//!
//! Installing a device over addresses that are already owned transfers
//! ownership of those addresses to the new device. The previous owner simply
//! stops being reachable there; a warning is logged but nothing fails.
//!
//! # Example
//!
//! ```rust
//! use sim6502::{Device, MappedMemory, MemoryBus, RamDevice, RomDevice};
//! use std::sync::Arc;
//!
//! let mut memory = MappedMemory::new();
//!
//! // 16KB RAM at 0x0000-0x3FFF
//! let ram = Arc::new(RamDevice::new(0x0000, 0x4000));
//! memory.install(Arc::clone(&ram));
//!
//! // 16KB ROM at 0xC000-0xFFFF
//! memory.install(Arc::new(RomDevice::new(0xC000, vec![0xEA; 0x4000])));
//!
//! memory.write(0x0010, 0x42);
//! memory.write(0xC000, 0x42); // dropped, ROM
//!
//! assert_eq!(ram.read(0x0010), 0x42);
//! assert_eq!(memory.read(0xC000), 0xEA);
//! assert_eq!(memory.read(0x8000), 0x00); // unowned
//! ```

use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::MemoryBus;

pub mod ram;
pub mod rom;

pub use ram::RamDevice;
pub use rom::RomDevice;

/// Size of the 6502 address space.
pub const ADDRESS_SPACE: u32 = 0x1_0000;

/// Interface for memory-mapped hardware devices.
///
/// The bus calls `read`/`write` with an offset relative to
/// [`base_address`](Device::base_address), in the range `0..size()`.
///
/// Both `read` and `write` take `&self`: the bus keeps a shared handle to the
/// device, and a debugger thread may inspect a device while the engine thread
/// writes to it. Implementations use interior mutability that is safe for a
/// single writer with concurrent readers. Devices may perform side effects in
/// `write` (rendering, asserting an interrupt line).
///
/// # Examples
///
/// ```rust
/// use sim6502::Device;
/// use std::sync::atomic::{AtomicU8, Ordering};
///
/// /// A one-byte latch at a fixed address.
/// struct Latch(AtomicU8);
///
/// impl Device for Latch {
///     fn base_address(&self) -> u16 {
///         0xD000
///     }
///
///     fn size(&self) -> u32 {
///         1
///     }
///
///     fn read(&self, _offset: u16) -> u8 {
///         self.0.load(Ordering::Relaxed)
///     }
///
///     fn write(&self, _offset: u16, value: u8) {
///         self.0.store(value, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Device: Send + Sync {
    /// Whether the bus may read from this device.
    fn can_read(&self) -> bool {
        true
    }

    /// Whether the bus may write to this device.
    fn can_write(&self) -> bool {
        true
    }

    /// First address owned by the device.
    fn base_address(&self) -> u16;

    /// Number of addresses owned by the device.
    fn size(&self) -> u32;

    /// Reads the byte at `offset` (relative to the base address).
    fn read(&self, offset: u16) -> u8;

    /// Writes `value` at `offset` (relative to the base address).
    fn write(&self, offset: u16, value: u8);
}

/// Index of an installed device in a [`MappedMemory`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(u16);

impl DeviceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Memory bus that routes every address to the device that owns it.
///
/// Addresses with no owner read as 0 and discard writes. Every write,
/// owned or not, moves the low/high write watermark.
pub struct MappedMemory {
    devices: Vec<Arc<dyn Device>>,
    owners: Box<[Option<DeviceId>]>,
    watermark: Option<(u16, u16)>,
}

impl MappedMemory {
    /// Creates a bus with no devices installed.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            owners: vec![None; ADDRESS_SPACE as usize].into_boxed_slice(),
            watermark: None,
        }
    }

    /// Installs `device` over its declared address range.
    ///
    /// Every address in `base_address..base_address + size` is routed to the
    /// new device, replacing any earlier owner.
    ///
    /// # Panics
    ///
    /// Panics if the device range extends past 0xFFFF. That is an integration
    /// error in the machine definition, not a runtime condition.
    pub fn install<D: Device + 'static>(&mut self, device: Arc<D>) -> DeviceId {
        let base = device.base_address() as u32;
        let size = device.size();
        assert!(
            base + size <= ADDRESS_SPACE,
            "device at 0x{:04X} with size 0x{:X} extends past the end of the address space",
            base,
            size
        );
        assert!(self.devices.len() < u16::MAX as usize, "too many devices installed");

        let id = DeviceId(self.devices.len() as u16);
        let range = base as usize..(base + size) as usize;

        let overridden = self.owners[range.clone()].iter().filter(|o| o.is_some()).count();
        if overridden > 0 {
            warn!(
                base = format_args!("0x{:04X}", base),
                size,
                overridden,
                "device installation overrides existing owners"
            );
        }

        for owner in &mut self.owners[range] {
            *owner = Some(id);
        }
        self.devices.push(device);
        debug!(id = id.0, base = format_args!("0x{:04X}", base), size, "device installed");
        id
    }

    /// Returns the device installed under `id`.
    pub fn device(&self, id: DeviceId) -> Option<&Arc<dyn Device>> {
        self.devices.get(id.index())
    }

    /// Returns the id of the device that currently owns `addr`.
    pub fn owner_of(&self, addr: u16) -> Option<DeviceId> {
        self.owners[addr as usize]
    }

    /// Lowest and highest address written so far, if any write happened.
    pub fn write_range(&self) -> Option<RangeInclusive<u16>> {
        self.watermark.map(|(lo, hi)| lo..=hi)
    }

    /// Forgets the recorded write range.
    pub fn reset_watermark(&mut self) {
        self.watermark = None;
    }

    fn route(&self, addr: u16) -> Option<(&dyn Device, u16)> {
        let id = self.owners[addr as usize]?;
        let device = self.devices[id.index()].as_ref();
        Some((device, addr - device.base_address()))
    }
}

impl Default for MappedMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for MappedMemory {
    fn read(&self, addr: u16) -> u8 {
        match self.route(addr) {
            Some((device, offset)) if device.can_read() => device.read(offset),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.watermark = Some(match self.watermark {
            Some((lo, hi)) => (lo.min(addr), hi.max(addr)),
            None => (addr, addr),
        });

        if let Some((device, offset)) = self.route(addr) {
            if device.can_write() {
                device.write(offset, value);
            }
        }
    }
}
