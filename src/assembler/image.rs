//! Binary image format.
//!
//! An image is a 4-byte header followed by the payload:
//!
//! ```text
//! +--------+--------+--------+--------+------------------+
//! | addr lo| addr hi| len lo | len hi | len payload bytes|
//! +--------+--------+--------+--------+------------------+
//! ```
//!
//! Reading and writing image files is left to the caller; this module only
//! converts between bytes and [`BinaryImage`].

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::MemoryBus;

const HEADER_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image is {0} bytes, shorter than the 4-byte header")]
    MissingHeader(usize),

    #[error("header declares {declared} payload bytes but {actual} follow")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("{len} bytes at ${address:04X} run past the end of the address space")]
    OutOfBounds { address: u16, len: usize },
}

/// A block of bytes and the address it loads at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    pub address: u16,
    pub bytes: Vec<u8>,
}

impl BinaryImage {
    /// Creates an image, checking that it fits the header and address space.
    pub fn new(address: u16, bytes: Vec<u8>) -> Result<Self, ImageError> {
        check_bounds(address, bytes.len())?;
        Ok(Self { address, bytes })
    }

    /// Decodes header and payload.
    pub fn parse(data: &[u8]) -> Result<Self, ImageError> {
        if data.len() < HEADER_LEN {
            return Err(ImageError::MissingHeader(data.len()));
        }
        let address = u16::from_le_bytes([data[0], data[1]]);
        let declared = u16::from_le_bytes([data[2], data[3]]) as usize;
        let payload = &data[HEADER_LEN..];
        if payload.len() != declared {
            return Err(ImageError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }
        Self::new(address, payload.to_vec())
    }

    /// Copies `range` out of a bus, typically the bus's write watermark.
    pub fn capture<M: MemoryBus + ?Sized>(
        bus: &M,
        range: RangeInclusive<u16>,
    ) -> Result<Self, ImageError> {
        let address = *range.start();
        let bytes: Vec<u8> = range.map(|addr| bus.read(addr)).collect();
        Self::new(address, bytes)
    }

    /// Moves the image to load at `address`.
    pub fn relocated(self, address: u16) -> Result<Self, ImageError> {
        Self::new(address, self.bytes)
    }

    /// Encodes header and payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(HEADER_LEN + self.bytes.len());
        data.extend_from_slice(&self.address.to_le_bytes());
        data.extend_from_slice(&(self.bytes.len() as u16).to_le_bytes());
        data.extend_from_slice(&self.bytes);
        data
    }

    /// Addresses covered by the payload, or `None` when it is empty.
    pub fn range(&self) -> Option<RangeInclusive<u16>> {
        let last = self.bytes.len().checked_sub(1)?;
        Some(self.address..=self.address + last as u16)
    }
}

/// Encodes `bytes` as an image loading at `address`.
pub fn encode_image(address: u16, bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    check_bounds(address, bytes.len())?;
    Ok(BinaryImage {
        address,
        bytes: bytes.to_vec(),
    }
    .encode())
}

fn check_bounds(address: u16, len: usize) -> Result<(), ImageError> {
    if len > u16::MAX as usize || address as usize + len > 0x1_0000 {
        return Err(ImageError::OutOfBounds { address, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatMemory;

    #[test]
    fn test_header_layout() {
        let data = encode_image(0x0200, &[0xA9, 0x01, 0x00]).unwrap();
        assert_eq!(data, vec![0x00, 0x02, 0x03, 0x00, 0xA9, 0x01, 0x00]);

        let image = BinaryImage::parse(&data).unwrap();
        assert_eq!(image.address, 0x0200);
        assert_eq!(image.range(), Some(0x0200..=0x0202));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(BinaryImage::parse(&[0x00, 0x02]), Err(ImageError::MissingHeader(2)));
        assert_eq!(
            BinaryImage::parse(&[0x00, 0x02, 0x05, 0x00, 0xEA]),
            Err(ImageError::LengthMismatch {
                declared: 5,
                actual: 1
            })
        );
        assert!(matches!(
            BinaryImage::parse(&[0xFF, 0xFF, 0x02, 0x00, 0xEA, 0xEA]),
            Err(ImageError::OutOfBounds { address: 0xFFFF, len: 2 })
        ));
    }

    #[test]
    fn test_empty_image_has_no_range() {
        let image = BinaryImage::parse(&[0x00, 0x10, 0x00, 0x00]).unwrap();
        assert!(image.bytes.is_empty());
        assert_eq!(image.range(), None);
    }

    #[test]
    fn test_capture_from_bus() {
        let mut mem = FlatMemory::new();
        mem.write(0x0300, 0x11);
        mem.write(0x0301, 0x22);

        let image = BinaryImage::capture(&mem, 0x0300..=0x0301).unwrap();
        assert_eq!(image.bytes, vec![0x11, 0x22]);
        assert_eq!(image.encode()[..4], [0x00, 0x03, 0x02, 0x00]);
    }
}
