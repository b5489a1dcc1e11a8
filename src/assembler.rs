//! 6502 Loader Module
//!
//! Places machine code on a [`MemoryBus`](crate::MemoryBus) through a
//! cursor-based [`Loader`]. Operands may refer to labels that are defined
//! later; each such reference writes a placeholder and is patched by
//! [`Loader::fixup`] once every label is known.
//!
//! Label references are strings of the form `name[+N|-N][:LO|:HI]`:
//!
//! - `table+2` resolves to two bytes past `table`
//! - `vector-$10` and `vector-0x10` take hex offsets
//! - `handler:LO` and `handler:HI` select one byte of the address
//!
//! Errors never stop a load early. They accumulate and `fixup()` reports all
//! of them at once.

pub mod image;
pub mod labels;
pub mod loader;
pub mod reference;

use thiserror::Error;

use crate::addressing::AddressingMode;
use crate::opcodes::Mnemonic;

pub use image::{encode_image, BinaryImage, ImageError};
pub use labels::LabelTable;
pub use loader::Loader;
pub use reference::{ByteSelect, LabelRef};

/// Label definition and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label `{name}` already defined at ${existing:04X} in this scope")]
    Duplicate { name: String, existing: u16 },

    #[error("malformed label reference `{0}`")]
    Malformed(String),
}

/// A single problem found while loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixupError {
    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("unresolved label `{label}` referenced at ${at:04X}")]
    Unresolved { label: String, at: u16 },

    #[error("branch to `{label}` at ${at:04X} out of range (distance {distance})")]
    RelativeOutOfRange { label: String, at: u16, distance: i32 },

    #[error("byte reference to `{label}` at ${at:04X} out of range (value {value})")]
    ByteOutOfRange { label: String, at: u16, value: i32 },

    #[error("word reference to `{label}` at ${at:04X} out of range (value {value})")]
    WordOutOfRange { label: String, at: u16, value: i32 },

    #[error("reference to `{label}` at ${at:04X} was replaced by a later reference")]
    Overwritten { label: String, at: u16 },

    #[error("no opcode for {mnemonic} with {mode:?} addressing at ${at:04X}")]
    UnknownInstruction {
        mnemonic: Mnemonic,
        mode: AddressingMode,
        at: u16,
    },
}

/// Every error found by a failed [`Loader::fixup`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("load failed with {} error(s): {}", .errors.len(), join(.errors))]
pub struct LoaderError {
    pub errors: Vec<FixupError>,
}

fn join(errors: &[FixupError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
