//! Cursor-based program loader.

use std::collections::BTreeMap;

use tracing::{debug, error};

use super::image::{BinaryImage, ImageError};
use super::reference::{Encoding, LabelRef, Patch, PendingReference};
use super::{FixupError, LabelTable, LoaderError};
use crate::addressing::AddressingMode;
use crate::opcodes::{find_opcode, Mnemonic};
use crate::MemoryBus;

const WORD_PLACEHOLDER: u16 = 0xFFFF;
const BYTE_PLACEHOLDER: u8 = 0xFF;

/// Writes bytes at a cursor and patches label references on fixup.
///
/// Writer methods return `&mut Self` so short sequences chain. Problems
/// (duplicate labels, malformed references, unknown instructions) are
/// recorded and reported together by the next [`fixup`](Self::fixup).
///
/// Dropping a loader with unresolved work runs an implicit fixup and logs
/// any failure at error level.
///
/// # Examples
///
/// ```
/// use sim6502::{AddressingMode, FlatMemory, LabelTable, Loader, MemoryBus, Mnemonic};
///
/// let mut mem = FlatMemory::new();
/// let mut labels = LabelTable::new();
///
/// let mut loader = Loader::new(&mut mem, &mut labels);
/// loader.from(0x0200);
/// loader.ins(Mnemonic::Jmp, AddressingMode::Absolute).ref_word("target");
/// loader.write(0xEA);
/// loader.label("target");
/// loader.fixup().unwrap();
/// drop(loader);
///
/// assert_eq!(mem.read_word(0x0201), 0x0204);
/// assert_eq!(labels.lookup("target"), Some(0x0204));
/// ```
pub struct Loader<'a, M: MemoryBus> {
    bus: &'a mut M,
    labels: &'a mut LabelTable,
    cursor: u16,
    pending: BTreeMap<u16, PendingReference>,
    errors: Vec<FixupError>,
}

impl<'a, M: MemoryBus> Loader<'a, M> {
    /// Creates a loader with its cursor at 0x0000.
    pub fn new(bus: &'a mut M, labels: &'a mut LabelTable) -> Self {
        Self {
            bus,
            labels,
            cursor: 0,
            pending: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn labels(&self) -> &LabelTable {
        &*self.labels
    }

    /// Moves the cursor without writing.
    pub fn from(&mut self, address: u16) -> &mut Self {
        self.cursor = address;
        self
    }

    pub fn write(&mut self, value: u8) -> &mut Self {
        self.bus.write(self.cursor, value);
        self.cursor = self.cursor.wrapping_add(1);
        self
    }

    /// Writes a little-endian word.
    pub fn write_word(&mut self, value: u16) -> &mut Self {
        let [lo, hi] = value.to_le_bytes();
        self.write(lo).write(hi)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for &byte in bytes {
            self.write(byte);
        }
        self
    }

    /// Emits the opcode for `mnemonic` in `mode`. Operands follow through
    /// the other writer methods.
    pub fn ins(&mut self, mnemonic: Mnemonic, mode: AddressingMode) -> &mut Self {
        match find_opcode(mnemonic, mode) {
            Some(opcode) => self.write(opcode),
            None => {
                self.errors.push(FixupError::UnknownInstruction {
                    mnemonic,
                    mode,
                    at: self.cursor,
                });
                self
            }
        }
    }

    /// Defines `name` at the cursor in the innermost label scope.
    pub fn label(&mut self, name: &str) -> &mut Self {
        if let Err(err) = self.labels.define(name, self.cursor) {
            self.errors.push(err.into());
        }
        self
    }

    /// Writes a word placeholder for an absolute reference.
    pub fn ref_word(&mut self, label: &str) -> &mut Self {
        self.reference(label, Encoding::Word);
        self.write_word(WORD_PLACEHOLDER)
    }

    /// Writes a byte placeholder for a zero-page, immediate or `:LO`/`:HI`
    /// reference.
    pub fn ref_byte(&mut self, label: &str) -> &mut Self {
        self.reference(label, Encoding::Byte);
        self.write(BYTE_PLACEHOLDER)
    }

    /// Writes a byte placeholder for a branch displacement.
    pub fn relative_ref(&mut self, label: &str) -> &mut Self {
        self.reference(label, Encoding::Relative);
        self.write(BYTE_PLACEHOLDER)
    }

    fn reference(&mut self, label: &str, encoding: Encoding) {
        match label.parse::<LabelRef>() {
            Ok(target) => {
                let at = self.cursor;
                let reference = PendingReference { target, encoding };
                if let Some(previous) = self.pending.insert(at, reference) {
                    self.errors.push(FixupError::Overwritten {
                        label: previous.target.to_string(),
                        at,
                    });
                }
            }
            Err(err) => self.errors.push(err.into()),
        }
    }

    /// Writes a binary image at its header address, or at `at` when given,
    /// and leaves the cursor after it. Returns the load address.
    pub fn load_image(&mut self, data: &[u8], at: Option<u16>) -> Result<u16, ImageError> {
        let mut image = BinaryImage::parse(data)?;
        if let Some(address) = at {
            image = image.relocated(address)?;
        }
        let address = image.address;
        debug!(
            address = format_args!("0x{:04X}", address),
            len = image.bytes.len(),
            "loading image"
        );
        self.from(address).write_bytes(&image.bytes);
        Ok(address)
    }

    /// Opens an inner label scope.
    pub fn push_scope(&mut self) -> &mut Self {
        self.labels.push_scope();
        self
    }

    /// Resolves everything loaded in the current scope, then discards it.
    ///
    /// The scope is popped even if fixup fails.
    pub fn end_scope(&mut self) -> Result<(), LoaderError> {
        let outcome = self.fixup();
        self.labels.pop_scope();
        outcome
    }

    /// Patches every pending reference.
    ///
    /// All references are resolved before anything is written; if any
    /// error was recorded or any reference fails, nothing is patched and
    /// every error is returned. Pending work is discarded either way.
    pub fn fixup(&mut self) -> Result<(), LoaderError> {
        let mut errors = std::mem::take(&mut self.errors);
        let pending = std::mem::take(&mut self.pending);

        let mut patches = Vec::with_capacity(pending.len());
        for (at, reference) in &pending {
            match reference.resolve(*at, &*self.labels) {
                Ok(patch) => patches.push((*at, patch)),
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() {
            return Err(LoaderError { errors });
        }

        for (at, patch) in patches {
            match patch {
                Patch::Byte(value) => self.bus.write(at, value),
                Patch::Word(value) => self.bus.write_word(at, value),
            }
        }
        debug!(references = pending.len(), "fixup complete");
        Ok(())
    }
}

impl<M: MemoryBus> Drop for Loader<'_, M> {
    fn drop(&mut self) {
        if self.pending.is_empty() && self.errors.is_empty() {
            return;
        }
        if let Err(err) = self.fixup() {
            error!(%err, "implicit fixup failed");
        }
    }
}
