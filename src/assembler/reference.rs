//! Label references and their resolution.
//!
//! A reference string is parsed once, when the loader emits the placeholder.
//! The parsed [`LabelRef`] is stored with its encoding until fixup resolves
//! it against the label table.

use std::fmt;
use std::str::FromStr;

use super::{FixupError, LabelError, LabelTable};

/// Largest offset magnitude; anything wider cannot address the 64K space.
const MAX_OFFSET: i32 = 0xFFFF;

/// Which part of a resolved value a reference uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteSelect {
    #[default]
    Both,
    /// `:LO`
    Lo,
    /// `:HI`
    Hi,
}

impl ByteSelect {
    pub fn apply(self, value: i32) -> i32 {
        match self {
            ByteSelect::Both => value,
            ByteSelect::Lo => value & 0xFF,
            ByteSelect::Hi => (value >> 8) & 0xFF,
        }
    }
}

/// A parsed `name[+N|-N][:LO|:HI]` reference.
///
/// # Examples
///
/// ```
/// use sim6502::assembler::{ByteSelect, LabelRef};
///
/// let r: LabelRef = "table+$10:HI".parse().unwrap();
/// assert_eq!(r.name, "table");
/// assert_eq!(r.offset, 16);
/// assert_eq!(r.select, ByteSelect::Hi);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef {
    pub name: String,
    pub offset: i32,
    pub select: ByteSelect,
}

impl FromStr for LabelRef {
    type Err = LabelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || LabelError::Malformed(text.to_string());
        let trimmed = text.trim();

        let (body, select) = match trimmed.rsplit_once(':') {
            Some((body, suffix)) if suffix.eq_ignore_ascii_case("LO") => (body, ByteSelect::Lo),
            Some((body, suffix)) if suffix.eq_ignore_ascii_case("HI") => (body, ByteSelect::Hi),
            Some(_) => return Err(malformed()),
            None => (trimmed, ByteSelect::Both),
        };

        let (name, offset) = match body.find(&['+', '-'][..]) {
            Some(pos) => {
                let (name, offset) = body.split_at(pos);
                (name, parse_offset(offset).ok_or_else(malformed)?)
            }
            None => (body, 0),
        };

        let name = name.trim();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(malformed());
        }

        Ok(Self {
            name: name.to_string(),
            offset,
            select,
        })
    }
}

/// Parses `+N` / `-N` where N is decimal, `$hex` or `0xhex` and at most
/// $FFFF.
fn parse_offset(text: &str) -> Option<i32> {
    let (negative, magnitude) = match text.as_bytes().first()? {
        b'+' => (false, text[1..].trim()),
        b'-' => (true, text[1..].trim()),
        _ => return None,
    };
    if magnitude.starts_with(&['+', '-'][..]) {
        return None;
    }

    let hex = magnitude
        .strip_prefix('$')
        .or_else(|| magnitude.strip_prefix("0x"))
        .or_else(|| magnitude.strip_prefix("0X"));
    let value = match hex {
        Some(digits) => i32::from_str_radix(digits, 16).ok()?,
        None => magnitude.parse::<i32>().ok()?,
    };
    if value > MAX_OFFSET {
        return None;
    }
    Some(if negative { -value } else { value })
}

impl fmt::Display for LabelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.offset != 0 {
            write!(f, "{:+}", self.offset)?;
        }
        match self.select {
            ByteSelect::Both => Ok(()),
            ByteSelect::Lo => f.write_str(":LO"),
            ByteSelect::Hi => f.write_str(":HI"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Word,
    Byte,
    /// Signed branch displacement from the byte after the operand.
    Relative,
}

/// A placeholder waiting for fixup.
#[derive(Debug, Clone)]
pub(crate) struct PendingReference {
    pub target: LabelRef,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Patch {
    Byte(u8),
    Word(u16),
}

impl PendingReference {
    /// Computes the bytes for the placeholder at `at`.
    pub(crate) fn resolve(&self, at: u16, labels: &LabelTable) -> Result<Patch, FixupError> {
        let label = || self.target.to_string();
        let address = labels
            .lookup(&self.target.name)
            .ok_or_else(|| FixupError::Unresolved { label: label(), at })?;
        let target = (address as i32).checked_add(self.target.offset);
        let select = self.target.select;

        match self.encoding {
            Encoding::Relative => {
                let distance = target
                    .and_then(|t| t.checked_sub(at as i32 + 1))
                    .map(|d| select.apply(d));
                let fits = match (distance, select) {
                    (Some(d), ByteSelect::Both) => i8::try_from(d).is_ok(),
                    (Some(_), ByteSelect::Lo | ByteSelect::Hi) => true,
                    (None, _) => false,
                };
                let distance = distance.unwrap_or(i32::MAX);
                if fits {
                    Ok(Patch::Byte(distance as u8))
                } else {
                    Err(FixupError::RelativeOutOfRange {
                        label: label(),
                        at,
                        distance,
                    })
                }
            }
            Encoding::Byte => {
                let value = target.map(|t| select.apply(t)).unwrap_or(i32::MAX);
                u8::try_from(value)
                    .map(Patch::Byte)
                    .map_err(|_| FixupError::ByteOutOfRange {
                        label: label(),
                        at,
                        value,
                    })
            }
            Encoding::Word => {
                let value = target.map(|t| select.apply(t)).unwrap_or(i32::MAX);
                u16::try_from(value)
                    .map(Patch::Word)
                    .map_err(|_| FixupError::WordOutOfRange {
                        label: label(),
                        at,
                        value,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> LabelRef {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_offsets_and_selectors() {
        assert_eq!(parse("start").offset, 0);
        assert_eq!(parse("start+2").offset, 2);
        assert_eq!(parse("start-3").offset, -3);
        assert_eq!(parse("start+$10").offset, 16);
        assert_eq!(parse("start-0x20").offset, -32);

        let r = parse("vector+1:lo");
        assert_eq!(r.name, "vector");
        assert_eq!(r.offset, 1);
        assert_eq!(r.select, ByteSelect::Lo);
        assert_eq!(r.to_string(), "vector+1:LO");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "+2", "name+", "name:MID", "two words", "name+-1", "name+zz"] {
            assert!(
                matches!(text.parse::<LabelRef>(), Err(LabelError::Malformed(_))),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_offsets_wider_than_address_space() {
        assert_eq!(parse("x+$FFFF").offset, 0xFFFF);
        assert_eq!(parse("x-65535").offset, -65535);
        for text in ["x+$10000", "x+65536", "x-0x10000", "x+2147483647", "x-2147483648"] {
            assert!(
                matches!(text.parse::<LabelRef>(), Err(LabelError::Malformed(_))),
                "accepted {text:?}"
            );
        }
    }

    fn pending(text: &str, encoding: Encoding) -> PendingReference {
        PendingReference {
            target: parse(text),
            encoding,
        }
    }

    #[test]
    fn test_resolve_relative_distance() {
        let mut labels = LabelTable::new();
        labels.define("back", 0x0200).unwrap();
        labels.define("far", 0x0300).unwrap();

        // operand byte at $0205: PC after operand is $0206, $0200 - $0206 = -6
        let patch = pending("back", Encoding::Relative).resolve(0x0205, &labels);
        assert_eq!(patch, Ok(Patch::Byte(0xFA)));

        let err = pending("far", Encoding::Relative)
            .resolve(0x0205, &labels)
            .unwrap_err();
        assert!(matches!(err, FixupError::RelativeOutOfRange { distance: 250, .. }));
    }

    #[test]
    fn test_resolve_byte_and_word_ranges() {
        let mut labels = LabelTable::new();
        labels.define("zp", 0x00F0).unwrap();
        labels.define("code", 0x1234).unwrap();

        let at = 0x0400;
        assert_eq!(
            pending("zp+$0F", Encoding::Byte).resolve(at, &labels),
            Ok(Patch::Byte(0xFF))
        );
        assert!(pending("zp+$10", Encoding::Byte).resolve(at, &labels).is_err());
        assert_eq!(
            pending("code:HI", Encoding::Byte).resolve(at, &labels),
            Ok(Patch::Byte(0x12))
        );
        assert_eq!(
            pending("code-$34", Encoding::Word).resolve(at, &labels),
            Ok(Patch::Word(0x1200))
        );
        assert!(matches!(
            pending("zp-$F1", Encoding::Word).resolve(at, &labels),
            Err(FixupError::WordOutOfRange { value: -1, .. })
        ));
    }

    #[test]
    fn test_resolve_widest_offsets_stay_in_range_checks() {
        let mut labels = LabelTable::new();
        labels.define("top", 0xFFFF).unwrap();
        labels.define("bottom", 0x0000).unwrap();

        assert!(matches!(
            pending("top+$FFFF", Encoding::Word).resolve(0x0200, &labels),
            Err(FixupError::WordOutOfRange { value: 0x1FFFE, .. })
        ));
        assert!(matches!(
            pending("bottom-$FFFF", Encoding::Relative).resolve(0xFFFE, &labels),
            Err(FixupError::RelativeOutOfRange { .. })
        ));

        let overflowing = PendingReference {
            target: LabelRef {
                name: "top".to_string(),
                offset: i32::MAX,
                select: ByteSelect::Both,
            },
            encoding: Encoding::Word,
        };
        assert!(matches!(
            overflowing.resolve(0x0200, &labels),
            Err(FixupError::WordOutOfRange { .. })
        ));
    }
}
