//! Container layout constants, the byte cursor used by the reader, and the
//! per-kind attribute payload encoding.
//!
//! Layout (fixed-width fields little-endian, counts and tags LEB128):
//! ```text
//! [magic 4B][version 1B]
//! [format name: len varint, utf8]
//! [label count varint]
//! label := [tag varint][attr count varint]{[type id 16B][payload]}[child count varint]{label}
//! [sha256 of all preceding bytes 32B]
//! ```
//! Labels appear in pre-order, siblings in tag order, starting at the root.

use crate::attribute::{Attribute, AttributeKind};
use crate::error::CoreError;

use super::varint::{decode_varint, encode_varint, zigzag_decode, zigzag_encode, VarintError};

pub const MAGIC: [u8; 4] = *b"CDOC";

pub const VERSION: u8 = 1;

/// Magic plus version byte.
pub const HEADER_LEN: usize = 5;

/// Trailing SHA-256 size.
pub const HASH_LEN: usize = 32;

pub const MIN_CONTAINER_LEN: usize = HEADER_LEN + HASH_LEN;

// =============================================================================
// Writing
// =============================================================================

pub(super) fn write_len_prefixed(bytes: &[u8], buf: &mut Vec<u8>) {
    encode_varint(bytes.len() as u64, buf);
    buf.extend_from_slice(bytes);
}

/// Append the type id and payload of `attribute`.
pub(super) fn write_attribute(attribute: &Attribute, buf: &mut Vec<u8>) {
    buf.extend_from_slice(attribute.id().as_bytes());
    match attribute {
        Attribute::Integer(v) => encode_varint(zigzag_encode(*v), buf),
        Attribute::Real(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Attribute::Name(v) => write_len_prefixed(v.as_bytes(), buf),
    }
}

// =============================================================================
// Reading
// =============================================================================

/// Bounds-checked reader over a container body. Every failure is reported
/// as `CorruptData` at the current offset.
pub(super) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub(super) fn position(&self) -> usize {
        self.pos
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub(super) fn corrupt(&self, message: impl Into<String>) -> CoreError {
        CoreError::CorruptData {
            offset: self.pos,
            message: message.into(),
        }
    }

    pub(super) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CoreError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| self.corrupt(format!("unexpected end of data reading {len} bytes")))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(super) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(super) fn read_varint(&mut self) -> Result<u64, CoreError> {
        decode_varint(self.buf, &mut self.pos).map_err(|e| match e {
            VarintError::UnexpectedEof => self.corrupt("unexpected end of data in varint"),
            VarintError::Overflow => self.corrupt("varint overflows 64 bits"),
        })
    }

    /// Read a count and check it against `max`.
    pub(super) fn read_count(&mut self, what: &str, max: usize) -> Result<usize, CoreError> {
        let raw = self.read_varint()?;
        usize::try_from(raw)
            .ok()
            .filter(|&n| n <= max)
            .ok_or_else(|| self.corrupt(format!("{what} {raw} exceeds limit {max}")))
    }

    pub(super) fn read_string(&mut self, max_len: usize) -> Result<String, CoreError> {
        let len = self.read_count("string length", max_len)?;
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map(str::to_owned).map_err(|e| {
            CoreError::CorruptData {
                offset: start + e.valid_up_to(),
                message: "string is not valid UTF-8".into(),
            }
        })
    }
}

/// Read one type id and payload.
pub(super) fn read_attribute(
    cursor: &mut Cursor<'_>,
    max_string_len: usize,
) -> Result<Attribute, CoreError> {
    let id_offset = cursor.position();
    let id = crate::attribute::AttributeId::from_bytes(cursor.read_array::<16>()?);
    let kind = AttributeKind::from_id(id).ok_or_else(|| CoreError::CorruptData {
        offset: id_offset,
        message: format!("unknown attribute type {id}"),
    })?;

    Ok(match kind {
        AttributeKind::Integer => Attribute::Integer(zigzag_decode(cursor.read_varint()?)),
        AttributeKind::Real => Attribute::Real(f64::from_le_bytes(cursor.read_array::<8>()?)),
        AttributeKind::Name => Attribute::Name(cursor.read_string(max_string_len)?),
    })
}
