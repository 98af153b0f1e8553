//! LEB128 variable-length integers and zigzag signed encoding.

/// Append `value` to `buf` as unsigned LEB128.
pub(super) fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Why a varint could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VarintError {
    UnexpectedEof,
    Overflow,
}

/// Longest encoding of a `u64`: nine 7-bit groups plus one final bit.
pub(super) const MAX_VARINT_LEN: usize = 10;

/// Decode an unsigned LEB128 value from `buf` at `*pos`. On success `*pos`
/// moves past the consumed bytes; on failure it is left untouched.
///
/// The tenth byte may only carry the top bit of the value and must end the
/// encoding.
pub(super) fn decode_varint(buf: &[u8], pos: &mut usize) -> Result<u64, VarintError> {
    let rest = buf.get(*pos..).unwrap_or_default();
    let mut value: u64 = 0;
    for (i, &byte) in rest.iter().take(MAX_VARINT_LEN).enumerate() {
        let group = u64::from(byte & 0x7F);
        let last = byte & 0x80 == 0;
        if i == MAX_VARINT_LEN - 1 && (group > 1 || !last) {
            return Err(VarintError::Overflow);
        }
        value |= group << (7 * i);
        if last {
            *pos += i + 1;
            return Ok(value);
        }
    }
    if rest.len() >= MAX_VARINT_LEN {
        Err(VarintError::Overflow)
    } else {
        Err(VarintError::UnexpectedEof)
    }
}

/// Maps 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
#[inline]
pub(super) fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub(super) fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}
