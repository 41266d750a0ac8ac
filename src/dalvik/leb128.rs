//! LEB128 decoding for Dex items.
//!
//! Dex only uses LEB128 to encode 32-bit entities, so a legal sequence is at
//! most five bytes long. Decoding delegates to the `leb128` crate and then
//! enforces that bound.

use crate::dalvik::error::DexError;
use crate::Result;

/// Dex encodes 32-bit values in at most ceil(32 / 7) groups.
const MAX_BYTES: usize = 5;

fn read_unsigned(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut rest = data;
    let value = leb128::read::unsigned(&mut rest).map_err(|_| DexError::InvalidLeb128 {
        offset,
        reason: "unterminated or overlong unsigned group sequence",
    })?;
    let size = data.len() - rest.len();
    if size > MAX_BYTES {
        return Err(DexError::InvalidLeb128 {
            offset,
            reason: "sequence exceeds the 5-byte Dex bound",
        });
    }
    Ok((value, size))
}

/// Decode an unsigned LEB128 value, returning `(value, bytes_consumed)`.
pub fn decode_uleb128(data: &[u8]) -> Result<(u32, usize)> {
    let (value, size) = read_unsigned(data, 0)?;
    Ok((value as u32, size))
}

/// Decode an unsigned LEB128p1 value. The encoding stores `value + 1`, so
/// a one-byte `0x00` decodes to -1 ("no value").
pub fn decode_uleb128p1(data: &[u8]) -> Result<(i32, usize)> {
    let (value, size) = read_unsigned(data, 0)?;
    Ok((value.wrapping_sub(1) as u32 as i32, size))
}

/// Decode a signed LEB128 value, returning `(value, bytes_consumed)`.
///
/// The sign bit is bit 6 of the final group; the value is sign-extended from
/// there down to 32 bits, so `0x7f` is -1 and `0x80 0x7f` is -128.
pub fn decode_sleb128(data: &[u8]) -> Result<(i32, usize)> {
    let mut rest = data;
    let value = leb128::read::signed(&mut rest).map_err(|_| DexError::InvalidLeb128 {
        offset: 0,
        reason: "unterminated or overlong signed group sequence",
    })?;
    let size = data.len() - rest.len();
    if size > MAX_BYTES {
        return Err(DexError::InvalidLeb128 {
            offset: 0,
            reason: "sequence exceeds the 5-byte Dex bound",
        });
    }
    Ok((value as i32, size))
}

/// Decode an unsigned LEB128 value and advance `pos` past it.
pub fn decode_uleb128_at(data: &[u8], pos: &mut usize) -> Result<u32> {
    let (value, size) = decode_uleb128(&data[*pos..]).map_err(|e| at_offset(e, *pos))?;
    *pos += size;
    Ok(value)
}

/// Decode a signed LEB128 value and advance `pos` past it.
pub fn decode_sleb128_at(data: &[u8], pos: &mut usize) -> Result<i32> {
    let (value, size) = decode_sleb128(&data[*pos..]).map_err(|e| at_offset(e, *pos))?;
    *pos += size;
    Ok(value)
}

fn at_offset(err: DexError, pos: usize) -> DexError {
    match err {
        DexError::InvalidLeb128 { reason, .. } => DexError::InvalidLeb128 { offset: pos, reason },
        other => other,
    }
}
