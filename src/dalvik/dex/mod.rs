use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub mod types;
pub use types::*;

pub mod map_list;
pub use map_list::*;

pub mod encoded_value;
pub use encoded_value::*;

pub mod items;
pub use items::*;

pub mod container;
pub use container::*;

use crate::dalvik::error::DexError;
use crate::Result;

pub(crate) fn read_u16(data: &[u8], offset: usize, endian: Endianness) -> Result<u16> {
    let end = offset.checked_add(2).unwrap_or(usize::MAX);
    if end > data.len() {
        return Err(DexError::TruncatedInput {
            what: "u16",
            offset,
            needed: 2,
            available: data.len(),
        });
    }
    Ok(match endian {
        Endianness::LittleEndian => LittleEndian::read_u16(&data[offset..end]),
        Endianness::BigEndian => BigEndian::read_u16(&data[offset..end]),
    })
}

pub(crate) fn read_u32(data: &[u8], offset: usize, endian: Endianness) -> Result<u32> {
    let end = offset.checked_add(4).unwrap_or(usize::MAX);
    if end > data.len() {
        return Err(DexError::TruncatedInput {
            what: "u32",
            offset,
            needed: 4,
            available: data.len(),
        });
    }
    Ok(match endian {
        Endianness::LittleEndian => LittleEndian::read_u32(&data[offset..end]),
        Endianness::BigEndian => BigEndian::read_u32(&data[offset..end]),
    })
}
