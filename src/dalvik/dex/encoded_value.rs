//! Decoding of the tagged `encoded_value` / `encoded_array` /
//! `encoded_annotation` formats.
//!
//! A value starts with one byte: the type in the low five bits and an
//! argument in the high three. For scalars the argument is the payload size
//! minus one; integral payloads are sign- or zero-extended from that size,
//! floating point payloads are zero-extended to the right. Reference types
//! resolve immediately against the already-decoded pools.

use std::sync::Arc;

use super::{DexFieldId, DexMethodHandle, DexMethodId, DexPrototype, DexType};
use crate::dalvik::error::DexError;
use crate::dalvik::leb128::decode_uleb128_at;
use crate::Result;

pub const VALUE_BYTE: u8 = 0x00;
pub const VALUE_SHORT: u8 = 0x02;
pub const VALUE_CHAR: u8 = 0x03;
pub const VALUE_INT: u8 = 0x04;
pub const VALUE_LONG: u8 = 0x06;
pub const VALUE_FLOAT: u8 = 0x10;
pub const VALUE_DOUBLE: u8 = 0x11;
pub const VALUE_METHOD_TYPE: u8 = 0x15;
pub const VALUE_METHOD_HANDLE: u8 = 0x16;
pub const VALUE_STRING: u8 = 0x17;
pub const VALUE_TYPE: u8 = 0x18;
pub const VALUE_FIELD: u8 = 0x19;
pub const VALUE_METHOD: u8 = 0x1A;
pub const VALUE_ENUM: u8 = 0x1B;
pub const VALUE_ARRAY: u8 = 0x1C;
pub const VALUE_ANNOTATION: u8 = 0x1D;
pub const VALUE_NULL: u8 = 0x1E;
pub const VALUE_BOOLEAN: u8 = 0x1F;

pub type EncodedArray = Vec<DexValue>;

/// A decoded `encoded_annotation`: annotation type plus named element values.
#[derive(Debug)]
pub struct DexAnnotation {
    pub type_: Arc<DexType>,
    pub elements: Vec<(Arc<String>, DexValue)>,
}

/// A decoded `encoded_value` with reference kinds already resolved.
#[derive(Debug)]
pub enum DexValue {
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    MethodType(Arc<DexPrototype>),
    MethodHandle(Arc<DexMethodHandle>),
    String(Arc<String>),
    Type(Arc<DexType>),
    Field(Arc<DexFieldId>),
    Method(Arc<DexMethodId>),
    Enum(Arc<DexFieldId>),
    Array(EncodedArray),
    Annotation(DexAnnotation),
    Null,
    Boolean(bool),
}

/// Borrowed view of the pools an encoded value can reference.
pub(crate) struct ValuePools<'a> {
    pub strings: &'a [Arc<String>],
    pub types: &'a [Arc<DexType>],
    pub protos: &'a [Arc<DexPrototype>],
    pub fields: &'a [Arc<DexFieldId>],
    pub methods: &'a [Arc<DexMethodId>],
    pub method_handles: &'a [Arc<DexMethodHandle>],
}

fn lookup<T: Clone>(pool: &[T], index: u32, name: &'static str) -> Result<T> {
    pool.get(index as usize)
        .cloned()
        .ok_or(DexError::IndexOutOfBounds {
            index,
            max: pool.len(),
            pool: name,
        })
}

/// Little-endian unsigned read of `size` payload bytes.
fn read_le_uint(data: &[u8], pos: &mut usize, size: usize) -> Result<u64> {
    if *pos + size > data.len() {
        return Err(DexError::TruncatedInput {
            what: "encoded value payload",
            offset: *pos,
            needed: size,
            available: data.len(),
        });
    }
    let mut value: u64 = 0;
    for (i, byte) in data[*pos..*pos + size].iter().enumerate() {
        value |= (*byte as u64) << (8 * i);
    }
    *pos += size;
    Ok(value)
}

/// Sign-extend a little-endian value read from `size` bytes.
fn sign_extend(value: u64, size: usize) -> i64 {
    let shift = 64 - 8 * size as u32;
    ((value << shift) as i64) >> shift
}

pub(crate) fn decode_value(pools: &ValuePools<'_>, data: &[u8], pos: &mut usize) -> Result<DexValue> {
    let tag = *data.get(*pos).ok_or(DexError::TruncatedInput {
        what: "encoded value tag",
        offset: *pos,
        needed: 1,
        available: data.len(),
    })?;
    *pos += 1;

    let value_type = tag & 0x1F;
    let value_arg = (tag >> 5) as usize;
    let size = value_arg + 1;

    // Per-type bound on value_arg; a wider payload than the type allows is
    // a malformed tag byte.
    let max_size = match value_type {
        VALUE_BYTE => 1,
        VALUE_SHORT | VALUE_CHAR => 2,
        VALUE_INT | VALUE_FLOAT => 4,
        VALUE_LONG | VALUE_DOUBLE => 8,
        VALUE_METHOD_TYPE | VALUE_METHOD_HANDLE | VALUE_STRING | VALUE_TYPE | VALUE_FIELD
        | VALUE_METHOD | VALUE_ENUM => 4,
        _ => 8,
    };
    if size > max_size
        && !matches!(value_type, VALUE_ARRAY | VALUE_ANNOTATION | VALUE_NULL | VALUE_BOOLEAN)
    {
        return Err(DexError::InvalidEncodedValueType { tag });
    }

    Ok(match value_type {
        VALUE_BYTE => DexValue::Byte(sign_extend(read_le_uint(data, pos, 1)?, 1) as i8),
        VALUE_SHORT => DexValue::Short(sign_extend(read_le_uint(data, pos, size)?, size) as i16),
        VALUE_CHAR => DexValue::Char(read_le_uint(data, pos, size)? as u16),
        VALUE_INT => DexValue::Int(sign_extend(read_le_uint(data, pos, size)?, size) as i32),
        VALUE_LONG => DexValue::Long(sign_extend(read_le_uint(data, pos, size)?, size)),
        VALUE_FLOAT => {
            let bits = (read_le_uint(data, pos, size)? as u32) << (8 * (4 - size as u32));
            DexValue::Float(f32::from_bits(bits))
        }
        VALUE_DOUBLE => {
            let bits = read_le_uint(data, pos, size)? << (8 * (8 - size as u32));
            DexValue::Double(f64::from_bits(bits))
        }
        VALUE_METHOD_TYPE => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::MethodType(lookup(pools.protos, index, "proto_ids")?)
        }
        VALUE_METHOD_HANDLE => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::MethodHandle(lookup(pools.method_handles, index, "method_handles")?)
        }
        VALUE_STRING => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::String(lookup(pools.strings, index, "string_ids")?)
        }
        VALUE_TYPE => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::Type(lookup(pools.types, index, "type_ids")?)
        }
        VALUE_FIELD => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::Field(lookup(pools.fields, index, "field_ids")?)
        }
        VALUE_METHOD => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::Method(lookup(pools.methods, index, "method_ids")?)
        }
        VALUE_ENUM => {
            let index = read_le_uint(data, pos, size)? as u32;
            DexValue::Enum(lookup(pools.fields, index, "field_ids")?)
        }
        VALUE_ARRAY => DexValue::Array(decode_array(pools, data, pos)?),
        VALUE_ANNOTATION => DexValue::Annotation(decode_annotation(pools, data, pos)?),
        VALUE_NULL => DexValue::Null,
        VALUE_BOOLEAN => DexValue::Boolean(value_arg != 0),
        other => return Err(DexError::InvalidEncodedValueType { tag: other }),
    })
}

pub(crate) fn decode_array(
    pools: &ValuePools<'_>,
    data: &[u8],
    pos: &mut usize,
) -> Result<EncodedArray> {
    let count = decode_uleb128_at(data, pos)?;
    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        values.push(decode_value(pools, data, pos)?);
    }
    Ok(values)
}

pub(crate) fn decode_annotation(
    pools: &ValuePools<'_>,
    data: &[u8],
    pos: &mut usize,
) -> Result<DexAnnotation> {
    let type_idx = decode_uleb128_at(data, pos)?;
    let type_ = lookup(pools.types, type_idx, "type_ids")?;
    let count = decode_uleb128_at(data, pos)?;
    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_idx = decode_uleb128_at(data, pos)?;
        let name = lookup(pools.strings, name_idx, "string_ids")?;
        elements.push((name, decode_value(pools, data, pos)?));
    }
    Ok(DexAnnotation { type_, elements })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_pools() -> (
        Vec<Arc<String>>,
        Vec<Arc<DexType>>,
        Vec<Arc<DexPrototype>>,
        Vec<Arc<DexFieldId>>,
        Vec<Arc<DexMethodId>>,
        Vec<Arc<DexMethodHandle>>,
    ) {
        (
            vec![Arc::new("hello".to_string())],
            vec![Arc::new(DexType::new("I"))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    macro_rules! pools {
        ($p:expr) => {
            ValuePools {
                strings: &$p.0,
                types: &$p.1,
                protos: &$p.2,
                fields: &$p.3,
                methods: &$p.4,
                method_handles: &$p.5,
            }
        };
    }

    fn decode_one(data: &[u8]) -> Result<(DexValue, usize)> {
        let backing = empty_pools();
        let pools = pools!(backing);
        let mut pos = 0;
        let value = decode_value(&pools, data, &mut pos)?;
        Ok((value, pos))
    }

    #[test]
    fn test_byte_value() {
        let (value, size) = decode_one(&[VALUE_BYTE, 0x80]).unwrap();
        assert!(matches!(value, DexValue::Byte(-128)));
        assert_eq!(size, 2);
    }

    #[test]
    fn test_int_sign_extended_from_one_byte() {
        // value_arg 0: one payload byte, sign-extended to 32 bits.
        let (value, size) = decode_one(&[VALUE_INT, 0x80]).unwrap();
        assert!(matches!(value, DexValue::Int(-128)));
        assert_eq!(size, 2);
    }

    #[test]
    fn test_int_full_width() {
        let (value, _) = decode_one(&[0x60 | VALUE_INT, 0x78, 0x56, 0x34, 0x12]).unwrap();
        assert!(matches!(value, DexValue::Int(0x12345678)));
    }

    #[test]
    fn test_char_zero_extended() {
        let (value, _) = decode_one(&[VALUE_CHAR, 0x80]).unwrap();
        assert!(matches!(value, DexValue::Char(0x80)));
    }

    #[test]
    fn test_float_zero_extended_right() {
        // 1.0f32 = 0x3F800000; stored as the two high bytes.
        let (value, _) = decode_one(&[0x20 | VALUE_FLOAT, 0x80, 0x3F]).unwrap();
        match value {
            DexValue::Float(f) => assert_eq!(f, 1.0),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_in_value_arg() {
        let (value, size) = decode_one(&[0x20 | VALUE_BOOLEAN]).unwrap();
        assert!(matches!(value, DexValue::Boolean(true)));
        assert_eq!(size, 1);
        let (value, _) = decode_one(&[VALUE_BOOLEAN]).unwrap();
        assert!(matches!(value, DexValue::Boolean(false)));
    }

    #[test]
    fn test_null_value() {
        let (value, size) = decode_one(&[VALUE_NULL]).unwrap();
        assert!(matches!(value, DexValue::Null));
        assert_eq!(size, 1);
    }

    #[test]
    fn test_string_reference_resolves() {
        let (value, _) = decode_one(&[VALUE_STRING, 0x00]).unwrap();
        match value {
            DexValue::String(s) => assert_eq!(s.as_str(), "hello"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_reference_is_fatal() {
        assert!(matches!(
            decode_one(&[VALUE_STRING, 0x07]),
            Err(DexError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_unassigned_tag_rejected() {
        assert!(matches!(
            decode_one(&[0x05, 0x00]),
            Err(DexError::InvalidEncodedValueType { tag: 0x05 })
        ));
    }

    #[test]
    fn test_array_of_values() {
        // [Byte(1), Boolean(true), Null]
        let data = [0x03, VALUE_BYTE, 0x01, 0x20 | VALUE_BOOLEAN, VALUE_NULL];
        let backing = empty_pools();
        let pools = pools!(backing);
        let mut pos = 0;
        let values = decode_array(&pools, &data, &mut pos).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(pos, data.len());
    }

    #[test]
    fn test_annotation() {
        // type_idx=0, one element: name_idx=0, value=Int(7)
        let data = [0x00, 0x01, 0x00, VALUE_INT, 0x07];
        let backing = empty_pools();
        let pools = pools!(backing);
        let mut pos = 0;
        let annotation = decode_annotation(&pools, &data, &mut pos).unwrap();
        assert_eq!(annotation.type_.descriptor, "I");
        assert_eq!(annotation.elements.len(), 1);
        assert_eq!(pos, data.len());
    }
}
