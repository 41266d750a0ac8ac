use std::fmt::Display;
use std::sync::Arc;

use super::{
    read_u32, AccessFlags, BytecodeAddress, DexType, Endianness, EncodedArray, FileOffset,
};
use crate::dalvik::error::DexError;
use crate::Result;

/// Ordered type sequence referenced by file offset from proto_ids and
/// class_defs.
pub type TypeList = Vec<Arc<DexType>>;

/// The fixed 112-byte header. Only the endian tag and `map_off` steer the
/// parse; the rest is retained for hosts and the `info` surface.
#[derive(Debug, Clone)]
pub struct DexHeader {
    pub magic: [u8; 8],
    pub checksum: u32,
    pub signature: [u8; 20],
    pub file_size: u32,
    pub header_size: u32,
    pub endian_tag: u32,
    pub link_size: u32,
    pub link_off: u32,
    pub map_off: FileOffset,
    pub string_ids_size: u32,
    pub string_ids_off: FileOffset,
    pub type_ids_size: u32,
    pub type_ids_off: FileOffset,
    pub proto_ids_size: u32,
    pub proto_ids_off: FileOffset,
    pub field_ids_size: u32,
    pub field_ids_off: FileOffset,
    pub method_ids_size: u32,
    pub method_ids_off: FileOffset,
    pub class_defs_size: u32,
    pub class_defs_off: FileOffset,
    pub data_size: u32,
    pub data_off: FileOffset,
}

pub const HEADER_SIZE: usize = 112;

pub const ENDIAN_CONSTANT: u32 = 0x12345678;
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x78563412;

impl DexHeader {
    /// Detect endianness from bytes 40..44 and read the full header with it.
    pub fn parse(data: &[u8]) -> Result<(DexHeader, Endianness)> {
        if data.len() < HEADER_SIZE {
            return Err(DexError::TruncatedInput {
                what: "dex header",
                offset: 0,
                needed: HEADER_SIZE,
                available: data.len(),
            });
        }

        let raw_tag = read_u32(data, 40, Endianness::LittleEndian)?;
        let endian = match raw_tag {
            ENDIAN_CONSTANT => Endianness::LittleEndian,
            REVERSE_ENDIAN_CONSTANT => Endianness::BigEndian,
            other => return Err(DexError::InvalidEndianTag(other)),
        };

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&data[0..8]);
        let mut signature = [0u8; 20];
        signature.copy_from_slice(&data[12..32]);

        let header = DexHeader {
            magic,
            checksum: read_u32(data, 8, endian)?,
            signature,
            file_size: read_u32(data, 32, endian)?,
            header_size: read_u32(data, 36, endian)?,
            endian_tag: raw_tag,
            link_size: read_u32(data, 44, endian)?,
            link_off: read_u32(data, 48, endian)?,
            map_off: read_u32(data, 52, endian)?,
            string_ids_size: read_u32(data, 56, endian)?,
            string_ids_off: read_u32(data, 60, endian)?,
            type_ids_size: read_u32(data, 64, endian)?,
            type_ids_off: read_u32(data, 68, endian)?,
            proto_ids_size: read_u32(data, 72, endian)?,
            proto_ids_off: read_u32(data, 76, endian)?,
            field_ids_size: read_u32(data, 80, endian)?,
            field_ids_off: read_u32(data, 84, endian)?,
            method_ids_size: read_u32(data, 88, endian)?,
            method_ids_off: read_u32(data, 92, endian)?,
            class_defs_size: read_u32(data, 96, endian)?,
            class_defs_off: read_u32(data, 100, endian)?,
            data_size: read_u32(data, 104, endian)?,
            data_off: read_u32(data, 108, endian)?,
        };
        Ok((header, endian))
    }

    /// Format version from the magic, e.g. 35 for `dex\n035\0`, or 0 if the
    /// magic is not in the expected shape.
    pub fn version(&self) -> u32 {
        if &self.magic[..4] != b"dex\n" || self.magic[7] != 0 {
            return 0;
        }
        std::str::from_utf8(&self.magic[4..7])
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }
}

/// A method prototype: shorty descriptor, return type and parameter types.
///
/// Invariant `shorty.len() - 1 == parameters.len()`; a violation is reported
/// as a warning when the pool is decoded.
#[derive(Debug)]
pub struct DexPrototype {
    pub shorty: Arc<String>,
    pub return_type: Arc<DexType>,
    pub parameters: Arc<TypeList>,
}

impl Display for DexPrototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for param in self.parameters.iter() {
            write!(f, "{}", param)?;
        }
        write!(f, "){}", self.return_type)
    }
}

#[derive(Debug)]
pub struct DexFieldId {
    /// Defining class.
    pub class: Arc<DexType>,
    /// Field type.
    pub type_: Arc<DexType>,
    pub name: Arc<String>,
}

#[derive(Debug)]
pub struct DexMethodId {
    /// Defining class.
    pub class: Arc<DexType>,
    pub proto: Arc<DexPrototype>,
    pub name: Arc<String>,
}

/// Dex `method_handle_item` type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MethodHandleKind {
    StaticPut = 0x00,
    StaticGet = 0x01,
    InstancePut = 0x02,
    InstanceGet = 0x03,
    InvokeStatic = 0x04,
    InvokeInstance = 0x05,
    InvokeConstructor = 0x06,
    InvokeDirect = 0x07,
    InvokeInterface = 0x08,
}

impl MethodHandleKind {
    pub fn from_code(code: u16) -> Result<MethodHandleKind> {
        Ok(match code {
            0x00 => MethodHandleKind::StaticPut,
            0x01 => MethodHandleKind::StaticGet,
            0x02 => MethodHandleKind::InstancePut,
            0x03 => MethodHandleKind::InstanceGet,
            0x04 => MethodHandleKind::InvokeStatic,
            0x05 => MethodHandleKind::InvokeInstance,
            0x06 => MethodHandleKind::InvokeConstructor,
            0x07 => MethodHandleKind::InvokeDirect,
            0x08 => MethodHandleKind::InvokeInterface,
            other => return Err(DexError::InvalidMethodHandleKind { kind: other }),
        })
    }

    /// Accessor kinds (0x00..=0x03) reference the field pool, invoke kinds
    /// (0x04..=0x08) the method pool.
    pub fn is_field_accessor(&self) -> bool {
        (*self as u16) <= 0x03
    }
}

#[derive(Debug)]
pub enum MethodHandleTarget {
    Field(Arc<DexFieldId>),
    Method(Arc<DexMethodId>),
}

#[derive(Debug)]
pub struct DexMethodHandle {
    pub kind: MethodHandleKind,
    pub target: MethodHandleTarget,
}

/// One entry of an `encoded_catch_handler_list`.
///
/// `size` keeps the on-disk signed count: non-positive means a catch-all
/// address follows the `size.abs()` typed handlers.
#[derive(Debug)]
pub struct DexCatchHandler {
    pub size: i32,
    pub handlers: Vec<(Arc<DexType>, BytecodeAddress)>,
    pub catch_all_addr: Option<BytecodeAddress>,
}

#[derive(Debug)]
pub struct DexTryItem {
    /// Start of the covered range, in 16-bit code units.
    pub start_addr: BytecodeAddress,
    /// Number of covered code units.
    pub insn_count: u16,
    pub handler: Arc<DexCatchHandler>,
}

/// A `code_item` with its instruction stream decoded into native-order code
/// units.
#[derive(Debug)]
pub struct DexCode {
    pub registers_size: u16,
    pub ins_size: u16,
    pub outs_size: u16,
    pub debug_info_off: u32,
    /// 16-bit code units in logical order.
    pub insns: Vec<u16>,
    /// File offset of the first code unit.
    pub insns_off: FileOffset,
    pub tries: Vec<DexTryItem>,
}

impl DexCode {
    /// The instruction stream re-serialized in file order (little-endian
    /// per code unit), the shape [`crate::DexFile::disassemble`] expects.
    pub fn insns_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.insns.len() * 2);
        for unit in &self.insns {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    pub fn size_in_bytes(&self) -> usize {
        self.insns.len() * 2
    }
}

#[derive(Debug)]
pub struct DexEncodedField {
    pub field_idx: u32,
    pub field: Arc<DexFieldId>,
    pub access_flags: AccessFlags,
}

#[derive(Debug)]
pub struct DexEncodedMethod {
    pub method_idx: u32,
    pub method: Arc<DexMethodId>,
    pub access_flags: AccessFlags,
    pub code: Option<Arc<DexCode>>,
}

/// The four ordered member lists of a `class_data_item`.
#[derive(Debug, Default)]
pub struct DexClassData {
    pub static_fields: Vec<DexEncodedField>,
    pub instance_fields: Vec<DexEncodedField>,
    pub direct_methods: Vec<DexEncodedMethod>,
    pub virtual_methods: Vec<DexEncodedMethod>,
}

#[derive(Debug)]
pub struct DexClassDef {
    pub class_type: Arc<DexType>,
    pub access_flags: AccessFlags,
    pub superclass: Option<Arc<DexType>>,
    pub interfaces: Option<Arc<TypeList>>,
    pub source_file: Option<Arc<String>>,
    /// Offset of the annotations directory; directories are accepted but not
    /// decoded.
    pub annotations_off: Option<FileOffset>,
    pub class_data: Option<DexClassData>,
    /// Initial values for the leading static fields, in field order.
    pub static_values: Option<Arc<EncodedArray>>,
}

/// One of the three embedded payload blocks a code stream can carry.
/// `total_size` is the full byte size including the two-unit header.
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoInsn {
    PackedSwitch {
        first_key: i32,
        targets: Vec<i32>,
    },
    SparseSwitch {
        keys: Vec<i32>,
        targets: Vec<i32>,
    },
    FillArrayData {
        element_width: u16,
        size: u32,
        data: Vec<u8>,
    },
}

impl PseudoInsn {
    /// Total byte size of the payload as laid out in the code stream.
    pub fn total_size(&self) -> usize {
        match self {
            PseudoInsn::PackedSwitch { targets, .. } => targets.len() * 4 + 8,
            PseudoInsn::SparseSwitch { keys, .. } => keys.len() * 8 + 4,
            PseudoInsn::FillArrayData {
                element_width,
                size,
                ..
            } => ((*element_width as usize * *size as usize + 1) / 2) * 2 + 8,
        }
    }
}
