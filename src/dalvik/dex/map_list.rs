use super::{read_u16, read_u32, Endianness, FileOffset};
use crate::Result;

/// Dex `map_item` type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u16)]
pub enum MapItemType {
    /// @size: `0x70`
    HeaderItem = 0x0000,

    /// @size: `0x04`
    StringIdItem = 0x0001,

    /// @size: `0x04`
    TypeIdItem = 0x0002,

    /// @size: `0x0C`
    ProtoIdItem = 0x0003,

    /// @size: `0x08`
    FieldIdItem = 0x0004,

    /// @size: `0x08`
    MethodIdItem = 0x0005,

    /// @size: `0x20`
    ClassDefItem = 0x0006,

    /// @size: `0x04`
    CallSiteIdItem = 0x0007,

    /// @size: `0x08`
    MethodHandleItem = 0x0008,

    /// @size: `4 + (item.size * 12)`
    MapList = 0x1000,

    /// @size: `4 + (item.size * 2)`
    TypeList = 0x1001,

    /// @size: `4 + (item.size * 4)`
    AnnotationSetRefList = 0x1002,

    /// @size: `4 + (item.size * 4)`
    AnnotationSetItem = 0x1003,

    /// @size: _implicit_
    ClassDataItem = 0x2000,

    /// @size: _implicit_
    CodeItem = 0x2001,

    /// @size: _implicit_
    StringDataItem = 0x2002,

    /// @size: _implicit_
    DebugInfoItem = 0x2003,

    /// @size: _implicit_
    AnnotationItem = 0x2004,

    /// @size: _implicit_
    EncodedArrayItem = 0x2005,

    /// @size: _implicit_
    AnnotationsDirectoryItem = 0x2006,

    /// @size: _implicit_
    HiddenapiClassData = 0xF000,
}

impl MapItemType {
    pub fn from_code(code: u16) -> Option<MapItemType> {
        Some(match code {
            0x0000 => MapItemType::HeaderItem,
            0x0001 => MapItemType::StringIdItem,
            0x0002 => MapItemType::TypeIdItem,
            0x0003 => MapItemType::ProtoIdItem,
            0x0004 => MapItemType::FieldIdItem,
            0x0005 => MapItemType::MethodIdItem,
            0x0006 => MapItemType::ClassDefItem,
            0x0007 => MapItemType::CallSiteIdItem,
            0x0008 => MapItemType::MethodHandleItem,
            0x1000 => MapItemType::MapList,
            0x1001 => MapItemType::TypeList,
            0x1002 => MapItemType::AnnotationSetRefList,
            0x1003 => MapItemType::AnnotationSetItem,
            0x2000 => MapItemType::ClassDataItem,
            0x2001 => MapItemType::CodeItem,
            0x2002 => MapItemType::StringDataItem,
            0x2003 => MapItemType::DebugInfoItem,
            0x2004 => MapItemType::AnnotationItem,
            0x2005 => MapItemType::EncodedArrayItem,
            0x2006 => MapItemType::AnnotationsDirectoryItem,
            0xF000 => MapItemType::HiddenapiClassData,
            _ => return None,
        })
    }
}

/// One `map_item` row: 2 bytes type code, 2 bytes unused, item count, item
/// file offset. The type code is kept raw so unknown codes can be reported
/// without failing the parse.
#[derive(Debug, Clone, Copy)]
pub struct MapItem {
    pub type_code: u16,
    pub size: u32,
    pub offset: FileOffset,
}

/// Read the map list at `map_off`: a u32 entry count followed by 12-byte
/// entries.
pub fn read_map_list(data: &[u8], map_off: FileOffset, endian: Endianness) -> Result<Vec<MapItem>> {
    let map_off = map_off as usize;
    let count = read_u32(data, map_off, endian)? as usize;
    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        let entry = map_off + 4 + i * 12;
        items.push(MapItem {
            type_code: read_u16(data, entry, endian)?,
            size: read_u32(data, entry + 4, endian)?,
            offset: read_u32(data, entry + 8, endian)?,
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map_list() {
        let mut data = vec![0u8; 8];
        // count = 2
        data.extend_from_slice(&2u32.to_le_bytes());
        // string_id_item: 3 entries at 0x70
        data.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&0x70u32.to_le_bytes());
        // unknown type code survives reading
        data.extend_from_slice(&[0x34, 0x12, 0x00, 0x00]);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());

        let items = read_map_list(&data, 8, Endianness::LittleEndian).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            MapItemType::from_code(items[0].type_code),
            Some(MapItemType::StringIdItem)
        );
        assert_eq!(items[0].size, 3);
        assert_eq!(items[0].offset, 0x70);
        assert_eq!(MapItemType::from_code(items[1].type_code), None);
    }

    #[test]
    fn test_truncated_map_list() {
        let data = vec![0xFF; 4];
        assert!(read_map_list(&data, 2, Endianness::LittleEndian).is_err());
    }
}
