//! The container driver: parses a Dex byte blob into a fully resolved,
//! immutable [`DexFile`].
//!
//! The on-disk sections are not topologically ordered, so the map list is
//! collected first and then processed in dependency order: strings before
//! types, types before type lists and field/method/proto ids, prototypes
//! before methods, methods and fields before class data, class data and
//! encoded arrays before class definitions. Call sites and method handles
//! are decoded right before encoded arrays so encoded values can reference
//! them in resolved form.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::{debug, error, warn};

use super::encoded_value::{decode_array, ValuePools};
use super::{
    read_u16, read_u32, AccessFlags, DexCatchHandler, DexClassData, DexClassDef, DexCode,
    DexEncodedField, DexEncodedMethod, DexFieldId, DexHeader, DexMethodHandle, DexMethodId,
    DexPrototype, DexTryItem, DexType, Endianness, EncodedArray, FileOffset, MapItem, MapItemType,
    MethodHandleKind, MethodHandleTarget, TypeList, NO_INDEX,
};
use crate::dalvik::error::DexError;
use crate::dalvik::insns::{scan_payloads, PseudoInsns};
use crate::dalvik::leb128::{decode_sleb128_at, decode_uleb128, decode_uleb128_at};
use crate::dalvik::mutf8::decode_mutf8;
use crate::dalvik::dex::PseudoInsn;
use crate::Result;

/// A parsed Dex container. Immutable after construction; every pool entry is
/// owned here and shared out through `Arc`, so any number of threads may
/// disassemble against it concurrently.
pub struct DexFile {
    header: DexHeader,
    endianness: Endianness,

    strings: Vec<Arc<String>>,
    types: Vec<Arc<DexType>>,
    protos: Vec<Arc<DexPrototype>>,
    fields: Vec<Arc<DexFieldId>>,
    methods: Vec<Arc<DexMethodId>>,
    method_handles: Vec<Arc<DexMethodHandle>>,
    call_site_offs: Vec<FileOffset>,
    class_defs: Vec<DexClassDef>,

    pseudo_insns: PseudoInsns,
    insns_offsets: HashMap<u32, FileOffset>,
}

impl DexFile {
    /// Parse a complete Dex blob. Either every section resolves and the
    /// container is fully populated, or a typed error is returned.
    pub fn parse(data: &[u8]) -> Result<DexFile> {
        Parser::new(data)?.run()
    }

    pub fn header(&self) -> &DexHeader {
        &self.header
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The data section bounds from the header, for hosts that mark a
    /// segment around it.
    pub fn data_section(&self) -> (FileOffset, u32) {
        (self.header.data_off, self.header.data_size)
    }

    pub fn strings(&self) -> &[Arc<String>] {
        &self.strings
    }

    pub fn types(&self) -> &[Arc<DexType>] {
        &self.types
    }

    pub fn protos(&self) -> &[Arc<DexPrototype>] {
        &self.protos
    }

    pub fn fields(&self) -> &[Arc<DexFieldId>] {
        &self.fields
    }

    pub fn methods(&self) -> &[Arc<DexMethodId>] {
        &self.methods
    }

    pub fn method_handles(&self) -> &[Arc<DexMethodHandle>] {
        &self.method_handles
    }

    pub fn call_site_offs(&self) -> &[FileOffset] {
        &self.call_site_offs
    }

    pub fn class_defs(&self) -> &[DexClassDef] {
        &self.class_defs
    }

    pub fn get_string(&self, index: u32) -> Result<&Arc<String>> {
        pool_get(&self.strings, index, "string_ids")
    }

    pub fn get_type(&self, index: u32) -> Result<&Arc<DexType>> {
        pool_get(&self.types, index, "type_ids")
    }

    pub fn get_proto(&self, index: u32) -> Result<&Arc<DexPrototype>> {
        pool_get(&self.protos, index, "proto_ids")
    }

    pub fn get_field(&self, index: u32) -> Result<&Arc<DexFieldId>> {
        pool_get(&self.fields, index, "field_ids")
    }

    pub fn get_method(&self, index: u32) -> Result<&Arc<DexMethodId>> {
        pool_get(&self.methods, index, "method_ids")
    }

    pub fn get_method_handle(&self, index: u32) -> Result<&Arc<DexMethodHandle>> {
        pool_get(&self.method_handles, index, "method_handles")
    }

    /// The payload at `addr`, if the code walk found one there.
    pub fn pseudo_insn_at(&self, addr: FileOffset) -> Option<&PseudoInsn> {
        self.pseudo_insns.get(&addr)
    }

    /// File offset of the instruction stream bound to `method_idx`, if the
    /// method carries code.
    pub fn method_insns_off(&self, method_idx: u32) -> Option<FileOffset> {
        self.insns_offsets.get(&method_idx).copied()
    }
}

fn pool_get<'a, T>(pool: &'a [T], index: u32, name: &'static str) -> Result<&'a T> {
    pool.get(index as usize).ok_or(DexError::IndexOutOfBounds {
        index,
        max: pool.len(),
        pool: name,
    })
}

/// Sections that must exist for the container to be usable at all; their
/// absence is fatal. The remaining pools degrade to warnings.
const REQUIRED: &[MapItemType] = &[
    MapItemType::StringIdItem,
    MapItemType::TypeIdItem,
    MapItemType::ProtoIdItem,
    MapItemType::MethodIdItem,
    MapItemType::ClassDefItem,
    MapItemType::ClassDataItem,
    MapItemType::CodeItem,
];

struct Parser<'a> {
    data: &'a [u8],
    endian: Endianness,
    header: DexHeader,

    strings: Vec<Arc<String>>,
    types: Vec<Arc<DexType>>,
    protos: Vec<Arc<DexPrototype>>,
    fields: Vec<Arc<DexFieldId>>,
    methods: Vec<Arc<DexMethodId>>,
    method_handles: Vec<Arc<DexMethodHandle>>,
    call_site_offs: Vec<FileOffset>,
    class_defs: Vec<DexClassDef>,

    // Offset-keyed collaborators, dropped once cross-linking is done.
    type_lists: BTreeMap<FileOffset, Arc<TypeList>>,
    code_items: BTreeMap<FileOffset, Arc<DexCode>>,
    class_data_items: BTreeMap<FileOffset, DexClassData>,
    encoded_arrays: BTreeMap<FileOffset, Arc<EncodedArray>>,

    pseudo_insns: PseudoInsns,
    insns_offsets: HashMap<u32, FileOffset>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Result<Parser<'a>> {
        let (header, endian) = DexHeader::parse(data)?;
        if endian == Endianness::BigEndian {
            warn!("big-endian dex file; support is best-effort");
        }
        Ok(Parser {
            data,
            endian,
            header,
            strings: Vec::new(),
            types: Vec::new(),
            protos: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            method_handles: Vec::new(),
            call_site_offs: Vec::new(),
            class_defs: Vec::new(),
            type_lists: BTreeMap::new(),
            code_items: BTreeMap::new(),
            class_data_items: BTreeMap::new(),
            encoded_arrays: BTreeMap::new(),
            pseudo_insns: PseudoInsns::new(),
            insns_offsets: HashMap::new(),
        })
    }

    fn run(mut self) -> Result<DexFile> {
        let mut map: BTreeMap<u16, MapItem> = BTreeMap::new();
        for item in super::read_map_list(self.data, self.header.map_off, self.endian)? {
            map.insert(item.type_code, item);
        }

        // The header was already consumed and the map list is what we are
        // walking right now.
        map.remove(&(MapItemType::HeaderItem as u16));
        map.remove(&(MapItemType::MapList as u16));

        let string_ids = take_section(&mut map, MapItemType::StringIdItem)?;
        let string_data = map.remove(&(MapItemType::StringDataItem as u16));
        let type_ids = take_section(&mut map, MapItemType::TypeIdItem)?;
        let type_lists = take_section(&mut map, MapItemType::TypeList)?;
        let proto_ids = take_section(&mut map, MapItemType::ProtoIdItem)?;
        let method_ids = take_section(&mut map, MapItemType::MethodIdItem)?;
        let field_ids = take_section(&mut map, MapItemType::FieldIdItem)?;
        let code_items = take_section(&mut map, MapItemType::CodeItem)?;
        let class_data = take_section(&mut map, MapItemType::ClassDataItem)?;
        let call_sites = take_section(&mut map, MapItemType::CallSiteIdItem)?;
        let method_handles = take_section(&mut map, MapItemType::MethodHandleItem)?;
        let encoded_arrays = take_section(&mut map, MapItemType::EncodedArrayItem)?;
        let class_defs = take_section(&mut map, MapItemType::ClassDefItem)?;

        if string_data.is_none() {
            // String data is reached through string_ids; the map entry is
            // only informational.
            debug!("map list carries no string_data_item entry");
        }

        if let Some(mi) = string_ids {
            self.parse_string_ids(mi)?;
        }
        if let Some(mi) = type_ids {
            self.parse_type_ids(mi)?;
        }
        if let Some(mi) = type_lists {
            self.parse_type_lists(mi)?;
        }
        if let Some(mi) = proto_ids {
            self.parse_proto_ids(mi)?;
        }
        if let Some(mi) = method_ids {
            self.parse_method_ids(mi)?;
        }
        if let Some(mi) = field_ids {
            self.parse_field_ids(mi)?;
        }
        if let Some(mi) = code_items {
            self.parse_code_items(mi)?;
        }
        if let Some(mi) = class_data {
            self.parse_class_data(mi)?;
        }
        if let Some(mi) = call_sites {
            self.parse_call_site_ids(mi)?;
        }
        if let Some(mi) = method_handles {
            self.parse_method_handles(mi)?;
        }
        if let Some(mi) = encoded_arrays {
            self.parse_encoded_arrays(mi)?;
        }
        if let Some(mi) = class_defs {
            self.parse_class_defs(mi)?;
        }

        // Annotations and debug info are accepted and skipped.
        for skipped in [
            MapItemType::AnnotationItem,
            MapItemType::AnnotationsDirectoryItem,
            MapItemType::AnnotationSetItem,
            MapItemType::AnnotationSetRefList,
            MapItemType::DebugInfoItem,
        ] {
            if let Some(item) = map.remove(&(skipped as u16)) {
                debug!(
                    "skipping {} {} item(s)",
                    item.size,
                    section_name(skipped)
                );
            } else {
                warn!("no {} section", section_name(skipped));
            }
        }
        if let Some(item) = map.remove(&(MapItemType::HiddenapiClassData as u16)) {
            debug!("skipping hiddenapi class data ({} bytes)", item.size);
        }
        for leftover in map.keys() {
            error!("unknown map item type {leftover:#06x}");
        }

        Ok(DexFile {
            header: self.header,
            endianness: self.endian,
            strings: self.strings,
            types: self.types,
            protos: self.protos,
            fields: self.fields,
            methods: self.methods,
            method_handles: self.method_handles,
            call_site_offs: self.call_site_offs,
            class_defs: self.class_defs,
            pseudo_insns: self.pseudo_insns,
            insns_offsets: self.insns_offsets,
        })
    }

    fn u16_at(&self, offset: usize) -> Result<u16> {
        read_u16(self.data, offset, self.endian)
    }

    fn u32_at(&self, offset: usize) -> Result<u32> {
        read_u32(self.data, offset, self.endian)
    }

    fn pools(&self) -> ValuePools<'_> {
        ValuePools {
            strings: &self.strings,
            types: &self.types,
            protos: &self.protos,
            fields: &self.fields,
            methods: &self.methods,
            method_handles: &self.method_handles,
        }
    }

    fn parse_string_ids(&mut self, mi: MapItem) -> Result<()> {
        self.strings.reserve(mi.size as usize);
        for i in 0..mi.size as usize {
            let data_off = self.u32_at(mi.offset as usize + i * 4)? as usize;
            if data_off >= self.data.len() {
                return Err(DexError::TruncatedInput {
                    what: "string data",
                    offset: data_off,
                    needed: 1,
                    available: self.data.len(),
                });
            }
            let (utf16_len, len_size) = decode_uleb128(&self.data[data_off..])?;
            let (text, _) = decode_mutf8(&self.data[data_off + len_size..])?;
            let actual = text.encode_utf16().count();
            if actual != utf16_len as usize {
                warn!(
                    "string {i} at offset {data_off} has utf16 length {actual}, header says {utf16_len}"
                );
            }
            self.strings.push(Arc::new(text));
        }
        Ok(())
    }

    fn parse_type_ids(&mut self, mi: MapItem) -> Result<()> {
        self.types.reserve(mi.size as usize);
        for i in 0..mi.size as usize {
            let descriptor_idx = self.u32_at(mi.offset as usize + i * 4)?;
            let descriptor = pool_get(&self.strings, descriptor_idx, "string_ids")?;
            self.types.push(Arc::new(DexType::new(descriptor)));
        }
        Ok(())
    }

    fn parse_type_lists(&mut self, mi: MapItem) -> Result<()> {
        let mut pos = mi.offset as usize;
        for _ in 0..mi.size {
            // Each list is 4-byte aligned.
            pos += (4 - pos % 4) % 4;
            let list_off = pos as FileOffset;
            let count = self.u32_at(pos)? as usize;
            pos += 4;
            let mut list: TypeList = Vec::with_capacity(count);
            for _ in 0..count {
                let type_idx = self.u16_at(pos)? as u32;
                list.push(pool_get(&self.types, type_idx, "type_ids")?.clone());
                pos += 2;
            }
            self.type_lists.insert(list_off, Arc::new(list));
        }
        Ok(())
    }

    fn parse_proto_ids(&mut self, mi: MapItem) -> Result<()> {
        let empty: Arc<TypeList> = Arc::new(Vec::new());
        self.protos.reserve(mi.size as usize);
        for i in 0..mi.size as usize {
            let base = mi.offset as usize + i * 12;
            let shorty_idx = self.u32_at(base)?;
            let return_type_idx = self.u32_at(base + 4)?;
            let parameters_off = self.u32_at(base + 8)?;

            let shorty = pool_get(&self.strings, shorty_idx, "string_ids")?.clone();
            let return_type = pool_get(&self.types, return_type_idx, "type_ids")?.clone();
            let parameters = if parameters_off == 0 {
                empty.clone()
            } else {
                match self.type_lists.get(&parameters_off) {
                    Some(list) => list.clone(),
                    None => {
                        warn!("proto {i} references missing type list at {parameters_off}");
                        empty.clone()
                    }
                }
            };

            if shorty.len().saturating_sub(1) != parameters.len() {
                warn!(
                    "proto {i}: shorty {:?} does not match its {} parameter(s)",
                    shorty,
                    parameters.len()
                );
            }
            self.protos.push(Arc::new(DexPrototype {
                shorty,
                return_type,
                parameters,
            }));
        }
        Ok(())
    }

    fn parse_field_ids(&mut self, mi: MapItem) -> Result<()> {
        self.fields.reserve(mi.size as usize);
        for i in 0..mi.size as usize {
            let base = mi.offset as usize + i * 8;
            let class_idx = self.u16_at(base)? as u32;
            let type_idx = self.u16_at(base + 2)? as u32;
            let name_idx = self.u32_at(base + 4)?;
            self.fields.push(Arc::new(DexFieldId {
                class: pool_get(&self.types, class_idx, "type_ids")?.clone(),
                type_: pool_get(&self.types, type_idx, "type_ids")?.clone(),
                name: pool_get(&self.strings, name_idx, "string_ids")?.clone(),
            }));
        }
        Ok(())
    }

    fn parse_method_ids(&mut self, mi: MapItem) -> Result<()> {
        self.methods.reserve(mi.size as usize);
        for i in 0..mi.size as usize {
            let base = mi.offset as usize + i * 8;
            let class_idx = self.u16_at(base)? as u32;
            let proto_idx = self.u16_at(base + 2)? as u32;
            let name_idx = self.u32_at(base + 4)?;
            self.methods.push(Arc::new(DexMethodId {
                class: pool_get(&self.types, class_idx, "type_ids")?.clone(),
                proto: pool_get(&self.protos, proto_idx, "proto_ids")?.clone(),
                name: pool_get(&self.strings, name_idx, "string_ids")?.clone(),
            }));
        }
        Ok(())
    }

    fn parse_code_items(&mut self, mi: MapItem) -> Result<()> {
        let mut pos = mi.offset as usize;
        for _ in 0..mi.size {
            // Code items start on 4-byte boundaries; zero padding in between.
            pos += (4 - pos % 4) % 4;
            let item_off = pos as FileOffset;

            let registers_size = self.u16_at(pos)?;
            let ins_size = self.u16_at(pos + 2)?;
            let outs_size = self.u16_at(pos + 4)?;
            let tries_size = self.u16_at(pos + 6)?;
            let debug_info_off = self.u32_at(pos + 8)?;
            let insns_size = self.u32_at(pos + 12)? as usize;

            let insns_off = (pos + 16) as FileOffset;
            let mut insns = Vec::with_capacity(insns_size);
            for u in 0..insns_size {
                insns.push(self.u16_at(pos + 16 + u * 2)?);
            }
            pos += 16 + insns_size * 2;

            // "Two bytes of padding, only present if tries_size is non-zero
            // and insns_size is odd."
            if tries_size > 0 && insns_size % 2 == 1 {
                pos += 2;
            }

            let mut tries = Vec::new();
            if tries_size > 0 {
                let tries_off = pos;
                pos += tries_size as usize * 8;

                // The handler list follows the try entries; tries reference
                // handlers by offset relative to the list start.
                let list_off = pos;
                let list_size = decode_uleb128_at(self.data, &mut pos)?;
                let mut handlers: HashMap<usize, Arc<DexCatchHandler>> = HashMap::new();
                for _ in 0..list_size {
                    let handler_off = pos - list_off;
                    let size = decode_sleb128_at(self.data, &mut pos)?;
                    let mut typed = Vec::with_capacity(size.unsigned_abs() as usize);
                    for _ in 0..size.unsigned_abs() {
                        let type_idx = decode_uleb128_at(self.data, &mut pos)?;
                        let addr = decode_uleb128_at(self.data, &mut pos)?;
                        typed.push((pool_get(&self.types, type_idx, "type_ids")?.clone(), addr));
                    }
                    let catch_all_addr = if size <= 0 {
                        Some(decode_uleb128_at(self.data, &mut pos)?)
                    } else {
                        None
                    };
                    handlers.insert(
                        handler_off,
                        Arc::new(DexCatchHandler {
                            size,
                            handlers: typed,
                            catch_all_addr,
                        }),
                    );
                }

                for t in 0..tries_size as usize {
                    let entry = tries_off + t * 8;
                    let start_addr = self.u32_at(entry)?;
                    let insn_count = self.u16_at(entry + 4)?;
                    let handler_off = self.u16_at(entry + 6)? as usize;
                    match handlers.get(&handler_off) {
                        Some(handler) => tries.push(DexTryItem {
                            start_addr,
                            insn_count,
                            handler: handler.clone(),
                        }),
                        None => warn!(
                            "try entry {t} of code item at {item_off} references missing \
                             handler offset {handler_off}"
                        ),
                    }
                }
            }

            scan_payloads(&insns, insns_off, &mut self.pseudo_insns);

            self.code_items.insert(
                item_off,
                Arc::new(DexCode {
                    registers_size,
                    ins_size,
                    outs_size,
                    debug_info_off,
                    insns,
                    insns_off,
                    tries,
                }),
            );
        }
        Ok(())
    }

    fn parse_encoded_fields(
        &self,
        pos: &mut usize,
        count: u32,
    ) -> Result<Vec<DexEncodedField>> {
        let mut fields = Vec::with_capacity(count as usize);
        let mut field_idx = 0u32;
        for _ in 0..count {
            field_idx = field_idx.wrapping_add(decode_uleb128_at(self.data, pos)?);
            let access_flags = decode_uleb128_at(self.data, pos)?;
            fields.push(DexEncodedField {
                field_idx,
                field: pool_get(&self.fields, field_idx, "field_ids")?.clone(),
                access_flags: AccessFlags::from_bits_retain(access_flags),
            });
        }
        Ok(fields)
    }

    fn parse_encoded_methods(
        &mut self,
        pos: &mut usize,
        count: u32,
    ) -> Result<Vec<DexEncodedMethod>> {
        let mut methods = Vec::with_capacity(count as usize);
        let mut method_idx = 0u32;
        for _ in 0..count {
            method_idx = method_idx.wrapping_add(decode_uleb128_at(self.data, pos)?);
            let access_flags = decode_uleb128_at(self.data, pos)?;
            let code_off = decode_uleb128_at(self.data, pos)?;

            let code = if code_off == 0 {
                None
            } else {
                // Every method gets at most one instruction stream; a second
                // binding with a different offset keeps the first.
                let insns_off = code_off + 16;
                match self.insns_offsets.get(&method_idx).copied() {
                    Some(existing) if existing != insns_off => warn!(
                        "more than one code block assigned to method {method_idx}; \
                         keeping {existing:#x}, ignoring {insns_off:#x}"
                    ),
                    _ => {
                        self.insns_offsets.insert(method_idx, insns_off);
                    }
                }
                match self.code_items.get(&code_off) {
                    Some(code) => Some(code.clone()),
                    None => {
                        warn!("method {method_idx} references missing code item at {code_off}");
                        None
                    }
                }
            };

            methods.push(DexEncodedMethod {
                method_idx,
                method: pool_get(&self.methods, method_idx, "method_ids")?.clone(),
                access_flags: AccessFlags::from_bits_retain(access_flags),
                code,
            });
        }
        Ok(methods)
    }

    fn parse_class_data(&mut self, mi: MapItem) -> Result<()> {
        let mut pos = mi.offset as usize;
        for _ in 0..mi.size {
            let item_off = pos as FileOffset;
            let static_fields_size = decode_uleb128_at(self.data, &mut pos)?;
            let instance_fields_size = decode_uleb128_at(self.data, &mut pos)?;
            let direct_methods_size = decode_uleb128_at(self.data, &mut pos)?;
            let virtual_methods_size = decode_uleb128_at(self.data, &mut pos)?;

            let static_fields = self.parse_encoded_fields(&mut pos, static_fields_size)?;
            let instance_fields = self.parse_encoded_fields(&mut pos, instance_fields_size)?;
            let direct_methods = self.parse_encoded_methods(&mut pos, direct_methods_size)?;
            let virtual_methods = self.parse_encoded_methods(&mut pos, virtual_methods_size)?;

            self.class_data_items.insert(
                item_off,
                DexClassData {
                    static_fields,
                    instance_fields,
                    direct_methods,
                    virtual_methods,
                },
            );
        }
        Ok(())
    }

    fn parse_call_site_ids(&mut self, mi: MapItem) -> Result<()> {
        for i in 0..mi.size as usize {
            self.call_site_offs
                .push(self.u32_at(mi.offset as usize + i * 4)?);
        }
        Ok(())
    }

    fn parse_method_handles(&mut self, mi: MapItem) -> Result<()> {
        for i in 0..mi.size as usize {
            let base = mi.offset as usize + i * 8;
            let kind = MethodHandleKind::from_code(self.u16_at(base)?)?;
            let id = self.u16_at(base + 4)? as u32;
            let target = if kind.is_field_accessor() {
                MethodHandleTarget::Field(pool_get(&self.fields, id, "field_ids")?.clone())
            } else {
                MethodHandleTarget::Method(pool_get(&self.methods, id, "method_ids")?.clone())
            };
            self.method_handles
                .push(Arc::new(DexMethodHandle { kind, target }));
        }
        Ok(())
    }

    fn parse_encoded_arrays(&mut self, mi: MapItem) -> Result<()> {
        let mut pos = mi.offset as usize;
        for _ in 0..mi.size {
            let item_off = pos as FileOffset;
            let array = decode_array(&self.pools(), self.data, &mut pos)?;
            self.encoded_arrays.insert(item_off, Arc::new(array));
        }
        Ok(())
    }

    fn parse_class_defs(&mut self, mi: MapItem) -> Result<()> {
        self.class_defs.reserve(mi.size as usize);
        for i in 0..mi.size as usize {
            let base = mi.offset as usize + i * 32;
            let class_idx = self.u32_at(base)?;
            let access_flags = self.u32_at(base + 4)?;
            let superclass_idx = self.u32_at(base + 8)?;
            let interfaces_off = self.u32_at(base + 12)?;
            let source_file_idx = self.u32_at(base + 16)?;
            let annotations_off = self.u32_at(base + 20)?;
            let class_data_off = self.u32_at(base + 24)?;
            let static_values_off = self.u32_at(base + 28)?;

            let superclass = if superclass_idx == NO_INDEX {
                None
            } else {
                Some(pool_get(&self.types, superclass_idx, "type_ids")?.clone())
            };
            let interfaces = if interfaces_off == 0 {
                None
            } else {
                let list = self.type_lists.get(&interfaces_off).cloned();
                if list.is_none() {
                    warn!("class def {i} references missing type list at {interfaces_off}");
                }
                list
            };
            let source_file = if source_file_idx == NO_INDEX {
                None
            } else {
                Some(pool_get(&self.strings, source_file_idx, "string_ids")?.clone())
            };
            let class_data = if class_data_off == 0 {
                None
            } else {
                let data = self.class_data_items.remove(&class_data_off);
                if data.is_none() {
                    warn!("class def {i} references missing class data at {class_data_off}");
                }
                data
            };
            let static_values = if static_values_off == 0 {
                None
            } else {
                let values = self.encoded_arrays.get(&static_values_off).cloned();
                if values.is_none() {
                    warn!(
                        "class def {i} references missing encoded array at {static_values_off}"
                    );
                }
                values
            };

            self.class_defs.push(DexClassDef {
                class_type: pool_get(&self.types, class_idx, "type_ids")?.clone(),
                access_flags: AccessFlags::from_bits_retain(access_flags),
                superclass,
                interfaces,
                source_file,
                annotations_off: match annotations_off {
                    0 => None,
                    off => Some(off),
                },
                class_data,
                static_values,
            });
        }
        Ok(())
    }
}

fn take_section(
    map: &mut BTreeMap<u16, MapItem>,
    t: MapItemType,
) -> Result<Option<MapItem>> {
    match map.remove(&(t as u16)) {
        Some(item) => Ok(Some(item)),
        None if REQUIRED.contains(&t) => Err(DexError::MissingSection {
            section: section_name(t),
        }),
        None => {
            warn!("no {} section", section_name(t));
            Ok(None)
        }
    }
}

fn section_name(t: MapItemType) -> &'static str {
    match t {
        MapItemType::HeaderItem => "header_item",
        MapItemType::StringIdItem => "string_id_item",
        MapItemType::TypeIdItem => "type_id_item",
        MapItemType::ProtoIdItem => "proto_id_item",
        MapItemType::FieldIdItem => "field_id_item",
        MapItemType::MethodIdItem => "method_id_item",
        MapItemType::ClassDefItem => "class_def_item",
        MapItemType::CallSiteIdItem => "call_site_id_item",
        MapItemType::MethodHandleItem => "method_handle_item",
        MapItemType::MapList => "map_list",
        MapItemType::TypeList => "type_list",
        MapItemType::AnnotationSetRefList => "annotation_set_ref_list",
        MapItemType::AnnotationSetItem => "annotation_set_item",
        MapItemType::ClassDataItem => "class_data_item",
        MapItemType::CodeItem => "code_item",
        MapItemType::StringDataItem => "string_data_item",
        MapItemType::DebugInfoItem => "debug_info_item",
        MapItemType::AnnotationItem => "annotation_item",
        MapItemType::EncodedArrayItem => "encoded_array_item",
        MapItemType::AnnotationsDirectoryItem => "annotations_directory_item",
        MapItemType::HiddenapiClassData => "hiddenapi_class_data",
    }
}
