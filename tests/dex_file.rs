//! End-to-end tests over a synthetic in-memory Dex: one class `Lfoo/Bar;`
//! with four small methods exercising parsing, disassembly, control-flow
//! summaries and the smali writer.

use dexdis::dalvik::dex::{DexFile, FlagContext, PseudoInsn};
use dexdis::dalvik::mutf8::encode_mutf8;
use dexdis::smali::{BranchKind, SmaliWrite, Token, TokenKind};

const NO_INDEX: u32 = 0xFFFF_FFFF;

fn push_uleb(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

fn align4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

struct SampleDex {
    data: Vec<u8>,
    insns_offs: [u32; 4],
}

/// Builds a little-endian dex with strings, types, one proto, four methods
/// (`return-void`, `goto +0x10`, a packed-switch body, an invoke-virtual)
/// and a single class definition carrying them all.
fn build_sample_dex() -> SampleDex {
    let strings = [
        "Lfoo/Bar;",
        "Ljava/lang/Object;",
        "V",
        "m0",
        "m1",
        "m2",
        "m3",
    ];
    let bodies: [&[u16]; 4] = [
        // m0: return-void
        &[0x000E],
        // m1: goto +0x10
        &[0x1028],
        // m2: packed-switch v0, +4; return-void; payload (size 2, key 10)
        &[
            0x002B, 0x0004, 0x0000, // packed-switch v0, +BBBBBBBB=4
            0x000E, // return-void
            0x0100, 0x0002, // ident, size
            0x000A, 0x0000, // first_key = 10
            0x0040, 0x0000, // target 0x40
            0x0080, 0x0000, // target 0x80
        ],
        // m3: invoke-virtual {v0}, meth@0000; return-void
        &[0x106E, 0x0000, 0x0000, 0x000E],
    ];

    let mut d = vec![0u8; 112];

    // string data
    let mut string_offs = Vec::new();
    for s in strings {
        string_offs.push(d.len() as u32);
        push_uleb(&mut d, s.encode_utf16().count() as u32);
        d.extend(encode_mutf8(s));
    }

    align4(&mut d);
    let string_ids_off = d.len() as u32;
    for off in &string_offs {
        d.extend(off.to_le_bytes());
    }

    let type_ids_off = d.len() as u32;
    for descriptor_idx in [0u32, 1, 2] {
        d.extend(descriptor_idx.to_le_bytes());
    }

    // proto ()V: shorty "V"
    let proto_ids_off = d.len() as u32;
    d.extend(2u32.to_le_bytes()); // shorty_idx
    d.extend(2u32.to_le_bytes()); // return_type_idx
    d.extend(0u32.to_le_bytes()); // parameters_off

    let method_ids_off = d.len() as u32;
    for name_idx in [3u32, 4, 5, 6] {
        d.extend(0u16.to_le_bytes()); // class_idx
        d.extend(0u16.to_le_bytes()); // proto_idx
        d.extend(name_idx.to_le_bytes());
    }

    align4(&mut d);
    let code_items_off = d.len() as u32;
    let mut code_offs = [0u32; 4];
    let mut insns_offs = [0u32; 4];
    for (i, body) in bodies.iter().enumerate() {
        align4(&mut d);
        code_offs[i] = d.len() as u32;
        insns_offs[i] = code_offs[i] + 16;
        d.extend(1u16.to_le_bytes()); // registers_size
        d.extend(1u16.to_le_bytes()); // ins_size
        d.extend(0u16.to_le_bytes()); // outs_size
        d.extend(0u16.to_le_bytes()); // tries_size
        d.extend(0u32.to_le_bytes()); // debug_info_off
        d.extend((body.len() as u32).to_le_bytes());
        for unit in body.iter() {
            d.extend(unit.to_le_bytes());
        }
    }

    let class_data_off = d.len() as u32;
    push_uleb(&mut d, 0); // static fields
    push_uleb(&mut d, 0); // instance fields
    push_uleb(&mut d, 4); // direct methods
    push_uleb(&mut d, 0); // virtual methods
    for (i, code_off) in code_offs.iter().enumerate() {
        push_uleb(&mut d, if i == 0 { 0 } else { 1 }); // method_idx_diff
        push_uleb(&mut d, 0x1); // ACC_PUBLIC
        push_uleb(&mut d, *code_off);
    }

    align4(&mut d);
    let class_defs_off = d.len() as u32;
    d.extend(0u32.to_le_bytes()); // class_idx -> Lfoo/Bar;
    d.extend(1u32.to_le_bytes()); // access_flags: public
    d.extend(1u32.to_le_bytes()); // superclass_idx -> Ljava/lang/Object;
    d.extend(0u32.to_le_bytes()); // interfaces_off
    d.extend(NO_INDEX.to_le_bytes()); // source_file_idx
    d.extend(0u32.to_le_bytes()); // annotations_off
    d.extend(class_data_off.to_le_bytes());
    d.extend(0u32.to_le_bytes()); // static_values_off

    align4(&mut d);
    let map_off = d.len() as u32;
    let entries: [(u16, u32, u32); 9] = [
        (0x0000, 1, 0),                    // header
        (0x0001, 7, string_ids_off),       // string_ids
        (0x0002, 3, type_ids_off),         // type_ids
        (0x0003, 1, proto_ids_off),        // proto_ids
        (0x0005, 4, method_ids_off),       // method_ids
        (0x2001, 4, code_items_off),       // code_items
        (0x2000, 1, class_data_off),       // class_data
        (0x0006, 1, class_defs_off),       // class_defs
        (0x1000, 1, map_off),              // map list
    ];
    d.extend((entries.len() as u32).to_le_bytes());
    for (type_code, size, offset) in entries {
        d.extend(type_code.to_le_bytes());
        d.extend(0u16.to_le_bytes());
        d.extend(size.to_le_bytes());
        d.extend(offset.to_le_bytes());
    }

    // header: magic, endian tag, map_off, file size
    d[0..8].copy_from_slice(b"dex\n035\0");
    let file_size = (d.len() as u32).to_le_bytes();
    d[32..36].copy_from_slice(&file_size);
    d[36..40].copy_from_slice(&112u32.to_le_bytes());
    d[40..44].copy_from_slice(&[0x78, 0x56, 0x34, 0x12]);
    d[52..56].copy_from_slice(&map_off.to_le_bytes());
    d[56..60].copy_from_slice(&7u32.to_le_bytes());
    d[60..64].copy_from_slice(&string_ids_off.to_le_bytes());
    d[64..68].copy_from_slice(&3u32.to_le_bytes());
    d[68..72].copy_from_slice(&type_ids_off.to_le_bytes());
    d[72..76].copy_from_slice(&1u32.to_le_bytes());
    d[76..80].copy_from_slice(&proto_ids_off.to_le_bytes());
    d[88..92].copy_from_slice(&4u32.to_le_bytes());
    d[92..96].copy_from_slice(&method_ids_off.to_le_bytes());
    d[96..100].copy_from_slice(&1u32.to_le_bytes());
    d[100..104].copy_from_slice(&class_defs_off.to_le_bytes());

    SampleDex {
        data: d,
        insns_offs,
    }
}

#[test]
fn test_parse_resolves_all_pools() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();

    assert_eq!(df.strings().len(), 7);
    assert_eq!(df.types().len(), 3);
    assert_eq!(df.protos().len(), 1);
    assert_eq!(df.methods().len(), 4);
    assert_eq!(df.class_defs().len(), 1);

    let proto = df.get_proto(0).unwrap();
    assert_eq!(proto.shorty.as_str(), "V");
    assert_eq!(proto.return_type.descriptor, "V");
    assert!(proto.parameters.is_empty());

    let method = df.get_method(0).unwrap();
    assert_eq!(method.class.descriptor, "Lfoo/Bar;");
    assert_eq!(method.name.as_str(), "m0");

    let class = &df.class_defs()[0];
    assert_eq!(class.class_type.descriptor, "Lfoo/Bar;");
    assert_eq!(
        class.superclass.as_ref().unwrap().descriptor,
        "Ljava/lang/Object;"
    );
    assert!(class.source_file.is_none());
    assert!(class.interfaces.is_none());
    assert_eq!(
        class.access_flags.render(FlagContext::Class).unwrap(),
        "public "
    );

    let class_data = class.class_data.as_ref().unwrap();
    assert_eq!(class_data.direct_methods.len(), 4);
    for (i, method) in class_data.direct_methods.iter().enumerate() {
        assert_eq!(method.method_idx, i as u32);
        let code = method.code.as_ref().unwrap();
        assert_eq!(code.insns_off, sample.insns_offs[i]);
        assert_eq!(df.method_insns_off(i as u32), Some(sample.insns_offs[i]));
    }
}

#[test]
fn test_disassemble_return_void() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();

    let (tokens, size) = df.disassemble(&[0x0E, 0x00], sample.insns_offs[0]);
    assert_eq!(size, 2);
    assert_eq!(tokens, vec![Token::instruction("return-void")]);
}

#[test]
fn test_goto_instruction_info() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();
    let addr = sample.insns_offs[1];

    let info = df.instruction_info(&[0x28, 0x10], addr);
    assert_eq!(info.length, 2);
    assert_eq!(info.branches.len(), 1);
    assert_eq!(info.branches[0].kind, BranchKind::UnconditionalBranch);
    assert_eq!(info.branches[0].target, Some(addr as u64 + 0x20));

    let (tokens, size) = df.disassemble(&[0x28, 0x10], addr);
    assert_eq!(size, 2);
    assert_eq!(tokens[0], Token::instruction("goto"));
    assert_eq!(tokens[1], Token::text(" "));
    assert_eq!(tokens[2], Token::text("+"));
    assert_eq!(tokens[3].kind, TokenKind::PossibleAddress);
    assert_eq!(tokens[3].text, "10");
}

#[test]
fn test_packed_switch_payload_and_lengths() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();
    let insns_off = sample.insns_offs[2];

    // The payload sits 4 code units into the stream.
    let payload_addr = insns_off + 8;
    match df.pseudo_insn_at(payload_addr) {
        Some(PseudoInsn::PackedSwitch { first_key, targets }) => {
            assert_eq!(*first_key, 10);
            assert_eq!(targets, &vec![0x40, 0x80]);
        }
        other => panic!("expected packed-switch payload, got {:?}", other),
    }
    assert_eq!(df.pseudo_insn_at(payload_addr).unwrap().total_size(), 16);

    // Walk the stream with instruction_info; lengths must cover it exactly.
    let class = &df.class_defs()[0];
    let code = class.class_data.as_ref().unwrap().direct_methods[2]
        .code
        .as_ref()
        .unwrap();
    let bytes = code.insns_bytes();
    let mut total = 0usize;
    while total < bytes.len() {
        let info = df.instruction_info(&bytes[total..], insns_off + total as u32);
        assert!(info.length > 0);
        total += info.length;
    }
    assert_eq!(total, 2 * code.insns.len());

    // The switch instruction itself defers its fan-out.
    let info = df.instruction_info(&bytes, insns_off);
    assert_eq!(info.length, 6);
    assert_eq!(info.branches.len(), 1);
    assert_eq!(info.branches[0].kind, BranchKind::UnresolvedBranch);

    // The payload renders as a labeled block and consumes its total size.
    let (tokens, size) = df.disassemble(&bytes[8..], payload_addr);
    assert_eq!(size, 16);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Instruction);
    assert_eq!(
        tokens[0].text,
        ".packed-switch 0xa\n        :pswitch_offset_40\n        :pswitch_offset_80\n    .end packed-switch"
    );

    // The payload reports as a sweep terminator.
    let info = df.instruction_info(&bytes[8..], payload_addr);
    assert_eq!(info.length, 16);
    assert_eq!(info.branches[0].kind, BranchKind::FunctionReturn);
}

#[test]
fn test_invoke_virtual_rendering_and_call_target() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();
    let addr = sample.insns_offs[3];

    let bytes = [0x6E, 0x10, 0x00, 0x00, 0x00, 0x00];
    let (tokens, size) = df.disassemble(&bytes, addr);
    assert_eq!(size, 6);

    let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(text, "invoke-virtual {v0}, Lfoo/Bar;->m0()V");

    // The method name resolves to the callee's instruction stream offset.
    let name = tokens
        .iter()
        .find(|t| t.text == "m0")
        .expect("method name token");
    assert_eq!(name.kind, TokenKind::PossibleAddress);
    assert_eq!(name.value, Some(sample.insns_offs[0] as u64));

    let info = df.instruction_info(&bytes, addr);
    assert_eq!(info.length, 6);
    assert_eq!(info.branches.len(), 1);
    assert_eq!(info.branches[0].kind, BranchKind::CallDestination);
    assert_eq!(info.branches[0].target, Some(sample.insns_offs[0] as u64));
}

#[test]
fn test_short_read_consumes_nothing() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();

    let (tokens, size) = df.disassemble(&[0x0E], 0);
    assert!(tokens.is_empty());
    assert_eq!(size, 0);

    // A 3-unit instruction with only one unit available.
    let (tokens, size) = df.disassemble(&[0x2B, 0x00], 0);
    assert!(tokens.is_empty());
    assert_eq!(size, 0);
}

#[test]
fn test_unknown_pseudo_instruction_skips_two_bytes() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();

    let (tokens, size) = df.disassemble(&[0x00, 0x04, 0x00, 0x00], 0);
    assert!(tokens.is_empty());
    assert_eq!(size, 2);
}

#[test]
fn test_write_class_smali() {
    let sample = build_sample_dex();
    let df = DexFile::parse(&sample.data).unwrap();

    let mut out: Vec<u8> = Vec::new();
    out.write_class(&df, &df.class_defs()[0], true).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with(".class public Lfoo/Bar;\n.super Ljava/lang/Object;\n"));
    assert!(text.contains("# direct methods"));
    assert!(text.contains(".method public m0()V\n    .registers 1\n"));
    assert!(text.contains("\n    return-void\n"));
    assert!(text.contains("invoke-virtual {v0}, Lfoo/Bar;->m0()V"));
    assert!(text.contains(".end method"));
    assert!(text.contains(".packed-switch 0xa"));
}

#[test]
fn test_missing_required_section_is_fatal() {
    let sample = build_sample_dex();
    let mut data = sample.data.clone();

    // Blank out the method_ids map entry's type code so the section
    // disappears from the map list.
    let map_off = u32::from_le_bytes(data[52..56].try_into().unwrap()) as usize;
    let count = u32::from_le_bytes(data[map_off..map_off + 4].try_into().unwrap()) as usize;
    for i in 0..count {
        let entry = map_off + 4 + i * 12;
        let type_code = u16::from_le_bytes(data[entry..entry + 2].try_into().unwrap());
        if type_code == 0x0005 {
            // Turn it into an (ignored) unknown section.
            data[entry..entry + 2].copy_from_slice(&0x7777u16.to_le_bytes());
        }
    }

    assert!(DexFile::parse(&data).is_err());
}

#[test]
fn test_invalid_endian_tag_is_fatal() {
    let sample = build_sample_dex();
    let mut data = sample.data.clone();
    data[40..44].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(DexFile::parse(&data).is_err());
}
