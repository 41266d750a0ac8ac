//! Locating and decoding the embedded payload blocks of a code stream.
//!
//! A payload starts with an ident unit whose low byte is 0x00 and whose high
//! byte selects the kind (1 packed-switch, 2 sparse-switch, 3
//! fill-array-data). Payload sizes depend on their own parameters, so the
//! stream has to be walked linearly from the start of the code item to find
//! them.

use std::collections::HashMap;

use log::warn;

use super::InsnDescriptor;
use crate::dalvik::dex::{FileOffset, PseudoInsn};

pub const PACKED_SWITCH_IDENT: u16 = 0x0100;
pub const SPARSE_SWITCH_IDENT: u16 = 0x0200;
pub const FILL_ARRAY_DATA_IDENT: u16 = 0x0300;

/// Map of payload file offsets to decoded payloads.
pub type PseudoInsns = HashMap<FileOffset, PseudoInsn>;

#[inline(always)]
fn read_i32(insns: &[u16], unit: usize) -> i32 {
    (insns[unit] as u32 | ((insns[unit + 1] as u32) << 16)) as i32
}

/// `true` if `unit` introduces a payload rather than a nop.
#[inline(always)]
pub fn is_payload_ident(unit: u16) -> bool {
    unit & 0x00FF == 0 && unit >> 8 != 0
}

/// Walk the code units of one code item, decoding every payload into the
/// provided map, keyed by the payload's file offset (`insns_off` plus twice
/// the code-unit index).
///
/// Truncated payloads and unknown payload kinds are reported as warnings;
/// the walk resynchronizes or stops instead of failing.
pub fn scan_payloads(insns: &[u16], insns_off: FileOffset, out: &mut PseudoInsns) {
    let mut unit = 0usize;
    while unit < insns.len() {
        let ident = insns[unit];
        if !is_payload_ident(ident) {
            let opcode = (ident & 0xFF) as u8;
            unit += InsnDescriptor::of(opcode).fmt().insn_len as usize;
            continue;
        }

        let addr = insns_off + (unit as u32) * 2;
        let consumed_units = match decode_payload(&insns[unit..], ident) {
            Some(payload) => {
                let size = payload.total_size() / 2;
                out.insert(addr, payload);
                size
            }
            None => {
                // Either an unknown kind or a size that runs off the stream.
                // Skip one unit so the host can resynchronize.
                1
            }
        };
        unit += consumed_units;
    }
}

/// Decode the payload starting at `insns[0]`, which must be an ident unit.
/// Returns `None` (after warning) for unknown kinds or truncated payloads.
pub fn decode_payload(insns: &[u16], ident: u16) -> Option<PseudoInsn> {
    match ident {
        PACKED_SWITCH_IDENT => {
            let size = *insns.get(1)? as usize;
            if insns.len() < 4 + size * 2 {
                warn!("packed-switch payload with size {size} runs off the code stream");
                return None;
            }
            let first_key = read_i32(insns, 2);
            let targets = (0..size).map(|i| read_i32(insns, 4 + i * 2)).collect();
            Some(PseudoInsn::PackedSwitch { first_key, targets })
        }
        SPARSE_SWITCH_IDENT => {
            let size = *insns.get(1)? as usize;
            if insns.len() < 2 + size * 4 {
                warn!("sparse-switch payload with size {size} runs off the code stream");
                return None;
            }
            let keys = (0..size).map(|i| read_i32(insns, 2 + i * 2)).collect();
            let targets = (0..size)
                .map(|i| read_i32(insns, 2 + size * 2 + i * 2))
                .collect();
            Some(PseudoInsn::SparseSwitch { keys, targets })
        }
        FILL_ARRAY_DATA_IDENT => {
            let element_width = *insns.get(1)?;
            if insns.len() < 4 {
                warn!("fill-array-data payload header runs off the code stream");
                return None;
            }
            let size = read_i32(insns, 2) as u32;
            let byte_len = ((element_width as usize * size as usize + 1) / 2) * 2;
            if insns.len() < 4 + byte_len / 2 {
                warn!(
                    "fill-array-data payload with {size} elements of width {element_width} \
                     runs off the code stream"
                );
                return None;
            }
            let mut data = Vec::with_capacity(byte_len);
            for u in &insns[4..4 + byte_len / 2] {
                data.extend_from_slice(&u.to_le_bytes());
            }
            Some(PseudoInsn::FillArrayData {
                element_width,
                size,
                data,
            })
        }
        other => {
            warn!(
                "unknown pseudo-instruction ident {other:#06x}, skipping one code unit"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_switch_payload() {
        // return-void, then a packed-switch payload: size=2, first_key=10,
        // targets [0x40, 0x80].
        let insns: Vec<u16> = vec![
            0x000E, 0x0100, 0x0002, 10, 0, 0x40, 0, 0x80, 0,
        ];
        let mut found = PseudoInsns::new();
        scan_payloads(&insns, 0x100, &mut found);
        assert_eq!(found.len(), 1);
        let payload = &found[&0x102];
        assert_eq!(
            *payload,
            PseudoInsn::PackedSwitch {
                first_key: 10,
                targets: vec![0x40, 0x80],
            }
        );
        assert_eq!(payload.total_size(), 16);
    }

    #[test]
    fn test_sparse_switch_payload() {
        let insns: Vec<u16> = vec![
            0x0200, 0x0002, // ident, size
            1, 0, 2, 0, // keys 1, 2
            0x10, 0, 0x20, 0, // targets 0x10, 0x20
        ];
        let mut found = PseudoInsns::new();
        scan_payloads(&insns, 0, &mut found);
        let payload = &found[&0];
        assert_eq!(
            *payload,
            PseudoInsn::SparseSwitch {
                keys: vec![1, 2],
                targets: vec![0x10, 0x20],
            }
        );
        assert_eq!(payload.total_size(), 20);
    }

    #[test]
    fn test_fill_array_data_payload() {
        // 3 elements of width 1: 3 data bytes, padded to 2 units.
        let insns: Vec<u16> = vec![0x0300, 0x0001, 3, 0, 0x0201, 0x0003];
        let mut found = PseudoInsns::new();
        scan_payloads(&insns, 0, &mut found);
        match &found[&0] {
            PseudoInsn::FillArrayData {
                element_width,
                size,
                data,
            } => {
                assert_eq!(*element_width, 1);
                assert_eq!(*size, 3);
                assert_eq!(data, &vec![0x01, 0x02, 0x03, 0x00]);
            }
            other => panic!("expected fill-array-data, got {:?}", other),
        }
        assert_eq!(found[&0].total_size(), 12);
    }

    #[test]
    fn test_payload_behind_instructions() {
        // goto/32 +4, const/4 v0 #0, then payload at unit 4.
        let insns: Vec<u16> = vec![0x002A, 4, 0, 0x0012, 0x0100, 0x0000, 0, 0];
        let mut found = PseudoInsns::new();
        scan_payloads(&insns, 0x20, &mut found);
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&(0x20 + 8)));
    }

    #[test]
    fn test_unknown_ident_is_skipped() {
        let insns: Vec<u16> = vec![0x0400, 0x000E];
        let mut found = PseudoInsns::new();
        scan_payloads(&insns, 0, &mut found);
        assert!(found.is_empty());
    }

    #[test]
    fn test_truncated_payload_is_skipped() {
        let insns: Vec<u16> = vec![0x0100, 0x0010, 10, 0];
        let mut found = PseudoInsns::new();
        scan_payloads(&insns, 0, &mut found);
        assert!(found.is_empty());
    }
}
