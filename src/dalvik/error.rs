use std::fmt::Debug;

use thiserror::Error;

/// Fatal parsing and rendering failures.
///
/// The warning-grade conditions (shorty mismatch, missing optional section,
/// duplicate code binding, unknown pseudo-instruction, short disassembly
/// read) never surface here; they are reported through `log::warn!` and
/// parsing continues.
#[derive(Error)]
pub enum DexError {
    #[error("Unexpected endian tag: {0:#010x}")]
    InvalidEndianTag(u32),

    #[error("Truncated input: need {needed} byte(s) at offset {offset} for {what}, {available} available")]
    TruncatedInput {
        what: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid LEB128 sequence at offset {offset}: {reason}")]
    InvalidLeb128 { offset: usize, reason: &'static str },

    #[error("Invalid MUTF-8 sequence: {bytes:02x?}")]
    InvalidMutf8 { bytes: Vec<u8> },

    #[error("Missing required section: {section}")]
    MissingSection { section: &'static str },

    #[error("Index({index}) into {pool} should be less than {max}")]
    IndexOutOfBounds {
        index: u32,
        max: usize,
        pool: &'static str,
    },

    #[error("Unknown access flag bits {remaining:#x} in {value:#x}")]
    InvalidAccessFlags { value: u32, remaining: u32 },

    #[error("Invalid encoded value type {tag:#04x}")]
    InvalidEncodedValueType { tag: u8 },

    #[error("Invalid method handle kind {kind:#06x}")]
    InvalidMethodHandleKind { kind: u16 },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Debug for DexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
