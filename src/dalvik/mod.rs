pub mod error;
pub mod leb128;
pub mod mutf8;

pub mod dex;
pub mod insns;
