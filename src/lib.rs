use std::result;

pub mod dalvik;
pub mod smali;

pub use dalvik::dex::DexFile;
pub use dalvik::error::DexError;

pub type Result<T> = result::Result<T, DexError>;
