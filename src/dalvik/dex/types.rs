use std::fmt::{Debug, Display};

use bitflags::bitflags;
use serde::Serialize;

use crate::dalvik::error::DexError;
use crate::Result;

/// Byte offset from the beginning of the Dex file.
pub type FileOffset = u32;

/// Offset into a method's code stream. Branch operands count 16-bit code
/// units; everything surfaced to the host counts bytes.
pub type BytecodeAddress = u32;

/// Sentinel for nullable pool indices (superclass, source file, ...).
pub const NO_INDEX: u32 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

/// A type descriptor such as `Ljava/lang/Object;`, `I` or `[B`.
#[derive(PartialEq, Eq, Serialize)]
pub struct DexType {
    pub descriptor: String,
}

impl DexType {
    pub fn new(descriptor: &str) -> DexType {
        DexType {
            descriptor: descriptor.to_string(),
        }
    }

    /// Number of leading `[` array dimensions.
    pub fn array_dim(&self) -> usize {
        self.descriptor
            .bytes()
            .take_while(|b| *b == b'[')
            .count()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.descriptor.as_bytes().get(self.array_dim()),
            Some(b'V' | b'Z' | b'C' | b'B' | b'S' | b'I' | b'F' | b'J' | b'D')
        )
    }

    /// `true` for `Lpackage/Name;` style descriptors (after array stripping).
    pub fn is_class(&self) -> bool {
        self.descriptor.as_bytes().get(self.array_dim()) == Some(&b'L')
    }
}

impl Display for DexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

impl Debug for DexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DexType({:?})", self.descriptor)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;

        /// SYNCHRONIZED on methods and fields, SUPER on classes.
        const SYNCHRONIZED = 0x0020;

        /// VOLATILE on fields and classes, BRIDGE on methods.
        const VOLATILE = 0x0040;

        /// TRANSIENT on fields and classes, VARARGS on methods.
        const TRANSIENT = 0x0080;

        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;

        /// Documented as "unused"; accepted and never rendered.
        const MANDATED = 0x8000;

        const CONSTRUCTOR = 0x10000;
        const DECLARED_SYNCHRONIZED = 0x20000;
    }
}

/// The declaration a flag word was read from. Bits 0x20/0x40/0x80 are
/// overloaded and render under different names per context, so every render
/// site passes the context explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagContext {
    Class,
    Method,
    Field,
}

impl AccessFlags {
    /// Render the Smali modifier list for `context`.
    ///
    /// Flags are emitted in the dexgen order: `public private protected
    /// static final (synchronized|super) (volatile|bridge)
    /// (transient|varargs) native interface abstract strictfp synthetic
    /// annotation enum constructor declared_synchronized`. A non-empty list
    /// gets a trailing space so callers can concatenate the declaration
    /// directly after it. Bits outside the known set fail with
    /// [`DexError::InvalidAccessFlags`].
    pub fn render(&self, context: FlagContext) -> Result<String> {
        let value = self.bits();
        let known = AccessFlags::all().bits();
        if value & !known != 0 {
            return Err(DexError::InvalidAccessFlags {
                value,
                remaining: value & !known,
            });
        }

        let mut names: Vec<&'static str> = Vec::new();
        let mut put = |flag: AccessFlags, name: &'static str| {
            if self.contains(flag) {
                names.push(name);
            }
        };

        put(AccessFlags::PUBLIC, "public");
        put(AccessFlags::PRIVATE, "private");
        put(AccessFlags::PROTECTED, "protected");
        put(AccessFlags::STATIC, "static");
        put(AccessFlags::FINAL, "final");
        put(
            AccessFlags::SYNCHRONIZED,
            match context {
                FlagContext::Class => "super",
                _ => "synchronized",
            },
        );
        put(
            AccessFlags::VOLATILE,
            match context {
                FlagContext::Method => "bridge",
                _ => "volatile",
            },
        );
        put(
            AccessFlags::TRANSIENT,
            match context {
                FlagContext::Method => "varargs",
                _ => "transient",
            },
        );
        put(AccessFlags::NATIVE, "native");
        put(AccessFlags::INTERFACE, "interface");
        put(AccessFlags::ABSTRACT, "abstract");
        put(AccessFlags::STRICT, "strictfp");
        put(AccessFlags::SYNTHETIC, "synthetic");
        put(AccessFlags::ANNOTATION, "annotation");
        put(AccessFlags::ENUM, "enum");
        put(AccessFlags::CONSTRUCTOR, "constructor");
        put(AccessFlags::DECLARED_SYNCHRONIZED, "declared_synchronized");

        if names.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("{} ", names.join(" ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_descriptor_shapes() {
        let ty = DexType::new("[[I");
        assert_eq!(ty.array_dim(), 2);
        assert!(ty.is_primitive());
        assert!(!ty.is_class());

        let ty = DexType::new("Lfoo/Bar;");
        assert_eq!(ty.array_dim(), 0);
        assert!(ty.is_class());
        assert_eq!(ty.to_string(), "Lfoo/Bar;");
    }

    #[test]
    fn test_no_flags_render_empty() {
        for context in [FlagContext::Class, FlagContext::Method, FlagContext::Field] {
            assert_eq!(AccessFlags::empty().render(context).unwrap(), "");
        }
    }

    #[test]
    fn test_public_static_method() {
        let flags = AccessFlags::PUBLIC | AccessFlags::STATIC;
        assert_eq!(flags.render(FlagContext::Method).unwrap(), "public static ");
    }

    #[test]
    fn test_all_flags_per_context() {
        let all = AccessFlags::all() & !AccessFlags::MANDATED;
        assert_eq!(
            all.render(FlagContext::Method).unwrap(),
            "public private protected static final synchronized bridge varargs \
             native interface abstract strictfp synthetic annotation enum \
             constructor declared_synchronized "
        );
        assert_eq!(
            all.render(FlagContext::Field).unwrap(),
            "public private protected static final synchronized volatile transient \
             native interface abstract strictfp synthetic annotation enum \
             constructor declared_synchronized "
        );
        assert_eq!(
            all.render(FlagContext::Class).unwrap(),
            "public private protected static final super volatile transient \
             native interface abstract strictfp synthetic annotation enum \
             constructor declared_synchronized "
        );
    }

    #[test]
    fn test_unused_bit_is_ignored() {
        let flags = AccessFlags::from_bits_retain(0x8000 | 0x0001);
        assert_eq!(flags.render(FlagContext::Field).unwrap(), "public ");
    }

    #[test]
    fn test_unknown_bit_is_fatal() {
        let flags = AccessFlags::from_bits_retain(0x40000);
        assert!(matches!(
            flags.render(FlagContext::Class),
            Err(DexError::InvalidAccessFlags { .. })
        ));
    }
}
