//! Writing parsed classes back out as `.smali` text.

use std::io::{self, Write};

use log::warn;

use crate::dalvik::dex::{
    DexClassDef, DexEncodedField, DexEncodedMethod, DexFile, DexValue, FlagContext,
};
use crate::smali::disas::method_handle_target_text;
use crate::Result;

impl<W: io::Write> SmaliWrite for W {}

pub trait SmaliWrite: Write {
    /// Write one class: header directives, fields, then methods.
    fn write_class(&mut self, df: &DexFile, class: &DexClassDef, strict: bool) -> Result<()> {
        write!(
            self,
            ".class {}{}\n",
            class.access_flags.render(FlagContext::Class)?,
            class.class_type
        )?;
        if let Some(superclass) = &class.superclass {
            write!(self, ".super {}\n", superclass)?;
        }
        if let Some(source_file) = &class.source_file {
            write!(self, ".source \"{}\"\n", source_file)?;
        }
        if let Some(interfaces) = &class.interfaces {
            for interface in interfaces.iter() {
                write!(self, ".implements {}\n", interface)?;
            }
        }

        let class_data = match &class.class_data {
            Some(class_data) => class_data,
            None => return Ok(()),
        };

        let static_values = class.static_values.as_deref();
        if !class_data.static_fields.is_empty() {
            write!(self, "\n\n# static fields\n")?;
            for (i, field) in class_data.static_fields.iter().enumerate() {
                let value = static_values.and_then(|values| values.get(i));
                self.write_field(field, value)?;
            }
        }
        if !class_data.instance_fields.is_empty() {
            write!(self, "\n\n# instance fields\n")?;
            for field in &class_data.instance_fields {
                self.write_field(field, None)?;
            }
        }

        if !class_data.direct_methods.is_empty() {
            write!(self, "\n# direct methods")?;
            for method in &class_data.direct_methods {
                self.write_method(df, method, strict)?;
            }
        }
        if !class_data.virtual_methods.is_empty() {
            write!(self, "\n# virtual methods")?;
            for method in &class_data.virtual_methods {
                self.write_method(df, method, strict)?;
            }
        }
        Ok(())
    }

    fn write_field(&mut self, field: &DexEncodedField, value: Option<&DexValue>) -> Result<()> {
        write!(
            self,
            ".field {}{}:{}",
            field.access_flags.render(FlagContext::Field)?,
            field.field.name,
            field.field.type_
        )?;
        if let Some(value) = value {
            write!(self, " = ")?;
            self.write_value(value)?;
        }
        write!(self, "\n")?;
        Ok(())
    }

    /// Write a method declaration and its disassembled body. With `strict`
    /// set, an instruction that fails to disassemble aborts the write;
    /// otherwise it is skipped two bytes at a time until the stream
    /// resynchronizes.
    fn write_method(&mut self, df: &DexFile, method: &DexEncodedMethod, strict: bool) -> Result<()> {
        write!(
            self,
            "\n.method {}{}{}\n    .registers {}\n",
            method.access_flags.render(FlagContext::Method)?,
            method.method.name,
            method.method.proto,
            method.code.as_ref().map_or(0, |code| code.registers_size),
        )?;

        if let Some(code) = &method.code {
            let bytes = code.insns_bytes();
            let mut i = 0usize;
            while i < bytes.len() {
                let addr = code.insns_off + i as u32;
                let (tokens, size) = df.disassemble(&bytes[i..], addr);
                if size == 0 {
                    if strict {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("failed to disassemble at {addr:#x}"),
                        )
                        .into());
                    }
                    warn!("failed to disassemble at {addr:#x}, skipping one code unit");
                    write!(self, "\n    # undecodable code unit at {addr:#x}\n")?;
                    i += 2;
                    continue;
                }
                let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
                write!(self, "\n    {}\n", text)?;
                i += size;
            }
        }
        write!(self, ".end method\n")?;
        Ok(())
    }

    fn write_value(&mut self, value: &DexValue) -> Result<()> {
        match value {
            DexValue::Byte(v) => write!(self, "{:#x}", v)?,
            DexValue::Short(v) => write!(self, "{:#x}", v)?,
            DexValue::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(self, "'{}'", c.escape_default())?,
                None => write!(self, "{:#x}", v)?,
            },
            DexValue::Int(v) => write!(self, "{:#x}", v)?,
            DexValue::Long(v) => write!(self, "{:#x}", v)?,
            DexValue::Float(v) => write!(self, "{}", v)?,
            DexValue::Double(v) => write!(self, "{}", v)?,
            DexValue::String(v) => write!(self, "\"{}\"", v.escape_default())?,
            DexValue::Type(v) => write!(self, "{}", v)?,
            DexValue::Field(v) => write!(self, "{}->{}:{}", v.class, v.name, v.type_)?,
            DexValue::Enum(v) => write!(self, "{}->{}:{}", v.class, v.name, v.type_)?,
            DexValue::Method(v) => write!(self, "{}->{}{}", v.class, v.name, v.proto)?,
            DexValue::MethodType(v) => write!(self, "{}", v)?,
            DexValue::MethodHandle(v) => {
                write!(self, "{}", method_handle_target_text(&v.target))?
            }
            DexValue::Boolean(true) => write!(self, "true")?,
            DexValue::Boolean(false) => write!(self, "false")?,
            DexValue::Null => write!(self, "null")?,
            DexValue::Array(values) => {
                write!(self, "[")?;
                for (i, element) in values.iter().enumerate() {
                    self.write_value(element)?;
                    if i != values.len() - 1 {
                        write!(self, ", ")?;
                    }
                }
                write!(self, "]")?;
            }
            DexValue::Annotation(annotation) => {
                write!(self, ".annotation {}", annotation.type_)?;
                for (name, element) in &annotation.elements {
                    write!(self, " {} = ", name)?;
                    self.write_value(element)?;
                }
            }
        }
        Ok(())
    }
}
