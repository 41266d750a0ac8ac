//! The instruction disassembler: renders one instruction (or payload block)
//! at a file offset into typed text tokens.

use log::{error, warn};

use crate::dalvik::dex::{DexFile, FileOffset, MethodHandleTarget, PseudoInsn};
use crate::dalvik::insns::{
    endian_swap_shorts, parse_with_format, sign, FieldBindings, InsnDescriptor,
};
use crate::smali::tokens::Token;

impl DexFile {
    /// Disassemble the instruction at `addr`, whose bytes (in file order)
    /// start at `data[0]`. Returns the rendered tokens and the number of
    /// bytes consumed.
    ///
    /// Failure is soft: on a short read the result is `(empty, 0)` so the
    /// caller can resynchronize, and unresolvable pool references render as
    /// their raw `kind@index` text.
    pub fn disassemble(&self, data: &[u8], addr: FileOffset) -> (Vec<Token>, usize) {
        if data.len() < 2 {
            warn!(
                "trying to disassemble {} byte(s) at {addr:#x}: {data:02x?}",
                data.len()
            );
            return (Vec::new(), 0);
        }

        // Payload blocks are rendered from the map built at parse time.
        if data[0] == 0 && data[1] != 0 {
            if data[1] > 3 {
                warn!(
                    "unknown pseudo-instruction type {:#04x} at {addr:#x}",
                    data[1]
                );
                return (Vec::new(), 2);
            }
            let payload = match self.pseudo_insn_at(addr) {
                Some(payload) => payload,
                None => {
                    warn!("no payload known at {addr:#x}; host is out of sync");
                    return (Vec::new(), 0);
                }
            };
            return (
                vec![Token::instruction(render_payload(payload))],
                payload.total_size(),
            );
        }

        let insn = InsnDescriptor::of(data[0]);
        let fmt = insn.fmt();
        let needed = insn.size_in_bytes();
        if data.len() < needed {
            warn!(
                "instruction {} at {addr:#x} needs {needed} bytes, {} available",
                insn.mnemonic,
                data.len()
            );
            return (Vec::new(), 0);
        }

        let mut tokens = vec![Token::instruction(insn.mnemonic)];

        let swapped = endian_swap_shorts(&data[..needed]);
        let mut args = parse_with_format(&swapped, fmt.pattern);
        if insn.format.is_range() {
            // {vCCCC .. vNNNN} with NNNN = CCCC + AA - 1.
            let n = args.get(&'A').copied().unwrap_or(0) + args.get(&'C').copied().unwrap_or(0);
            args.insert('N', n.wrapping_sub(1));
        }

        let syntax = effective_syntax(insn, &args, addr);
        for word in syntax.split_whitespace() {
            tokens.extend(self.tokenize_word(word, &args));
        }

        (tokens, needed)
    }

    /// Render one syntax word into tokens, preceded by a space.
    fn tokenize_word(&self, word: &str, args: &FieldBindings) -> Vec<Token> {
        let mut tokens = vec![Token::text(" ")];
        let mut word = word;

        let trailing_comma = word.ends_with(',');
        if trailing_comma {
            word = &word[..word.len() - 1];
        }
        let trailing_brace = word.ends_with('}');
        if trailing_brace {
            word = &word[..word.len() - 1];
        }
        if let Some(stripped) = word.strip_prefix('{') {
            tokens.push(Token::begin_list());
            word = stripped;
        }

        let formatted = substitute_placeholders(args, word);

        if formatted.is_empty() {
            // {} in an empty register list.
        } else if let Some(hex) = formatted.strip_prefix('v') {
            match u64::from_str_radix(hex, 16) {
                Ok(reg) => tokens.push(Token::register(reg)),
                Err(_) => {
                    warn!("malformed register operand {formatted:?}");
                    tokens.push(Token::text(formatted.clone()));
                }
            }
        } else if let Some(hex) = formatted.strip_prefix("#+") {
            match parse_signed_hex(hex) {
                Some(value) => tokens.push(Token::integer(hex_literal(value), value as u64)),
                None => {
                    warn!("malformed literal operand {formatted:?}");
                    tokens.push(Token::text(formatted.clone()));
                }
            }
        } else if formatted.contains('@') {
            tokens.extend(self.tokenize_pool_ref(&formatted));
        } else if let Some(hex) = formatted.strip_prefix('+') {
            if parse_signed_hex(hex).map_or(false, |v| v >= 0) {
                tokens.push(Token::text("+"));
            }
            tokens.push(Token::address(hex, None));
        } else if formatted == ".." {
            tokens.push(Token::text(".."));
        } else {
            warn!("formatting unknown token with syntax {word:?}: {formatted}");
            tokens.push(Token::text(formatted.clone()));
        }

        if trailing_brace {
            tokens.push(Token::end_list());
        }
        if trailing_comma {
            tokens.push(Token::separator());
        }
        tokens
    }

    /// Expand a `kind@index` reference against the pools. Unresolvable
    /// references keep their raw text.
    fn tokenize_pool_ref(&self, formatted: &str) -> Vec<Token> {
        let (kind, index_hex) = match formatted.split_once('@') {
            Some(pair) => pair,
            None => return vec![Token::text(formatted)],
        };
        let index = match u32::from_str_radix(index_hex, 16) {
            Ok(index) => index,
            Err(_) => {
                warn!("malformed pool reference {formatted:?}");
                return vec![Token::text(formatted)];
            }
        };

        match kind {
            "field" => match self.get_field(index) {
                Ok(field) => vec![
                    Token::text(field.class.descriptor.clone()),
                    Token::text("->"),
                    Token::text(field.name.as_str()),
                    Token::text(":"),
                    Token::text(field.type_.descriptor.clone()),
                ],
                Err(_) => {
                    warn!("field index {index} out of range, rendering raw");
                    vec![Token::text(formatted)]
                }
            },
            "meth" => match self.get_method(index) {
                Ok(method) => {
                    let mut tokens = vec![
                        Token::text(method.class.descriptor.clone()),
                        Token::text("->"),
                    ];
                    match self.method_insns_off(index) {
                        Some(off) => {
                            tokens.push(Token::address(method.name.as_str(), Some(off as u64)))
                        }
                        None => tokens.push(Token::text(method.name.as_str())),
                    }
                    tokens.push(Token::text("("));
                    for param in method.proto.parameters.iter() {
                        tokens.push(Token::text(param.descriptor.clone()));
                    }
                    tokens.push(Token::text(")"));
                    tokens.push(Token::text(method.proto.return_type.descriptor.clone()));
                    tokens
                }
                Err(_) => {
                    warn!("method index {index} out of range, rendering raw");
                    vec![Token::text(formatted)]
                }
            },
            "string" => match self.get_string(index) {
                Ok(string) => vec![
                    Token::text("\""),
                    Token::text(escape_string(string)),
                    Token::text("\""),
                ],
                Err(_) => {
                    warn!("string index {index} out of range, rendering raw");
                    vec![Token::text(formatted)]
                }
            },
            "type" => match self.get_type(index) {
                Ok(type_) => vec![Token::text(type_.descriptor.clone())],
                Err(_) => {
                    warn!("type index {index} out of range, rendering raw");
                    vec![Token::text(formatted)]
                }
            },
            "call_site" | "method_handle" | "proto" => {
                warn!("{kind} rendering isn't implemented yet");
                vec![Token::text(formatted)]
            }
            other => {
                error!("unknown lookup type: {other}@{index_hex}");
                vec![Token::text(formatted)]
            }
        }
    }
}

/// A method handle target as one-line text, for diagnostics and the writer.
pub fn method_handle_target_text(target: &MethodHandleTarget) -> String {
    match target {
        MethodHandleTarget::Field(field) => {
            format!("{}->{}:{}", field.class, field.name, field.type_)
        }
        MethodHandleTarget::Method(method) => {
            format!("{}->{}{}", method.class, method.name, method.proto)
        }
    }
}

/// Pick the template to render: 35c resolves its register-count variants
/// against the row's pool kind, `[A=k]`-branched format syntax selects on
/// the extracted A, and everything else uses the row's own syntax.
fn effective_syntax(insn: &'static InsnDescriptor, args: &FieldBindings, addr: FileOffset) -> String {
    let fmt = insn.fmt();
    if fmt.id == "35c" {
        let kind = match pool_kind_of(insn.syntax) {
            Some(kind) => kind,
            None => {
                error!("failed to find the pool kind for {} at {addr:#x}", insn.mnemonic);
                "kind"
            }
        };
        let registers = ["", "vC", "vC, vD", "vC, vD, vE", "vC, vD, vE, vF", "vC, vD, vE, vF, vG"];
        return match args.get(&'A') {
            Some(&a) if a <= 5 => format!("{{{}}}, {kind}@BBBB", registers[a as usize]),
            _ => {
                error!("failed to parse syntax for 35c instruction at {addr:#x}");
                "error (35c)".to_string()
            }
        };
    }

    if fmt.syntax.contains("[A=") {
        let a = args.get(&'A').copied().unwrap_or(u64::MAX);
        for branch in fmt.syntax.split("[A=") {
            let branch = branch.trim();
            if branch
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .map_or(false, |k| k as u64 == a)
            {
                // Skip the "k] op " selector prefix.
                if let Some(pos) = branch.find("] op ") {
                    return branch[pos + 5..].to_string();
                }
            }
        }
        error!("failed to parse syntax for instruction at {addr:#x}");
        return "error".to_string();
    }

    insn.syntax.to_string()
}

/// The `kind@` name in an operand syntax, e.g. `meth` or `call_site`.
fn pool_kind_of(syntax: &str) -> Option<&str> {
    let at = syntax.find('@')?;
    let head = &syntax[..at];
    let start = head
        .rfind(|c: char| !(c.is_ascii_lowercase() || c == '_'))
        .map(|p| p + 1)
        .unwrap_or(0);
    if start == at {
        None
    } else {
        Some(&head[start..])
    }
}

/// Replace every placeholder run (a prefix character followed by uppercase
/// letters) with the hex rendering of the bound value. Registers (`v`) and
/// pool indices (`@`) stay unsigned, everything else is interpreted signed
/// at the field's nibble width.
fn substitute_placeholders(args: &FieldBindings, word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let run_start = if chars[i].is_ascii_uppercase() { i } else { i + 1 };
        let mut run_end = run_start;
        while run_end < chars.len() && chars[run_end].is_ascii_uppercase() {
            run_end += 1;
        }
        if run_end == run_start || run_start > chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let prefix = if run_start == i { None } else { Some(chars[i]) };
        let letter = chars[run_end - 1];
        let width = (run_end - run_start) as u32;
        let value = match args.get(&letter) {
            Some(value) => *value,
            None => {
                warn!("no binding for placeholder {letter:?} in {word:?}");
                0
            }
        };

        if let Some(prefix) = prefix {
            out.push(prefix);
        }
        if matches!(prefix, Some('v') | Some('@')) {
            out.push_str(&format!("{value:x}"));
        } else {
            let signed = sign(value, width);
            if signed < 0 {
                out.push_str(&format!("-{:x}", signed.unsigned_abs()));
            } else {
                out.push_str(&format!("{signed:x}"));
            }
        }
        i = run_end;
    }
    out
}

/// Parse hex digits with an optional leading minus, as produced by
/// [`substitute_placeholders`]. Covers the full i64 range, including
/// `-8000000000000000` from a wide literal.
fn parse_signed_hex(hex: &str) -> Option<i64> {
    if let Some(rest) = hex.strip_prefix('-') {
        let value = i128::from_str_radix(rest, 16).ok()?;
        i64::try_from(-value).ok()
    } else {
        i64::from_str_radix(hex, 16).ok()
    }
}

/// `0x`-prefixed lowercase hex with the sign out front.
fn hex_literal(value: i64) -> String {
    if value < 0 {
        format!("-{:#x}", value.unsigned_abs())
    } else {
        format!("{value:#x}")
    }
}

/// Escape a string literal for one-line rendering: common controls by name,
/// other controls and non-ASCII as unicode escapes.
fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            c if (' '..='~').contains(&c) => out.push(c),
            c if (c as u32) <= 0xFFFF => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    out
}

fn render_payload(payload: &PseudoInsn) -> String {
    match payload {
        PseudoInsn::PackedSwitch { first_key, targets } => {
            let mut text = format!(".packed-switch {}\n", hex_literal(*first_key as i64));
            for target in targets {
                text.push_str(&format!("        :pswitch_offset_{target:x}\n"));
            }
            text.push_str("    .end packed-switch");
            text
        }
        PseudoInsn::SparseSwitch { keys, targets } => {
            let mut text = ".sparse-switch\n".to_string();
            for (key, target) in keys.iter().zip(targets.iter()) {
                text.push_str(&format!(
                    "        {} -> :sswitch_offset_{target:x}\n",
                    hex_literal(*key as i64)
                ));
            }
            text.push_str("    .end sparse-switch");
            text
        }
        PseudoInsn::FillArrayData {
            element_width,
            size,
            data,
        } => {
            let mut text = format!(".fill-array-data {element_width}\n");
            let width = (*element_width).max(1) as usize;
            for element in data.chunks(width).take(*size as usize) {
                let mut value: u64 = 0;
                for (i, byte) in element.iter().take(8).enumerate() {
                    value |= (*byte as u64) << (8 * i);
                }
                text.push_str(&format!("        {value:#x}\n"));
            }
            text.push_str("    .end fill-array-data");
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn args(pairs: &[(char, u64)]) -> FieldBindings {
        pairs.iter().cloned().collect::<BTreeMap<char, u64>>()
    }

    #[test]
    fn test_substitute_plain_runs() {
        assert_eq!(substitute_placeholders(&args(&[]), "hi"), "hi");
        assert_eq!(
            substitute_placeholders(&args(&[('A', 3)]), "numA"),
            "num3"
        );
        assert_eq!(
            substitute_placeholders(&args(&[('A', 4)]), "numAAAA"),
            "num4"
        );
    }

    #[test]
    fn test_substitute_signed() {
        assert_eq!(substitute_placeholders(&args(&[('A', 0xF)]), " A"), " -1");
        assert_eq!(substitute_placeholders(&args(&[('A', 0xFF)]), " AA"), " -1");
        assert_eq!(
            substitute_placeholders(&args(&[('A', 0xF6)]), " AA"),
            " -a"
        );
    }

    #[test]
    fn test_substitute_unsigned_prefixes() {
        assert_eq!(substitute_placeholders(&args(&[('A', 0xF)]), "vA"), "vf");
        assert_eq!(substitute_placeholders(&args(&[('A', 0xF)]), "vAA"), "vf");
        assert_eq!(
            substitute_placeholders(&args(&[('A', 0xFFFF)]), "field@AAAA"),
            "field@ffff"
        );
    }

    #[test]
    fn test_substitute_literal_with_shift_suffix() {
        // const/high16 keeps the template's trailing zeros.
        assert_eq!(
            substitute_placeholders(&args(&[('A', 0), ('B', 2)]), "#+BBBB0000"),
            "#+20000"
        );
    }

    #[test]
    fn test_pool_kind_discovery() {
        assert_eq!(
            pool_kind_of("{vC, vD, vE, vF, vG}, meth@BBBB"),
            Some("meth")
        );
        assert_eq!(
            pool_kind_of("{vC, vD, vE, vF, vG}, call_site@BBBB"),
            Some("call_site")
        );
        assert_eq!(pool_kind_of("vAA, type@BBBB"), Some("type"));
        assert_eq!(pool_kind_of("vA, vB"), None);
    }

    #[test]
    fn test_effective_syntax_35c_by_count() {
        let insn = InsnDescriptor::of(0x6e); // invoke-virtual
        assert_eq!(
            effective_syntax(insn, &args(&[('A', 2)]), 0),
            "{vC, vD}, meth@BBBB"
        );
        assert_eq!(effective_syntax(insn, &args(&[('A', 0)]), 0), "{}, meth@BBBB");
        let custom = InsnDescriptor::of(0xfc); // invoke-custom
        assert_eq!(
            effective_syntax(custom, &args(&[('A', 1)]), 0),
            "{vC}, call_site@BBBB"
        );
    }

    #[test]
    fn test_effective_syntax_45cc_branch_selection() {
        let insn = InsnDescriptor::of(0xfa); // invoke-polymorphic
        assert_eq!(
            effective_syntax(insn, &args(&[('A', 3)]), 0),
            "{vC, vD, vE}, meth@BBBB, proto@HHHH"
        );
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(hex_literal(10), "0xa");
        assert_eq!(hex_literal(-1), "-0x1");
        assert_eq!(hex_literal(0), "0x0");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a\nb"), "a\\nb");
        assert_eq!(escape_string("tab\there"), "tab\\there");
        assert_eq!(escape_string("π"), "\\u03c0");
    }

    #[test]
    fn test_render_packed_switch_block() {
        let payload = PseudoInsn::PackedSwitch {
            first_key: 10,
            targets: vec![0x40, 0x80],
        };
        assert_eq!(
            render_payload(&payload),
            ".packed-switch 0xa\n        :pswitch_offset_40\n        :pswitch_offset_80\n    .end packed-switch"
        );
    }
}
