use serde::Serialize;

/// Token classes understood by disassembler hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Text,
    Instruction,
    OperandSeparator,
    Register,
    Integer,
    PossibleAddress,
    BeginMemoryOperand,
    EndMemoryOperand,
    FloatingPoint,
}

/// One piece of rendered instruction text. `value` carries the numeric
/// payload where one exists (register number, literal, resolved address).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub value: Option<u64>,
}

impl Token {
    pub fn text(text: impl Into<String>) -> Token {
        Token {
            kind: TokenKind::Text,
            text: text.into(),
            value: None,
        }
    }

    pub fn instruction(text: impl Into<String>) -> Token {
        Token {
            kind: TokenKind::Instruction,
            text: text.into(),
            value: None,
        }
    }

    pub fn separator() -> Token {
        Token {
            kind: TokenKind::OperandSeparator,
            text: ",".to_string(),
            value: None,
        }
    }

    pub fn register(reg: u64) -> Token {
        Token {
            kind: TokenKind::Register,
            text: format!("v{reg}"),
            value: Some(reg),
        }
    }

    pub fn integer(text: impl Into<String>, value: u64) -> Token {
        Token {
            kind: TokenKind::Integer,
            text: text.into(),
            value: Some(value),
        }
    }

    pub fn address(text: impl Into<String>, value: Option<u64>) -> Token {
        Token {
            kind: TokenKind::PossibleAddress,
            text: text.into(),
            value,
        }
    }

    pub fn begin_list() -> Token {
        Token {
            kind: TokenKind::BeginMemoryOperand,
            text: "{".to_string(),
            value: None,
        }
    }

    pub fn end_list() -> Token {
        Token {
            kind: TokenKind::EndMemoryOperand,
            text: "}".to_string(),
            value: None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
