//! Fixed lexical and code-generation tables for Jack.
//!
//! Nothing here carries state; these are the constant sets and maps that the
//! tokenizer and engine consult to classify tokens and choose VM opcodes.

/// The fixed keyword set, exact match only (a prefix match like `classroom`
/// must not be mistaken for `class`).
pub const KEYWORDS: &[&str] = &[
    "class",
    "constructor",
    "function",
    "method",
    "field",
    "static",
    "var",
    "int",
    "char",
    "boolean",
    "void",
    "true",
    "false",
    "null",
    "this",
    "let",
    "do",
    "if",
    "else",
    "while",
    "return",
];

/// Single-character symbols, in the order the grammar enumerates them.
pub const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(&c)
}

/// Binary operator symbols recognized inside an expression's `(op term)*` tail.
pub const BINARY_OPS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];

/// Unary operator symbols recognized at the start of a term.
pub const UNARY_OPS: &[char] = &['-', '~'];

/// Translate a binary operator symbol to the VM instruction it emits.
///
/// `*` and `/` are not native VM instructions; they lower to calls into the
/// OS `Math` class (see [`crate::config::OsNames`]).
pub enum BinaryOpCode {
    Arithmetic(&'static str),
    MathCall(&'static str),
}

pub fn binary_opcode(op: char) -> Option<BinaryOpCode> {
    match op {
        '+' => Some(BinaryOpCode::Arithmetic("add")),
        '-' => Some(BinaryOpCode::Arithmetic("sub")),
        '=' => Some(BinaryOpCode::Arithmetic("eq")),
        '>' => Some(BinaryOpCode::Arithmetic("gt")),
        '<' => Some(BinaryOpCode::Arithmetic("lt")),
        '&' => Some(BinaryOpCode::Arithmetic("and")),
        '|' => Some(BinaryOpCode::Arithmetic("or")),
        '*' => Some(BinaryOpCode::MathCall("multiply")),
        '/' => Some(BinaryOpCode::MathCall("divide")),
        _ => None,
    }
}

/// Translate a unary operator symbol to the VM instruction it emits.
pub fn unary_opcode(op: char) -> Option<&'static str> {
    match op {
        '-' => Some("neg"),
        '~' => Some("not"),
        _ => None,
    }
}

/// Maximum value representable by a Jack integer constant.
pub const MAX_INT_CONSTANT: i32 = 32767;
