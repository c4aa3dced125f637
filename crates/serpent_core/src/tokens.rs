//! Token vocabulary: token kinds, exact-operator subkinds, positions and the token record.
//!
//! The tokenizer produces [`Token`]s; the generated parser consumes them by kind, by exact operator
//! subkind ([`OpKind`]) or by literal text (keywords, soft keywords).
//!
//! ## Notes
//! - Exact-operator names follow the CPython `token` module (`LPAR`, `COLONEQUAL`, ...). Grammar
//!   files may refer to operators either by spelling (`'('`) or by name (`LPAR`).
//! - Lookup via [`OpKind::from_spelling`] and [`TokenKind::from_name`] is **case-sensitive**.
//!
//! ## Examples
//! ```rust
//! use serpent_core::tokens::{OpKind, TokenKind};
//!
//! assert_eq!(OpKind::from_spelling(":="), Some(OpKind::ColonEqual));
//! assert_eq!(OpKind::ColonEqual.name(), "COLONEQUAL");
//! assert_eq!(TokenKind::from_name("NEWLINE"), Some(TokenKind::Newline));
//! ```

use std::fmt;

// ============================================================================
// Positions
// ============================================================================

/// A point in the source text.
///
/// `line` is 1-based, `col` is the 0-based UTF-8 byte column within the line and `offset` is the
/// absolute byte offset into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub col: u32,
    pub offset: usize,
}

impl Position {
    pub const fn new(line: u32, col: u32, offset: usize) -> Self {
        Self { line, col, offset }
    }

    /// The position of the first byte of a buffer.
    pub const fn start() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col + 1)
    }
}

// ============================================================================
// Exact operators
// ============================================================================

/// Broad grouping of exact operators, used by diagnostics and the token dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    /// `(`, `)`, `[`, `]`, `{`, `}`.
    Bracket,
    /// `,`, `:`, `;`, `.`, `->`, `...`, `@`.
    Delimiter,
    /// Arithmetic, bitwise and comparison operators.
    Operator,
    /// `=`, `:=` and the augmented assignments.
    Assignment,
}

/// Exact-operator subkind of an `OP` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpKind {
    Lpar,
    Rpar,
    Lsqb,
    Rsqb,
    Lbrace,
    Rbrace,
    Colon,
    Comma,
    Semi,
    Dot,
    Ellipsis,
    Rarrow,
    At,
    Plus,
    Minus,
    Star,
    Slash,
    Vbar,
    Amper,
    Less,
    Greater,
    Percent,
    Tilde,
    Circumflex,
    LeftShift,
    RightShift,
    DoubleStar,
    DoubleSlash,
    EqEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Exclamation,
    Equal,
    ColonEqual,
    PlusEqual,
    MinEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmperEqual,
    VbarEqual,
    CircumflexEqual,
    LeftShiftEqual,
    RightShiftEqual,
    DoubleStarEqual,
    DoubleSlashEqual,
    AtEqual,
}

/// Metadata for an exact operator.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub id: OpKind,
    pub name: &'static str,
    pub spelling: &'static str,
    pub category: OpCategory,
}

const fn op(id: OpKind, name: &'static str, spelling: &'static str, category: OpCategory) -> OpInfo {
    OpInfo {
        id,
        name,
        spelling,
        category,
    }
}

/// Registry of all exact operators, in [`OpKind`] declaration order.
pub const OPERATORS: &[OpInfo] = &[
    op(OpKind::Lpar, "LPAR", "(", OpCategory::Bracket),
    op(OpKind::Rpar, "RPAR", ")", OpCategory::Bracket),
    op(OpKind::Lsqb, "LSQB", "[", OpCategory::Bracket),
    op(OpKind::Rsqb, "RSQB", "]", OpCategory::Bracket),
    op(OpKind::Lbrace, "LBRACE", "{", OpCategory::Bracket),
    op(OpKind::Rbrace, "RBRACE", "}", OpCategory::Bracket),
    op(OpKind::Colon, "COLON", ":", OpCategory::Delimiter),
    op(OpKind::Comma, "COMMA", ",", OpCategory::Delimiter),
    op(OpKind::Semi, "SEMI", ";", OpCategory::Delimiter),
    op(OpKind::Dot, "DOT", ".", OpCategory::Delimiter),
    op(OpKind::Ellipsis, "ELLIPSIS", "...", OpCategory::Delimiter),
    op(OpKind::Rarrow, "RARROW", "->", OpCategory::Delimiter),
    op(OpKind::At, "AT", "@", OpCategory::Delimiter),
    op(OpKind::Plus, "PLUS", "+", OpCategory::Operator),
    op(OpKind::Minus, "MINUS", "-", OpCategory::Operator),
    op(OpKind::Star, "STAR", "*", OpCategory::Operator),
    op(OpKind::Slash, "SLASH", "/", OpCategory::Operator),
    op(OpKind::Vbar, "VBAR", "|", OpCategory::Operator),
    op(OpKind::Amper, "AMPER", "&", OpCategory::Operator),
    op(OpKind::Less, "LESS", "<", OpCategory::Operator),
    op(OpKind::Greater, "GREATER", ">", OpCategory::Operator),
    op(OpKind::Percent, "PERCENT", "%", OpCategory::Operator),
    op(OpKind::Tilde, "TILDE", "~", OpCategory::Operator),
    op(OpKind::Circumflex, "CIRCUMFLEX", "^", OpCategory::Operator),
    op(OpKind::LeftShift, "LEFTSHIFT", "<<", OpCategory::Operator),
    op(OpKind::RightShift, "RIGHTSHIFT", ">>", OpCategory::Operator),
    op(OpKind::DoubleStar, "DOUBLESTAR", "**", OpCategory::Operator),
    op(OpKind::DoubleSlash, "DOUBLESLASH", "//", OpCategory::Operator),
    op(OpKind::EqEqual, "EQEQUAL", "==", OpCategory::Operator),
    op(OpKind::NotEqual, "NOTEQUAL", "!=", OpCategory::Operator),
    op(OpKind::LessEqual, "LESSEQUAL", "<=", OpCategory::Operator),
    op(OpKind::GreaterEqual, "GREATEREQUAL", ">=", OpCategory::Operator),
    op(OpKind::Exclamation, "EXCLAMATION", "!", OpCategory::Operator),
    op(OpKind::Equal, "EQUAL", "=", OpCategory::Assignment),
    op(OpKind::ColonEqual, "COLONEQUAL", ":=", OpCategory::Assignment),
    op(OpKind::PlusEqual, "PLUSEQUAL", "+=", OpCategory::Assignment),
    op(OpKind::MinEqual, "MINEQUAL", "-=", OpCategory::Assignment),
    op(OpKind::StarEqual, "STAREQUAL", "*=", OpCategory::Assignment),
    op(OpKind::SlashEqual, "SLASHEQUAL", "/=", OpCategory::Assignment),
    op(OpKind::PercentEqual, "PERCENTEQUAL", "%=", OpCategory::Assignment),
    op(OpKind::AmperEqual, "AMPEREQUAL", "&=", OpCategory::Assignment),
    op(OpKind::VbarEqual, "VBAREQUAL", "|=", OpCategory::Assignment),
    op(OpKind::CircumflexEqual, "CIRCUMFLEXEQUAL", "^=", OpCategory::Assignment),
    op(OpKind::LeftShiftEqual, "LEFTSHIFTEQUAL", "<<=", OpCategory::Assignment),
    op(OpKind::RightShiftEqual, "RIGHTSHIFTEQUAL", ">>=", OpCategory::Assignment),
    op(OpKind::DoubleStarEqual, "DOUBLESTAREQUAL", "**=", OpCategory::Assignment),
    op(OpKind::DoubleSlashEqual, "DOUBLESLASHEQUAL", "//=", OpCategory::Assignment),
    op(OpKind::AtEqual, "ATEQUAL", "@=", OpCategory::Assignment),
];

/// Longest exact-operator spelling, in bytes.
pub const MAX_OP_LEN: usize = 3;

impl OpKind {
    /// Full metadata entry.
    pub fn info(self) -> &'static OpInfo {
        &OPERATORS[self as usize]
    }

    /// Source spelling (`"("`, `"**="`, ...).
    pub fn as_str(self) -> &'static str {
        self.info().spelling
    }

    /// CPython token name (`"LPAR"`, `"DOUBLESTAREQUAL"`, ...).
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn category(self) -> OpCategory {
        self.info().category
    }

    /// Resolve an operator spelling.
    pub fn from_spelling(s: &str) -> Option<OpKind> {
        OPERATORS.iter().find(|o| o.spelling == s).map(|o| o.id)
    }

    /// Resolve a CPython token name.
    pub fn from_name(s: &str) -> Option<OpKind> {
        OPERATORS.iter().find(|o| o.name == s).map(|o| o.id)
    }

    /// The closing bracket for an opening one.
    pub fn closing(self) -> Option<OpKind> {
        match self {
            OpKind::Lpar => Some(OpKind::Rpar),
            OpKind::Lsqb => Some(OpKind::Rsqb),
            OpKind::Lbrace => Some(OpKind::Rbrace),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Token kinds
// ============================================================================

/// Closed enumeration of token kinds.
///
/// ## Notes
/// - Keywords are `Name` tokens; the parser distinguishes them by text.
/// - `FStringStart`/`FStringMiddle`/`FStringEnd` belong to the contract for token sources that split
///   f-strings. The bundled Python tokenizer emits whole `String` tokens and the parser re-enters the
///   grammar for replacement fields.
/// - `ErrorToken` is never produced by a well-behaved source; the runtime uses it as the sentinel
///   returned by `peek` once the source has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    EndMarker,
    Name,
    Number,
    String,
    FStringStart,
    FStringMiddle,
    FStringEnd,
    Newline,
    Indent,
    Dedent,
    Op(OpKind),
    TypeComment,
    TypeIgnore,
    ErrorToken,
}

/// Grammar-visible names of the non-operator kinds.
const KIND_NAMES: &[(&str, TokenKind)] = &[
    ("ENDMARKER", TokenKind::EndMarker),
    ("NAME", TokenKind::Name),
    ("NUMBER", TokenKind::Number),
    ("STRING", TokenKind::String),
    ("FSTRING_START", TokenKind::FStringStart),
    ("FSTRING_MIDDLE", TokenKind::FStringMiddle),
    ("FSTRING_END", TokenKind::FStringEnd),
    ("NEWLINE", TokenKind::Newline),
    ("INDENT", TokenKind::Indent),
    ("DEDENT", TokenKind::Dedent),
    ("TYPE_COMMENT", TokenKind::TypeComment),
    ("TYPE_IGNORE", TokenKind::TypeIgnore),
    ("ERRORTOKEN", TokenKind::ErrorToken),
];

impl TokenKind {
    /// Resolve a grammar token name: a kind (`NAME`) or an exact operator (`LPAR`).
    pub fn from_name(s: &str) -> Option<TokenKind> {
        KIND_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, kind)| *kind)
            .or_else(|| OpKind::from_name(s).map(TokenKind::Op))
    }

    /// Grammar-visible name. Exact operators report their subkind name.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Op(op) => op.name(),
            other => KIND_NAMES
                .iter()
                .find(|(_, kind)| *kind == other)
                .map(|(name, _)| *name)
                .unwrap_or("OP"),
        }
    }

    /// Whether the kind carries no source text of its own.
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndMarker
        )
    }

    pub fn is_op(self, op: OpKind) -> bool {
        self == TokenKind::Op(op)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Token record
// ============================================================================

/// An immutable token: kind, literal text and source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    /// A zero-width token at `at` (layout tokens, sentinels).
    pub fn empty(kind: TokenKind, at: Position) -> Self {
        Self::new(kind, "", at, at)
    }

    pub fn is_name(&self, text: &str) -> bool {
        self.kind == TokenKind::Name && self.text == text
    }
}
