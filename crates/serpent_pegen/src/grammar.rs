//! Grammar IR: the in-memory form of a parsed meta-grammar.
//!
//! A [`Grammar`] is an ordered list of [`Rule`]s plus meta-directives. Rules hold ordered
//! [`Alt`]ernatives of [`NamedItem`]s; [`Item`] is the closed set of PEG operators the generator
//! understands.
//!
//! ## Notes
//! - The IR is pure data. The derived properties (`nullable`, `left_recursive`, `leader`,
//!   `memo`) are filled in by [`crate::analysis`] and are `false` straight out of the meta-parser.
//! - Actions and type annotations are opaque host-language text, carried verbatim.
//! - `Display` prints the meta-language back, which is what rule doc comments and
//!   `check-grammar` show.

use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Spans
// ============================================================================

/// Byte range in the grammar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

// ============================================================================
// Items
// ============================================================================

/// How a string literal was quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// `'...'`: hard keyword or exact operator.
    Single,
    /// `"..."`: soft keyword or exact operator.
    Double,
}

/// One PEG operator or leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A rule or token-kind name (`expr`, `NAME`, `NEWLINE`).
    Name(String),
    /// A string literal (`'if'`, `"match"`, `':='`).
    Literal { value: String, quote: Quote },
    /// A parenthesised group of alternatives.
    Group(Vec<Alt>),
    /// `X?` or `[alts]`.
    Optional(Box<Item>),
    /// `X*`.
    Repeat0(Box<Item>),
    /// `X+`.
    Repeat1(Box<Item>),
    /// `sep.elem+`: one or more `elem` separated by `sep`.
    Gather { sep: Box<Item>, elem: Box<Item> },
    /// `&X`.
    PositiveLookahead(Box<Item>),
    /// `!X`.
    NegativeLookahead(Box<Item>),
    /// `&&X`: must match, else an immediate "expected" error.
    Forced(Box<Item>),
    /// `~`.
    Cut,
}

impl Item {
    pub fn is_lookahead(&self) -> bool {
        matches!(self, Item::PositiveLookahead(_) | Item::NegativeLookahead(_))
    }

    /// Whether the item binds a value when it appears in an alternative.
    pub fn binds_value(&self) -> bool {
        !self.is_lookahead() && !matches!(self, Item::Cut)
    }

    /// Call `f` on every rule/token name referenced by this item, recursively.
    pub fn for_each_name<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Item::Name(name) => f(name),
            Item::Literal { .. } | Item::Cut => {}
            Item::Group(alts) => alts.iter().for_each(|alt| alt.for_each_name(f)),
            Item::Optional(inner)
            | Item::Repeat0(inner)
            | Item::Repeat1(inner)
            | Item::PositiveLookahead(inner)
            | Item::NegativeLookahead(inner)
            | Item::Forced(inner) => inner.for_each_name(f),
            Item::Gather { sep, elem } => {
                sep.for_each_name(f);
                elem.for_each_name(f);
            }
        }
    }
}

/// An item with an optional capture name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedItem {
    pub name: Option<String>,
    pub item: Item,
    pub span: Span,
}

// ============================================================================
// Alternatives and rules
// ============================================================================

/// One ordered alternative of a rule or group.
#[derive(Debug, Clone, PartialEq)]
pub struct Alt {
    pub items: Vec<NamedItem>,
    /// Host-language expression producing the alternative's value.
    pub action: Option<String>,
    pub span: Span,
}

impl Alt {
    pub fn for_each_name<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        for named in &self.items {
            named.item.for_each_name(f);
        }
    }

    /// Whether the alternative starts with a reference to an `invalid_*` rule. Such alternatives
    /// only run during the diagnostic pass.
    pub fn is_invalid_only(&self) -> bool {
        self.items
            .first()
            .is_some_and(|first| matches!(&first.item, Item::Name(n) if is_invalid_rule(n)))
    }
}

/// Whether a rule name denotes a diagnostic-pass rule.
pub fn is_invalid_rule(name: &str) -> bool {
    name.starts_with("invalid_")
}

/// A named grammar rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    /// Opaque host type of the rule's value.
    pub ty: Option<String>,
    pub alts: Vec<Alt>,
    /// Explicit `(memo)` annotation.
    pub memo_annotation: bool,
    pub span: Span,
    // Derived by analysis.
    pub nullable: bool,
    pub left_recursive: bool,
    pub leader: bool,
    pub memo: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>, ty: Option<String>, alts: Vec<Alt>, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            alts,
            memo_annotation: false,
            span,
            nullable: false,
            left_recursive: false,
            leader: false,
            memo: false,
        }
    }

    /// Name of the private method holding the rule's alternatives in the generated parser.
    pub fn body_name(&self) -> String {
        format!("__{}_body", self.name)
    }
}

/// A `@name value` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub name: String,
    pub value: Option<String>,
    pub span: Span,
}

/// A parsed meta-grammar.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub rules: Vec<Rule>,
    pub metas: Vec<Meta>,
    index: HashMap<String, usize>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>, metas: Vec<Meta>) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        Self { rules, metas, index }
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn meta(&self, name: &str) -> Option<&Meta> {
        self.metas.iter().find(|m| m.name == name)
    }

    pub fn meta_value(&self, name: &str) -> Option<&str> {
        self.meta(name).and_then(|m| m.value.as_deref())
    }

    /// Start rules: the whitespace-separated names of `@start`, else the first rule.
    pub fn start_rules(&self) -> Vec<&str> {
        match self.meta_value("start") {
            Some(list) => list.split_whitespace().collect(),
            None => self.rules.first().map(|r| r.name.as_str()).into_iter().collect(),
        }
    }
}

// ============================================================================
// Display (meta-language)
// ============================================================================

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Name(name) => f.write_str(name),
            Item::Literal { value, quote } => {
                let q = if *quote == Quote::Single { '\'' } else { '"' };
                write!(f, "{q}{value}{q}")
            }
            Item::Group(alts) => {
                f.write_str("(")?;
                write_alts(f, alts)?;
                f.write_str(")")
            }
            Item::Optional(inner) => match inner.as_ref() {
                Item::Group(alts) => {
                    f.write_str("[")?;
                    write_alts(f, alts)?;
                    f.write_str("]")
                }
                other => write!(f, "{other}?"),
            },
            Item::Repeat0(inner) => write!(f, "{inner}*"),
            Item::Repeat1(inner) => write!(f, "{inner}+"),
            Item::Gather { sep, elem } => write!(f, "{sep}.{elem}+"),
            Item::PositiveLookahead(inner) => write!(f, "&{inner}"),
            Item::NegativeLookahead(inner) => write!(f, "!{inner}"),
            Item::Forced(inner) => write!(f, "&&{inner}"),
            Item::Cut => f.write_str("~"),
        }
    }
}

fn write_alts(f: &mut fmt::Formatter<'_>, alts: &[Alt]) -> fmt::Result {
    for (i, alt) in alts.iter().enumerate() {
        if i > 0 {
            f.write_str(" | ")?;
        }
        write!(f, "{alt}")?;
    }
    Ok(())
}

impl fmt::Display for NamedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}={}", self.item),
            None => write!(f, "{}", self.item),
        }
    }
}

/// Alternatives print without their action.
impl fmt::Display for Alt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.memo_annotation {
            f.write_str(" (memo)")?;
        }
        f.write_str(": ")?;
        write_alts(f, &self.alts)
    }
}
