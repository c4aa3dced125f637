//! Python keyword vocabulary.
//!
//! Hard keywords are reserved: the `NAME` token class never matches them. Soft keywords are
//! ordinary identifiers that the grammar matches by text in specific positions only.
//!
//! ## Notes
//! - The generator derives its own keyword tables from the grammar (single-quoted strings are hard,
//!   double-quoted strings are soft). This registry is the reference those tables are checked
//!   against, and it records the language version that introduced each soft keyword so the runtime
//!   can honour a configured feature version.
//!
//! ## Examples
//! ```rust
//! use serpent_core::keywords::{self, KeywordClass};
//!
//! assert_eq!(keywords::class_of("lambda"), Some(KeywordClass::Hard));
//! assert_eq!(keywords::class_of("match"), Some(KeywordClass::Soft));
//! assert!(keywords::soft_keyword_enabled("match", (3, 10)));
//! assert!(!keywords::soft_keyword_enabled("type", (3, 11)));
//! ```

/// Whether a keyword is reserved everywhere or only in specific grammar positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordClass {
    Hard,
    Soft,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub spelling: &'static str,
    pub class: KeywordClass,
    /// First language version (major, minor) with this keyword.
    pub since: (u8, u8),
}

const fn hard(spelling: &'static str) -> KeywordInfo {
    KeywordInfo {
        spelling,
        class: KeywordClass::Hard,
        since: (3, 0),
    }
}

const fn soft(spelling: &'static str, since: (u8, u8)) -> KeywordInfo {
    KeywordInfo {
        spelling,
        class: KeywordClass::Soft,
        since,
    }
}

/// Registry of all keywords.
pub const KEYWORDS: &[KeywordInfo] = &[
    hard("False"),
    hard("None"),
    hard("True"),
    hard("and"),
    hard("as"),
    hard("assert"),
    KeywordInfo {
        since: (3, 7),
        ..hard("async")
    },
    KeywordInfo {
        since: (3, 7),
        ..hard("await")
    },
    hard("break"),
    hard("class"),
    hard("continue"),
    hard("def"),
    hard("del"),
    hard("elif"),
    hard("else"),
    hard("except"),
    hard("finally"),
    hard("for"),
    hard("from"),
    hard("global"),
    hard("if"),
    hard("import"),
    hard("in"),
    hard("is"),
    hard("lambda"),
    hard("nonlocal"),
    hard("not"),
    hard("or"),
    hard("pass"),
    hard("raise"),
    hard("return"),
    hard("try"),
    hard("while"),
    hard("with"),
    hard("yield"),
    soft("_", (3, 10)),
    soft("case", (3, 10)),
    soft("match", (3, 10)),
    soft("type", (3, 12)),
];

/// Newest language version the registry describes.
pub const LATEST_VERSION: (u8, u8) = (3, 12);

/// Full metadata entry for a spelling.
pub fn info_for(spelling: &str) -> Option<&'static KeywordInfo> {
    KEYWORDS.iter().find(|k| k.spelling == spelling)
}

pub fn class_of(spelling: &str) -> Option<KeywordClass> {
    info_for(spelling).map(|k| k.class)
}

pub fn is_hard_keyword(spelling: &str) -> bool {
    class_of(spelling) == Some(KeywordClass::Hard)
}

/// Iterate over hard keyword spellings in registry order.
pub fn hard_keywords() -> impl Iterator<Item = &'static str> {
    KEYWORDS
        .iter()
        .filter(|k| k.class == KeywordClass::Hard)
        .map(|k| k.spelling)
}

/// Iterate over soft keyword spellings in registry order.
pub fn soft_keywords() -> impl Iterator<Item = &'static str> {
    KEYWORDS
        .iter()
        .filter(|k| k.class == KeywordClass::Soft)
        .map(|k| k.spelling)
}

/// Whether a soft keyword is recognised under `feature_version`.
///
/// Spellings unknown to the registry (grammar-local soft keywords) are always enabled.
pub fn soft_keyword_enabled(spelling: &str, feature_version: (u8, u8)) -> bool {
    match info_for(spelling) {
        Some(info) if info.class == KeywordClass::Soft => info.since <= feature_version,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_spellings() {
        for (i, a) in KEYWORDS.iter().enumerate() {
            for b in &KEYWORDS[i + 1..] {
                assert_ne!(a.spelling, b.spelling);
            }
        }
    }

    #[test]
    fn test_soft_keywords_are_identifiers() {
        for kw in soft_keywords() {
            assert!(!is_hard_keyword(kw));
            assert!(kw.chars().all(|c| c == '_' || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_unknown_soft_keyword_is_enabled() {
        assert!(soft_keyword_enabled("print", (3, 0)));
        assert!(!soft_keyword_enabled("match", (3, 9)));
    }

    #[test]
    fn test_hard_keyword_count() {
        assert_eq!(hard_keywords().count(), 35);
    }
}
