//! Host-language fragments: rule types, actions, directives and identifiers.
//!
//! The generator never interprets these; it only checks that each one is a well-formed Rust
//! fragment of the expected shape so a bad action is reported against the grammar rather than as
//! a compile error deep inside generated code.

use proc_macro2::{Ident, Span as TokenSpan, TokenStream};
use quote::ToTokens;

use crate::errors::{GrammarError, GrammarErrorKind, GrammarResult};
use crate::grammar::Span;

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false", "fn", "for",
    "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static",
    "struct", "trait", "true", "try", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot even be written as raw identifiers.
const RESERVED_PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

fn host_error(what: &str, err: syn::Error, span: Span) -> GrammarError {
    GrammarError::new(GrammarErrorKind::HostCode, format!("{what}: {err}"), Some(span))
}

/// A rule or capture name as a Rust identifier; Rust keywords become raw identifiers.
pub(super) fn ident(name: &str, span: Span) -> GrammarResult<Ident> {
    if RESERVED_PATH_KEYWORDS.contains(&name) {
        return Err(GrammarError::new(
            GrammarErrorKind::HostCode,
            format!("'{name}' cannot be used as a rule or capture name"),
            Some(span),
        ));
    }
    if RUST_KEYWORDS.contains(&name) {
        Ok(Ident::new_raw(name, TokenSpan::call_site()))
    } else {
        Ok(Ident::new(name, TokenSpan::call_site()))
    }
}

pub(super) fn rule_type(text: &str, span: Span) -> GrammarResult<TokenStream> {
    syn::parse_str::<syn::Type>(text)
        .map(|ty| ty.into_token_stream())
        .map_err(|e| host_error(&format!("invalid rule type `{text}`"), e, span))
}

/// The statements of an action, to be spliced into a block whose tail is the action's value.
pub(super) fn action(text: &str, span: Span) -> GrammarResult<TokenStream> {
    syn::parse_str::<syn::Block>(&format!("{{ {text} }}"))
        .map(|block| block.stmts.iter().map(|stmt| stmt.to_token_stream()).collect())
        .map_err(|e| host_error("invalid action", e, span))
}

/// Top-level items of a `@subheader` or `@trailer` directive.
pub(super) fn items(text: &str, span: Span) -> GrammarResult<TokenStream> {
    syn::parse_str::<syn::File>(text)
        .map(|file| file.items.iter().map(|item| item.to_token_stream()).collect())
        .map_err(|e| host_error("invalid directive code", e, span))
}

pub(super) fn path(text: &str) -> GrammarResult<syn::Path> {
    syn::parse_str::<syn::Path>(text)
        .map_err(|e| GrammarError::new(GrammarErrorKind::HostCode, format!("invalid runtime path `{text}`: {e}"), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_names_become_raw_identifiers() {
        assert_eq!(ident("type", Span::default()).unwrap().to_string(), "r#type");
        assert_eq!(ident("expr", Span::default()).unwrap().to_string(), "expr");
        assert!(ident("self", Span::default()).is_err());
    }

    #[test]
    fn test_action_accepts_statements_and_rejects_garbage() {
        let stmts = action("let x = 1; x + 1", Span::default()).unwrap().to_string();
        assert_eq!(stmts, "let x = 1 ; x + 1");
        assert!(action("return None", Span::default()).is_ok());
        let err = action("a +* )", Span::new(3, 5)).unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::HostCode);
    }

    #[test]
    fn test_rule_type_must_be_a_type() {
        assert!(rule_type("Vec<Box<Expr>>", Span::default()).is_ok());
        assert!(rule_type("Vec<", Span::default()).is_err());
    }
}
