//! Rust emission for an analysed grammar.
//!
//! The output is one self-contained Rust file meant to be `include!`d into a module of the crate
//! that owns the grammar's action code. It contains:
//! - the `@subheader` items,
//! - `KEYWORDS`, `SOFT_KEYWORDS` and `RULE_NAMES` tables,
//! - the parser struct wrapping a runtime `ParserState` and implementing `PegParser`,
//! - one entry method and one body per rule (see [`rules`]),
//! - the `@trailer` items.
//!
//! ## Notes
//! - Emission builds a `syn::File` and formats it via `prettyplease`; with formatting disabled the
//!   raw token stream is written instead.
//! - Rule ids are assigned in declaration order starting at `GeneratorConfig::rule_id_base`.

mod host;
mod rules;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use crate::analysis::Analysis;
use crate::config::{DEFAULT_CLASS_NAME, GeneratorConfig};
use crate::errors::{GrammarError, GrammarErrorKind, GrammarResult};
use crate::grammar::Grammar;
use rules::RuleEmitter;

/// Emit the parser for an analysed grammar as Rust source text.
#[tracing::instrument(skip_all, fields(rules = grammar.rules.len()))]
pub fn emit_parser(
    grammar: &Grammar,
    analysis: &Analysis,
    config: &GeneratorConfig,
    source_name: &str,
) -> GrammarResult<String> {
    let tokens = emit_tokens(grammar, analysis, config)?;
    let file: syn::File = syn::parse2(tokens).map_err(|e| {
        GrammarError::new(GrammarErrorKind::Emit, format!("generated code does not parse: {e}"), None)
    })?;
    let body = if config.format {
        prettyplease::unparse(&file)
    } else {
        file.into_token_stream().to_string()
    };
    Ok(format!(
        "// @generated by serpent-pegen v{} from {source_name}. Do not edit.\n\n{body}",
        env!("CARGO_PKG_VERSION")
    ))
}

/// Emit the parser as an unformatted token stream.
pub fn emit_tokens(grammar: &Grammar, analysis: &Analysis, config: &GeneratorConfig) -> GrammarResult<TokenStream> {
    let rt = host::path(&config.runtime_path)?;
    let class_name = config
        .class_name
        .as_deref()
        .or_else(|| grammar.meta_value("class"))
        .unwrap_or(DEFAULT_CLASS_NAME);
    let class_span = grammar.meta("class").map(|m| m.span).unwrap_or_default();
    let class = host::ident(class_name, class_span)?;

    let subheader = directive(grammar, "subheader")?;
    let trailer = directive(grammar, "trailer")?;

    let last_id = usize::from(config.rule_id_base) + grammar.rules.len();
    if last_id > usize::from(u16::MAX) {
        return Err(GrammarError::new(
            GrammarErrorKind::Emit,
            format!("{} rules do not fit the rule id space above {}", grammar.rules.len(), config.rule_id_base),
            None,
        ));
    }

    let mut emitter = RuleEmitter::new(grammar, &rt, config.rule_comments);
    let mut methods = Vec::with_capacity(grammar.rules.len());
    for (offset, rule) in (0u16..).zip(&grammar.rules) {
        methods.push(emitter.rule(rule, config.rule_id_base + offset)?);
    }

    let keywords = &analysis.keywords;
    let soft_keywords = &analysis.soft_keywords;
    let rule_names = grammar.rules.iter().map(|r| r.name.as_str());
    let base = config.rule_id_base;

    tracing::debug!(class = class_name, methods = methods.len(), "emitted rule methods");
    Ok(quote! {
        #subheader

        #[allow(unused_imports)]
        use #rt::PegParser as _;

        /// Reserved keywords of the grammar; `NAME` never matches these.
        pub const KEYWORDS: &[&str] = &[#(#keywords),*];
        /// Soft keywords of the grammar, matched by text against `NAME` tokens.
        pub const SOFT_KEYWORDS: &[&str] = &[#(#soft_keywords),*];
        /// Rule names indexed by `rule id - RULE_ID_BASE`.
        pub const RULE_NAMES: &[&str] = &[#(#rule_names),*];
        pub const RULE_ID_BASE: #rt::RuleId = #base;

        pub struct #class<'s> {
            state: #rt::ParserState<'s>,
        }

        #[allow(dead_code)]
        impl<'s> #class<'s> {
            pub fn new(stream: #rt::TokenStream<'s>) -> Self {
                Self::from_state(#rt::ParserState::new(stream, KEYWORDS, SOFT_KEYWORDS))
            }

            pub fn from_state(state: #rt::ParserState<'s>) -> Self {
                Self { state }
            }

            pub fn into_state(self) -> #rt::ParserState<'s> {
                self.state
            }

            pub fn rule_name(id: #rt::RuleId) -> Option<&'static str> {
                let index = id.checked_sub(RULE_ID_BASE)?;
                RULE_NAMES.get(usize::from(index)).copied()
            }
        }

        impl<'s> #rt::PegParser<'s> for #class<'s> {
            fn state(&self) -> &#rt::ParserState<'s> {
                &self.state
            }

            fn state_mut(&mut self) -> &mut #rt::ParserState<'s> {
                &mut self.state
            }
        }

        #[allow(
            dead_code,
            unused_braces,
            unused_variables,
            unused_labels,
            unused_parens,
            unused_mut,
            unreachable_code,
            non_snake_case,
            clippy::all
        )]
        impl<'s> #class<'s> {
            #(#methods)*
        }

        #trailer
    })
}

fn directive(grammar: &Grammar, name: &str) -> GrammarResult<TokenStream> {
    match grammar.meta(name) {
        Some(meta) => host::items(meta.value.as_deref().unwrap_or_default(), meta.span),
        None => Ok(TokenStream::new()),
    }
}
