//! Front end for `.gram` files: lexing and parsing of the meta-language into a [`Grammar`].

mod lexer;
mod parser;

pub use lexer::{MetaLexer, MetaToken, MetaTokenKind};
pub use parser::MetaParser;

use crate::errors::GrammarResult;
use crate::grammar::Grammar;

/// Parse grammar text into the IR. Derived rule properties are left unset.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse_grammar(source: &str) -> GrammarResult<Grammar> {
    let tokens = MetaLexer::new(source).tokenize()?;
    let grammar = MetaParser::new(tokens).parse()?;
    tracing::debug!(rules = grammar.rules.len(), metas = grammar.metas.len(), "parsed grammar");
    Ok(grammar)
}
