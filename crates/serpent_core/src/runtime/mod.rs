//! Language-neutral PEG parser runtime.
//!
//! Every generated parser owns a [`ParserState`] and implements [`PegParser`]; the trait's provided
//! methods are the whole runtime surface the generator emits calls to:
//! - rule drivers: [`PegParser::plain_rule`], [`PegParser::memo_rule`] and
//!   [`PegParser::left_rec_rule`] (grow-the-seed),
//! - token matching: [`PegParser::expect_kind`], [`PegParser::expect_op`],
//!   [`PegParser::expect_keyword`], [`PegParser::expect_soft_keyword`], [`PegParser::name_token`],
//! - control: [`PegParser::lookahead`], [`PegParser::forced`], [`PegParser::raise_error`].
//!
//! ## Notes
//! - A parse is single-threaded and synchronous. The memo table and error state live in the
//!   [`ParserState`] of one parse and are dropped with it.
//! - Failure of an alternative is not an error. Errors are only recorded for lexical failures,
//!   forced tokens, context checks raised by actions, depth overflow and contract violations; once
//!   recorded, every rule returns `None` until the stack unwinds.

mod error;
mod memo;
mod parser;
mod state;

pub use error::{ErrorKind, Expected, RuntimeError};
pub use memo::{MemoEntry, MemoTable, Memoized};
pub use parser::PegParser;
pub use state::{ParserState, DEFAULT_EXPECTED_LIMIT, DEFAULT_MAX_DEPTH};

/// Small integer identifying a rule in memo keys. Generators assign them in declaration order.
pub type RuleId = u16;
