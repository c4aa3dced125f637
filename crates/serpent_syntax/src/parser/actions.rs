//! Node constructors and checks called from the actions in `grammar/python.gram`.
//!
//! Free functions only build nodes. Methods on [`PythonParser`] need the parser itself: they read
//! the token buffer (bracket depth, type ignores), re-enter the grammar for f-string fields, or
//! raise errors.

use std::ops::Range;

use serpent_core::{ErrorKind, OpKind, ParserState, PegParser, Position, RuntimeError, Token, TokenKind, TokenStream};

use super::generated::{KEYWORDS, PythonParser, SOFT_KEYWORDS};
use crate::ast::*;
use crate::literals::{self, FStringPart};
use crate::tokenizer::Tokenizer;

// ============================================================================
// Node constructors
// ============================================================================

pub(super) fn node<T>(node: T, start: Position, end: Position) -> Spanned<T> {
    Spanned::new(node, Span::new(start, end))
}

pub(super) fn name_expr(tok: &Token, ctx: ExprContext) -> Expr {
    node(
        ExprKind::Name {
            id: tok.text.clone(),
            ctx,
        },
        tok.start,
        tok.end,
    )
}

pub(super) fn constant(value: Constant, start: Position, end: Position) -> Expr {
    node(ExprKind::Constant { value, kind: None }, start, end)
}

pub(super) fn prepend<T>(first: T, mut rest: Vec<T>) -> Vec<T> {
    rest.insert(0, first);
    rest
}

pub(super) fn binop(left: Expr, op: Operator, right: Expr, start: Position, end: Position) -> Expr {
    node(
        ExprKind::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        start,
        end,
    )
}

pub(super) fn unary(op: UnaryOp, operand: Expr, start: Position, end: Position) -> Expr {
    node(
        ExprKind::UnaryOp {
            op,
            operand: Box::new(operand),
        },
        start,
        end,
    )
}

pub(super) fn bool_op(op: BoolOp, first: Expr, rest: Vec<Expr>, start: Position, end: Position) -> Expr {
    node(
        ExprKind::BoolOp {
            op,
            values: prepend(first, rest),
        },
        start,
        end,
    )
}

pub(super) fn compare(left: Expr, pairs: Vec<(CmpOp, Expr)>, start: Position, end: Position) -> Expr {
    let (ops, comparators) = pairs.into_iter().unzip();
    node(
        ExprKind::Compare {
            left: Box::new(left),
            ops,
            comparators,
        },
        start,
        end,
    )
}

pub(super) fn tuple_expr(elts: Vec<Expr>, ctx: ExprContext, start: Position, end: Position) -> Expr {
    node(ExprKind::Tuple { elts, ctx }, start, end)
}

pub(super) fn list_expr(elts: Vec<Expr>, ctx: ExprContext, start: Position, end: Position) -> Expr {
    node(ExprKind::List { elts, ctx }, start, end)
}

pub(super) fn starred(value: Expr, ctx: ExprContext, start: Position, end: Position) -> Expr {
    node(
        ExprKind::Starred {
            value: Box::new(value),
            ctx,
        },
        start,
        end,
    )
}

pub(super) fn attribute(value: Expr, attr: &Token, ctx: ExprContext, start: Position, end: Position) -> Expr {
    node(
        ExprKind::Attribute {
            value: Box::new(value),
            attr: attr.text.clone(),
            ctx,
        },
        start,
        end,
    )
}

pub(super) fn subscript(value: Expr, slice: Expr, ctx: ExprContext, start: Position, end: Position) -> Expr {
    node(
        ExprKind::Subscript {
            value: Box::new(value),
            slice: Box::new(slice),
            ctx,
        },
        start,
        end,
    )
}

pub(super) fn call(func: Expr, args: (Vec<Expr>, Vec<Keyword>), start: Position, end: Position) -> Expr {
    let (args, keywords) = args;
    node(
        ExprKind::Call {
            func: Box::new(func),
            args,
            keywords,
        },
        start,
        end,
    )
}

/// `{k: v, **m}`: a `None` key marks a `**` unpacking.
pub(super) fn dict_expr(pairs: Vec<(Option<Expr>, Expr)>, start: Position, end: Position) -> Expr {
    let (keys, values) = pairs.into_iter().unzip();
    node(ExprKind::Dict { keys, values }, start, end)
}

pub(super) fn comprehension(target: Expr, iter: Expr, ifs: Vec<Expr>, is_async: bool) -> Comprehension {
    Comprehension {
        target,
        iter,
        ifs,
        is_async,
    }
}

/// Attach decorators to a definition. The node then starts at the first `@`.
/// The definition keeps its own position: `def`/`class` line, not the first decorator.
pub(super) fn decorated(mut def: Stmt, decorators: Vec<Expr>) -> Stmt {
    match &mut def.node {
        StmtKind::FunctionDef(f) | StmtKind::AsyncFunctionDef(f) => f.decorator_list = decorators,
        StmtKind::ClassDef(c) => c.decorator_list = decorators,
        _ => {}
    }
    def
}

pub(super) fn type_comment(tok: Option<Token>) -> Option<String> {
    tok.map(|t| t.text)
}

pub(super) fn function_def(
    name: Token,
    type_params: Option<Vec<TypeParam>>,
    params: Option<Arguments>,
    returns: Option<Expr>,
    tc: Option<Token>,
    body: Vec<Stmt>,
) -> FunctionDef {
    FunctionDef {
        name: name.text,
        args: Box::new(params.unwrap_or_default()),
        body,
        decorator_list: Vec::new(),
        returns: returns.map(Box::new),
        type_comment: type_comment(tc),
        type_params: type_params.unwrap_or_default(),
    }
}

pub(super) fn for_loop(target: Expr, iter: Expr, body: Vec<Stmt>, orelse: Option<Vec<Stmt>>, tc: Option<Token>) -> For {
    For {
        target: Box::new(target),
        iter: Box::new(iter),
        body,
        orelse: orelse.unwrap_or_default(),
        type_comment: type_comment(tc),
    }
}

pub(super) fn class_match(
    cls: Expr,
    patterns: Vec<Pattern>,
    keywords: Vec<(Ident, Pattern)>,
    start: Position,
    end: Position,
) -> Pattern {
    let (kwd_attrs, kwd_patterns) = keywords.into_iter().unzip();
    node(
        PatternKind::MatchClass {
            cls: Box::new(cls),
            patterns,
            kwd_attrs,
            kwd_patterns,
        },
        start,
        end,
    )
}

// ============================================================================
// Parameters and call arguments
// ============================================================================

pub(super) fn arg(name: &Token, annotation: Option<Expr>, start: Position, end: Position) -> Arg {
    node(
        ArgData {
            arg: name.text.clone(),
            annotation: annotation.map(Box::new),
            type_comment: None,
        },
        start,
        end,
    )
}

pub(super) fn with_type_comment(mut arg: Arg, tc: Option<Token>) -> Arg {
    if tc.is_some() {
        arg.node.type_comment = type_comment(tc);
    }
    arg
}

/// Everything after the first `*` (or `**`) of a parameter list.
#[derive(Debug, Clone, Default)]
pub struct StarEtc {
    pub vararg: Option<Arg>,
    pub kwonly: Vec<(Arg, Option<Expr>)>,
    pub kwarg: Option<Arg>,
}

pub(super) fn star_etc(vararg: Option<Arg>, kwonly: Vec<(Arg, Option<Expr>)>, kwarg: Option<Arg>) -> StarEtc {
    StarEtc { vararg, kwonly, kwarg }
}

/// Assemble the parameter slots. Defaults of positional-only and ordinary parameters share one list.
pub(super) fn make_arguments(
    slash_plain: Vec<Arg>,
    slash_defaults: Vec<(Arg, Expr)>,
    plain: Vec<Arg>,
    defaults: Vec<(Arg, Expr)>,
    star: Option<StarEtc>,
) -> Arguments {
    let mut out = Arguments {
        posonlyargs: slash_plain,
        args: plain,
        ..Arguments::default()
    };
    for (a, d) in slash_defaults {
        out.posonlyargs.push(a);
        out.defaults.push(d);
    }
    for (a, d) in defaults {
        out.args.push(a);
        out.defaults.push(d);
    }
    if let Some(star) = star {
        out.vararg = star.vararg.map(Box::new);
        for (a, d) in star.kwonly {
            out.kwonlyargs.push(a);
            out.kw_defaults.push(d);
        }
        out.kwarg = star.kwarg.map(Box::new);
    }
    out
}

/// A call argument after the plain positional ones.
#[derive(Debug, Clone)]
pub enum KwArg {
    Starred(Expr),
    Keyword(Keyword),
}

pub(super) fn keyword(arg: Option<&Token>, value: Expr, start: Position, end: Position) -> KwArg {
    KwArg::Keyword(node(
        KeywordData {
            arg: arg.map(|t| t.text.clone()),
            value,
        },
        start,
        end,
    ))
}

/// Split call arguments: starred entries join the positional list, in order.
pub(super) fn call_args(mut positional: Vec<Expr>, rest: Vec<KwArg>) -> (Vec<Expr>, Vec<Keyword>) {
    let mut keywords = Vec::new();
    for item in rest {
        match item {
            KwArg::Starred(e) => positional.push(e),
            KwArg::Keyword(k) => keywords.push(k),
        }
    }
    (positional, keywords)
}

/// Source range covered by a set of call arguments.
pub(super) fn args_span(args: &(Vec<Expr>, Vec<Keyword>)) -> Option<Span> {
    args.0
        .iter()
        .map(|e| e.span)
        .chain(args.1.iter().map(|k| k.span))
        .reduce(Span::merge)
}

/// The last expression of a comprehension clause list: the final `if`, else the iterable.
pub(super) fn last_comprehension_item(generators: &[Comprehension]) -> Option<&Expr> {
    let last = generators.last()?;
    Some(last.ifs.last().unwrap_or(&last.iter))
}

// ============================================================================
// Imports
// ============================================================================

/// Relative import level from the dots before the module name; `...` is one token worth three.
pub(super) fn import_level(dots: &[Token]) -> u32 {
    dots.iter()
        .map(|t| if t.kind == TokenKind::Op(OpKind::Ellipsis) { 3 } else { 1 })
        .sum()
}

pub(super) fn alias(name: String, asname: Option<Token>, start: Position, end: Position) -> Alias {
    node(
        AliasData {
            name,
            asname: asname.map(|t| t.text),
        },
        start,
        end,
    )
}

// ============================================================================
// f-string assembly
// ============================================================================

/// Collects the values of a `JoinedStr`, merging adjacent literal text.
struct JoinedParts {
    span: Span,
    values: Vec<Expr>,
    pending: String,
}

impl JoinedParts {
    fn new(span: Span) -> Self {
        Self {
            span,
            values: Vec::new(),
            pending: String::new(),
        }
    }

    fn literal(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.values.push(constant(Constant::Str(text), self.span.start, self.span.end));
        }
    }

    fn value(&mut self, expr: Expr) {
        self.flush();
        self.values.push(expr);
    }

    fn finish(mut self) -> Vec<Expr> {
        self.flush();
        self.values
    }
}

/// Position of byte `byte` of a token's text in the enclosing file.
fn position_within(tok: &Token, byte: usize) -> Position {
    let before = tok.text.get(..byte).unwrap_or("");
    let offset = tok.start.offset + byte;
    match before.rfind('\n') {
        Some(nl) => Position::new(
            tok.start.line + before.matches('\n').count() as u32,
            (byte - nl - 1) as u32,
            offset,
        ),
        None => Position::new(tok.start.line, tok.start.col + byte as u32, offset),
    }
}

const LEGACY_STATEMENTS: &[&str] = &["print", "exec"];

fn is_legacy_statement(expr: &Expr) -> bool {
    matches!(&expr.node, ExprKind::Name { id, .. } if LEGACY_STATEMENTS.contains(&id.as_str()))
}

impl PythonParser<'_> {
    // ========================================================================
    // Nodes that need parser state
    // ========================================================================

    pub(super) fn make_module(&self, body: Vec<Stmt>) -> Mod {
        let type_ignores = self
            .state()
            .stream()
            .type_ignores()
            .iter()
            .map(|t| TypeIgnore {
                lineno: t.start.line,
                tag: t.text.clone(),
            })
            .collect();
        Mod::Module { body, type_ignores }
    }

    pub(super) fn make_number(&mut self, tok: &Token) -> Option<Expr> {
        match literals::parse_number(&tok.text) {
            Ok(value) => Some(constant(value, tok.start, tok.end)),
            Err(message) => {
                self.raise_token(tok, message);
                None
            }
        }
    }

    /// A pattern number that must not be complex.
    pub(super) fn ensure_real(&mut self, tok: &Token) -> Option<Expr> {
        let number = self.make_number(tok)?;
        if matches!(number.node, ExprKind::Constant { value: Constant::Complex { .. }, .. }) {
            self.raise_on(number.span, "real number required in complex literal");
            return None;
        }
        Some(number)
    }

    /// A pattern number that must be imaginary.
    pub(super) fn ensure_imaginary(&mut self, tok: &Token) -> Option<Expr> {
        let number = self.make_number(tok)?;
        if !matches!(number.node, ExprKind::Constant { value: Constant::Complex { .. }, .. }) {
            self.raise_on(number.span, "imaginary number required in complex literal");
            return None;
        }
        Some(number)
    }

    /// Implicit concatenation of adjacent string tokens into one constant or f-string.
    pub(super) fn concatenate_strings(&mut self, tokens: &[Token]) -> Option<Expr> {
        let (first, last) = (tokens.first()?, tokens.last()?);
        let (start, end) = (first.start, last.end);
        let pieces: Vec<_> = tokens.iter().map(|t| (t, literals::split_string(&t.text))).collect();

        let bytes = pieces[0].1.prefix.bytes;
        if pieces.iter().any(|(_, lit)| lit.prefix.bytes != bytes) {
            self.raise_range(start, end, "cannot mix bytes and nonbytes literals");
            return None;
        }

        if bytes {
            let mut value = Vec::new();
            for (tok, lit) in &pieces {
                match literals::decode_bytes(lit.body, lit.prefix.raw) {
                    Ok(decoded) => value.extend(decoded),
                    Err(message) => {
                        self.raise_token(tok, message);
                        return None;
                    }
                }
            }
            return Some(constant(Constant::Bytes(value), start, end));
        }

        if !pieces.iter().any(|(_, lit)| lit.prefix.fstring) {
            let mut value = String::new();
            for (tok, lit) in &pieces {
                match literals::decode_string(lit.body, lit.prefix.raw) {
                    Ok(decoded) => value.push_str(&decoded),
                    Err(message) => {
                        self.raise_token(tok, message);
                        return None;
                    }
                }
            }
            let kind = pieces[0].1.prefix.unicode.then(|| "u".to_string());
            return Some(node(
                ExprKind::Constant {
                    value: Constant::Str(value),
                    kind,
                },
                start,
                end,
            ));
        }

        let mut parts = JoinedParts::new(Span::new(start, end));
        for (tok, lit) in &pieces {
            if lit.prefix.fstring {
                let fields = match literals::parse_fstring(&tok.text) {
                    Ok(fields) => fields,
                    Err(message) => {
                        self.raise_token(tok, message);
                        return None;
                    }
                };
                self.push_fstring(&mut parts, tok, fields)?;
            } else {
                match literals::decode_string(lit.body, lit.prefix.raw) {
                    Ok(decoded) => parts.literal(&decoded),
                    Err(message) => {
                        self.raise_token(tok, message);
                        return None;
                    }
                }
            }
        }
        Some(node(ExprKind::JoinedStr(parts.finish()), start, end))
    }

    fn push_fstring(&mut self, out: &mut JoinedParts, tok: &Token, fields: Vec<FStringPart>) -> Option<()> {
        let span = out.span;
        for part in fields {
            let field = match part {
                FStringPart::Literal(text) => {
                    out.literal(&text);
                    continue;
                }
                FStringPart::Field(field) => field,
            };
            if let Some(debug) = &field.debug_text {
                out.literal(debug);
            }
            let value = self.fstring_field(tok, field.expr.clone())?;
            let format_spec = match field.spec {
                Some(spec) => {
                    let mut inner = JoinedParts::new(span);
                    self.push_fstring(&mut inner, tok, spec)?;
                    Some(Box::new(node(ExprKind::JoinedStr(inner.finish()), span.start, span.end)))
                }
                None => None,
            };
            // `{x=}` shows the repr unless a conversion or a spec is given.
            let conversion = if field.debug_text.is_some() && field.conversion == Conversion::None && format_spec.is_none()
            {
                Conversion::Repr
            } else {
                field.conversion
            };
            out.value(node(
                ExprKind::FormattedValue {
                    value: Box::new(value),
                    conversion,
                    format_spec,
                },
                span.start,
                span.end,
            ));
        }
        Some(())
    }

    /// Parse one replacement field with the `fstring` start rule, at its place in the file.
    fn fstring_field(&mut self, tok: &Token, range: Range<usize>) -> Option<Expr> {
        let Some(text) = tok.text.get(range.clone()) else {
            self.state_mut()
                .raise(RuntimeError::internal("f-string field outside its token"));
            return None;
        };
        let origin = position_within(tok, range.start);
        let tokenizer = Tokenizer::new(text).with_origin(origin).with_implicit_parens();
        let remaining = self.state().max_depth().saturating_sub(self.state().depth());
        let state = ParserState::new(TokenStream::new(tokenizer), KEYWORDS, SOFT_KEYWORDS)
            .with_feature_version(self.state().feature_version())
            .with_max_depth(remaining);
        let mut sub = PythonParser::from_state(state);

        let mut result = sub.fstring();
        if result.is_none() && !sub.has_error() {
            sub.state_mut().reset_for_error_pass();
            result = sub.fstring();
        }
        if result.is_some() && !sub.has_error() {
            return result;
        }

        let err = sub.state_mut().take_error().unwrap_or_else(|| {
            let (start, end) = sub
                .state()
                .stream()
                .tokens()
                .last()
                .map(|t| (t.start, t.end))
                .unwrap_or((origin, origin));
            RuntimeError::new(ErrorKind::UnexpectedToken, "invalid syntax", start, end)
        });
        let message = if err.message.starts_with("f-string: ") {
            err.message
        } else {
            format!("f-string: {}", err.message)
        };
        self.state_mut().raise(RuntimeError { message, ..err });
        None
    }

    // ========================================================================
    // Raising errors
    // ========================================================================

    pub(super) fn raise_range(&mut self, start: Position, end: Position, message: impl Into<String>) {
        self.state_mut().raise(RuntimeError::new(
            ErrorKind::InvalidSyntaxInContext,
            message,
            start,
            end,
        ));
    }

    pub(super) fn raise_on(&mut self, span: Span, message: impl Into<String>) {
        self.raise_range(span.start, span.end, message);
    }

    pub(super) fn raise_token(&mut self, tok: &Token, message: impl Into<String>) {
        self.raise_range(tok.start, tok.end, message);
    }

    /// Raise at the furthest token read so far.
    pub(super) fn raise_last(&mut self, message: impl Into<String>) {
        let (start, end) = self.last_token_range();
        self.raise_range(start, end, message);
    }

    pub(super) fn raise_indentation(&mut self, message: impl Into<String>) {
        let (start, end) = self.last_token_range();
        self.state_mut()
            .raise(RuntimeError::new(ErrorKind::Indentation, message, start, end));
    }

    fn last_token_range(&self) -> (Position, Position) {
        match self.state().stream().tokens().last() {
            Some(tok) => (tok.start, tok.end),
            None => (Position::start(), Position::start()),
        }
    }

    /// `cannot assign to %s` / `cannot delete %s` at the first sub-expression that is no target.
    pub(super) fn raise_invalid_target(&mut self, kind: TargetKind, target: &Expr) {
        match target.invalid_target(kind) {
            Some(bad) => {
                let verb = if kind == TargetKind::Del { "delete" } else { "assign to" };
                let message = format!("cannot {verb} {}", bad.node.describe());
                self.raise_on(bad.span, message);
            }
            None => self.raise_last("invalid syntax"),
        }
    }

    /// Two expressions side by side inside brackets: probably a missing comma.
    pub(super) fn raise_forgot_comma(&mut self, a: &Expr, b: &Expr) {
        if is_legacy_statement(a) || self.bracket_level() == 0 {
            return;
        }
        self.raise_range(a.span.start, b.span.end, "invalid syntax. Perhaps you forgot a comma?");
    }

    /// `print x` and `exec x`.
    pub(super) fn raise_legacy_call(&mut self, name: &Token, rest: &Expr) {
        if LEGACY_STATEMENTS.contains(&name.text.as_str()) {
            let message = format!("Missing parentheses in call to '{0}'. Did you mean {0}(...)?", name.text);
            self.raise_range(name.start, rest.span.end, message);
        }
    }

    /// `f(a, b for b in c)`: a bare generator is only allowed as the sole argument.
    pub(super) fn raise_nonparen_genexp(&mut self, args: &(Vec<Expr>, Vec<Keyword>), generators: &[Comprehension]) {
        if args.0.len() <= 1 {
            return;
        }
        if let Some(elt) = args.0.last() {
            self.raise_genexp(elt, generators);
        }
    }

    /// `Generator expression must be parenthesized` from `elt` to the end of its clauses.
    pub(super) fn raise_genexp(&mut self, elt: &Expr, generators: &[Comprehension]) {
        let end = last_comprehension_item(generators).map_or(elt.span.end, |e| e.span.end);
        self.raise_range(elt.span.start, end, "Generator expression must be parenthesized");
    }

    pub(super) fn raise_on_args(&mut self, args: &(Vec<Expr>, Vec<Keyword>), message: &str) {
        match args_span(args) {
            Some(span) => self.raise_on(span, message),
            None => self.raise_last(message),
        }
    }

    pub(super) fn raise_positional_after_keyword(&mut self, args: &(Vec<Expr>, Vec<Keyword>)) {
        let unpacking = args.1.iter().any(|k| k.node.arg.is_none());
        let message = if unpacking {
            "positional argument follows keyword argument unpacking"
        } else {
            "positional argument follows keyword argument"
        };
        self.raise_last(message);
    }

    /// Bracket nesting at the end of the consumed input.
    fn bracket_level(&self) -> i32 {
        let tokens = self.state().stream().tokens();
        let upto = self.mark().min(tokens.len());
        tokens[..upto]
            .iter()
            .map(|t| match t.kind {
                TokenKind::Op(OpKind::Lpar | OpKind::Lsqb | OpKind::Lbrace) => 1,
                TokenKind::Op(OpKind::Rpar | OpKind::Rsqb | OpKind::Rbrace) => -1,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, text: &str, line: u32, col: u32, offset: usize) -> Token {
        let end = Position::new(line, col + text.len() as u32, offset + text.len());
        Token::new(kind, text, Position::new(line, col, offset), end)
    }

    #[test]
    fn test_make_arguments_orders_slots() {
        let p = |name: &str, at: usize| {
            let name = tok(TokenKind::Name, name, 1, at as u32, at);
            arg(&name, None, name.start, name.end)
        };
        let zero = constant(Constant::Int(Int::Small(0)), Position::start(), Position::start());
        let args = make_arguments(
            vec![p("a", 0)],
            vec![(p("b", 2), zero.clone())],
            vec![],
            vec![(p("c", 4), zero.clone())],
            Some(star_etc(Some(p("d", 6)), vec![(p("e", 8), None)], Some(p("f", 10)))),
        );
        let names = |v: &[Arg]| v.iter().map(|a| a.node.arg.clone()).collect::<Vec<_>>();
        assert_eq!(names(&args.posonlyargs), ["a", "b"]);
        assert_eq!(names(&args.args), ["c"]);
        assert_eq!(args.defaults.len(), 2);
        assert_eq!(args.vararg.map(|a| a.node.arg), Some("d".to_string()));
        assert_eq!(names(&args.kwonlyargs), ["e"]);
        assert_eq!(args.kw_defaults, vec![None]);
        assert_eq!(args.kwarg.map(|a| a.node.arg), Some("f".to_string()));
    }

    #[test]
    fn test_import_level_counts_ellipsis_as_three() {
        let dots = [
            tok(TokenKind::Op(OpKind::Ellipsis), "...", 1, 5, 5),
            tok(TokenKind::Op(OpKind::Dot), ".", 1, 8, 8),
        ];
        assert_eq!(import_level(&dots), 4);
    }

    #[test]
    fn test_position_within_multiline_token() {
        let t = tok(TokenKind::String, "f'''a\n  {x}'''", 3, 4, 20);
        let p = position_within(&t, 9);
        assert_eq!((p.line, p.col, p.offset), (4, 3, 29));
        let q = position_within(&t, 2);
        assert_eq!((q.line, q.col), (3, 6));
    }

    #[test]
    fn test_call_args_keeps_starred_positional() {
        let at = Position::start();
        let x = constant(Constant::None, at, at);
        let (args, kws) = call_args(
            vec![x.clone()],
            vec![
                keyword(None, x.clone(), at, at),
                KwArg::Starred(starred(x.clone(), ExprContext::Load, at, at)),
            ],
        );
        assert_eq!(args.len(), 2);
        assert_eq!(kws.len(), 1);
    }
}
