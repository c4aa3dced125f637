//! Turn syntax trees back into Python source.
//!
//! The output is not a formatter's output: comments and layout are gone, redundant parentheses
//! are dropped and a few are added. What it guarantees is that parsing the result gives back a
//! tree equal to the input apart from source positions.
//!
//! ```rust
//! use serpent_syntax::parser::{Mode, parse_source};
//! use serpent_syntax::unparse::unparse;
//!
//! let tree = parse_source("x = (1 +\n  2) * 3", Mode::Module).unwrap();
//! assert_eq!(unparse(&tree), "x = (1 + 2) * 3\n");
//! ```

mod writer;

use crate::ast::*;
use crate::dump::{preferred_quote, repr_constant, repr_str};
use writer::SourceWriter;

/// Binding strength of expression contexts, weakest first.
mod prec {
    pub const NAMED_EXPR: u8 = 0;
    pub const TUPLE: u8 = 1;
    pub const YIELD: u8 = 2;
    pub const TEST: u8 = 3;
    pub const OR: u8 = 4;
    pub const AND: u8 = 5;
    pub const NOT: u8 = 6;
    pub const CMP: u8 = 7;
    pub const EXPR: u8 = 8;
    pub const BOR: u8 = EXPR;
    pub const BXOR: u8 = 9;
    pub const BAND: u8 = 10;
    pub const SHIFT: u8 = 11;
    pub const ARITH: u8 = 12;
    pub const TERM: u8 = 13;
    pub const FACTOR: u8 = 14;
    pub const POWER: u8 = 15;
    pub const AWAIT: u8 = 16;
    pub const ATOM: u8 = 17;
}

use prec::*;

/// Python source for a whole tree.
pub fn unparse(tree: &Mod) -> String {
    let mut unparser = Unparser::new();
    match tree {
        Mod::Module { body, .. } | Mod::Interactive { body } => {
            for stmt in body {
                unparser.stmt(stmt);
            }
        }
        Mod::Expression { body } => {
            let text = unparser.expr(body, TUPLE);
            unparser.w.write(&text);
        }
        Mod::FunctionType { argtypes, returns } => {
            let args = unparser.comma_list(argtypes, TEST);
            let text = format!("({args}) -> {}", unparser.expr(returns, TEST));
            unparser.w.write(&text);
        }
    }
    unparser.w.finish()
}

/// Python source for one expression.
pub fn unparse_expr(expr: &Expr) -> String {
    Unparser::new().expr(expr, TUPLE)
}

fn parens_if(cond: bool, text: String) -> String {
    if cond { format!("({text})") } else { text }
}

fn binop_prec(op: Operator) -> u8 {
    match op {
        Operator::BitOr => BOR,
        Operator::BitXor => BXOR,
        Operator::BitAnd => BAND,
        Operator::LShift | Operator::RShift => SHIFT,
        Operator::Add | Operator::Sub => ARITH,
        Operator::Mult | Operator::MatMult | Operator::Div | Operator::Mod | Operator::FloorDiv => TERM,
        Operator::Pow => POWER,
    }
}

struct Unparser {
    w: SourceWriter,
    /// Quote of the enclosing f-string while unparsing a replacement field.
    fstring_quote: Option<char>,
}

impl Unparser {
    fn new() -> Self {
        Self {
            w: SourceWriter::new(),
            fstring_quote: None,
        }
    }

    fn in_fstring(quote: char) -> Self {
        Self {
            w: SourceWriter::new(),
            fstring_quote: Some(quote),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn line(&mut self, text: &str) {
        self.w.write(text);
        self.w.newline();
    }

    fn block(&mut self, header: &str, body: &[Stmt]) {
        self.w.write(header);
        self.w.write(":");
        self.w.newline();
        self.w.indent();
        if body.is_empty() {
            self.line("pass");
        }
        for stmt in body {
            self.stmt(stmt);
        }
        self.w.dedent();
    }

    fn else_block(&mut self, header: &str, body: &[Stmt]) {
        if !body.is_empty() {
            self.block(header, body);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.node {
            StmtKind::FunctionDef(def) => self.function_def(def, false),
            StmtKind::AsyncFunctionDef(def) => self.function_def(def, true),
            StmtKind::ClassDef(class) => self.class_def(class),
            StmtKind::Return(value) => {
                let text = match value {
                    Some(value) => format!("return {}", self.expr(value, TEST)),
                    None => "return".to_string(),
                };
                self.line(&text);
            }
            StmtKind::Delete(targets) => {
                let text = format!("del {}", self.comma_list(targets, TEST));
                self.line(&text);
            }
            StmtKind::Assign { targets, value, .. } => {
                let mut text = String::new();
                for target in targets {
                    text.push_str(&self.expr(target, TUPLE));
                    text.push_str(" = ");
                }
                text.push_str(&self.expr(value, TEST));
                self.line(&text);
            }
            StmtKind::TypeAlias {
                name,
                type_params,
                value,
            } => {
                let text = format!(
                    "type {}{} = {}",
                    self.expr(name, ATOM),
                    self.type_params(type_params),
                    self.expr(value, TEST)
                );
                self.line(&text);
            }
            StmtKind::AugAssign { target, op, value } => {
                let text = format!("{} {}= {}", self.expr(target, TEST), op.as_str(), self.expr(value, TEST));
                self.line(&text);
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
                simple,
            } => {
                let bare_name = matches!(target.node, ExprKind::Name { .. });
                let mut text = parens_if(!simple && bare_name, self.expr(target, TEST));
                text.push_str(": ");
                text.push_str(&self.expr(annotation, TEST));
                if let Some(value) = value {
                    text.push_str(" = ");
                    text.push_str(&self.expr(value, TEST));
                }
                self.line(&text);
            }
            StmtKind::For(f) => self.for_loop(f, false),
            StmtKind::AsyncFor(f) => self.for_loop(f, true),
            StmtKind::While { test, body, orelse } => {
                let header = format!("while {}", self.expr(test, TEST));
                self.block(&header, body);
                self.else_block("else", orelse);
            }
            StmtKind::If { test, body, orelse } => {
                let header = format!("if {}", self.expr(test, TEST));
                self.block(&header, body);
                let mut rest = orelse.as_slice();
                while let [
                    Spanned {
                        node: StmtKind::If { test, body, orelse },
                        ..
                    },
                ] = rest
                {
                    let header = format!("elif {}", self.expr(test, TEST));
                    self.block(&header, body);
                    rest = orelse.as_slice();
                }
                self.else_block("else", rest);
            }
            StmtKind::With(w) => self.with(w, false),
            StmtKind::AsyncWith(w) => self.with(w, true),
            StmtKind::Match { subject, cases } => {
                let header = format!("match {}:", self.expr(subject, TEST));
                self.line(&header);
                self.w.indent();
                for case in cases {
                    let mut header = format!("case {}", self.pattern(&case.pattern, false));
                    if let Some(guard) = &case.guard {
                        header.push_str(" if ");
                        header.push_str(&self.expr(guard, TEST));
                    }
                    self.block(&header, &case.body);
                }
                self.w.dedent();
            }
            StmtKind::Raise { exc, cause } => {
                let mut text = "raise".to_string();
                if let Some(exc) = exc {
                    text.push(' ');
                    text.push_str(&self.expr(exc, TEST));
                }
                if let Some(cause) = cause {
                    text.push_str(" from ");
                    text.push_str(&self.expr(cause, TEST));
                }
                self.line(&text);
            }
            StmtKind::Try(t) => self.try_stmt(t, false),
            StmtKind::TryStar(t) => self.try_stmt(t, true),
            StmtKind::Assert { test, msg } => {
                let mut text = format!("assert {}", self.expr(test, TEST));
                if let Some(msg) = msg {
                    text.push_str(", ");
                    text.push_str(&self.expr(msg, TEST));
                }
                self.line(&text);
            }
            StmtKind::Import(names) => {
                let text = format!("import {}", aliases(names));
                self.line(&text);
            }
            StmtKind::ImportFrom { module, names, level } => {
                let dots = ".".repeat(*level as usize);
                let module = module.as_deref().unwrap_or_default();
                let text = format!("from {dots}{module} import {}", aliases(names));
                self.line(&text);
            }
            StmtKind::Global(names) => self.line(&format!("global {}", names.join(", "))),
            StmtKind::Nonlocal(names) => self.line(&format!("nonlocal {}", names.join(", "))),
            StmtKind::Expr(value) => {
                let text = self.expr(value, YIELD);
                self.line(&text);
            }
            StmtKind::Pass => self.line("pass"),
            StmtKind::Break => self.line("break"),
            StmtKind::Continue => self.line("continue"),
        }
    }

    fn decorators(&mut self, decorators: &[Expr]) {
        for decorator in decorators {
            let text = format!("@{}", self.expr(decorator, TEST));
            self.line(&text);
        }
    }

    fn function_def(&mut self, def: &FunctionDef, is_async: bool) {
        self.decorators(&def.decorator_list);
        let mut header = format!(
            "{}def {}{}({})",
            if is_async { "async " } else { "" },
            def.name,
            self.type_params(&def.type_params),
            self.arguments(&def.args, true)
        );
        if let Some(returns) = &def.returns {
            header.push_str(" -> ");
            header.push_str(&self.expr(returns, TEST));
        }
        self.block(&header, &def.body);
    }

    fn class_def(&mut self, class: &ClassDef) {
        self.decorators(&class.decorator_list);
        let mut header = format!("class {}{}", class.name, self.type_params(&class.type_params));
        if !class.bases.is_empty() || !class.keywords.is_empty() {
            let mut parts: Vec<String> = class.bases.iter().map(|b| self.expr(b, TEST)).collect();
            parts.extend(class.keywords.iter().map(|k| self.keyword(k)));
            header.push_str(&format!("({})", parts.join(", ")));
        }
        self.block(&header, &class.body);
    }

    fn for_loop(&mut self, f: &For, is_async: bool) {
        let header = format!(
            "{}for {} in {}",
            if is_async { "async " } else { "" },
            self.expr(&f.target, TUPLE),
            self.expr(&f.iter, TEST)
        );
        self.block(&header, &f.body);
        self.else_block("else", &f.orelse);
    }

    fn with(&mut self, w: &With, is_async: bool) {
        let items: Vec<String> = w
            .items
            .iter()
            .map(|item| {
                let mut text = self.expr(&item.context_expr, TEST);
                if let Some(vars) = &item.optional_vars {
                    text.push_str(" as ");
                    text.push_str(&self.expr(vars, TEST));
                }
                text
            })
            .collect();
        let header = format!("{}with {}", if is_async { "async " } else { "" }, items.join(", "));
        self.block(&header, &w.body);
    }

    fn try_stmt(&mut self, t: &Try, star: bool) {
        self.block("try", &t.body);
        for handler in &t.handlers {
            let mut header = if star { "except*" } else { "except" }.to_string();
            if let Some(type_) = &handler.node.type_ {
                header.push(' ');
                header.push_str(&self.expr(type_, TEST));
            }
            if let Some(name) = &handler.node.name {
                header.push_str(" as ");
                header.push_str(name);
            }
            self.block(&header, &handler.node.body);
        }
        self.else_block("else", &t.orelse);
        self.else_block("finally", &t.finalbody);
    }

    fn type_params(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = params
            .iter()
            .map(|p| match &p.node {
                TypeParamKind::TypeVar { name, bound: Some(bound) } => format!("{name}: {}", self.expr(bound, TEST)),
                TypeParamKind::TypeVar { name, bound: None } => name.clone(),
                TypeParamKind::ParamSpec { name } => format!("**{name}"),
                TypeParamKind::TypeVarTuple { name } => format!("*{name}"),
            })
            .collect();
        format!("[{}]", parts.join(", "))
    }

    fn arguments(&self, args: &Arguments, annotations: bool) -> String {
        let mut parts = Vec::new();
        let positional: Vec<&Arg> = args.posonlyargs.iter().chain(&args.args).collect();
        let first_default = positional.len().saturating_sub(args.defaults.len());
        for (i, arg) in positional.iter().enumerate() {
            let mut text = self.arg(arg, annotations);
            if let Some(default) = i.checked_sub(first_default).and_then(|d| args.defaults.get(d)) {
                text.push_str(if annotations && arg.node.annotation.is_some() { " = " } else { "=" });
                text.push_str(&self.expr(default, TEST));
            }
            parts.push(text);
            if i + 1 == args.posonlyargs.len() {
                parts.push("/".to_string());
            }
        }
        match &args.vararg {
            Some(vararg) => parts.push(format!("*{}", self.arg(vararg, annotations))),
            None if !args.kwonlyargs.is_empty() => parts.push("*".to_string()),
            None => {}
        }
        for (arg, default) in args.kwonlyargs.iter().zip(&args.kw_defaults) {
            let mut text = self.arg(arg, annotations);
            if let Some(default) = default {
                text.push_str(if annotations && arg.node.annotation.is_some() { " = " } else { "=" });
                text.push_str(&self.expr(default, TEST));
            }
            parts.push(text);
        }
        if let Some(kwarg) = &args.kwarg {
            parts.push(format!("**{}", self.arg(kwarg, annotations)));
        }
        parts.join(", ")
    }

    fn arg(&self, arg: &Arg, annotations: bool) -> String {
        match (&arg.node.annotation, annotations) {
            (Some(annotation), true) => format!("{}: {}", arg.node.arg, self.expr(annotation, TEST)),
            _ => arg.node.arg.clone(),
        }
    }

    fn keyword(&self, keyword: &Keyword) -> String {
        match &keyword.node.arg {
            Some(arg) => format!("{arg}={}", self.expr(&keyword.node.value, TEST)),
            None => format!("**{}", self.expr(&keyword.node.value, EXPR)),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn comma_list(&self, items: &[Expr], level: u8) -> String {
        let parts: Vec<String> = items.iter().map(|e| self.expr(e, level)).collect();
        parts.join(", ")
    }

    /// Render `expr` in a context that binds with strength `outer`.
    fn expr(&self, expr: &Expr, outer: u8) -> String {
        match &expr.node {
            ExprKind::NamedExpr { target, value } => parens_if(
                outer > NAMED_EXPR,
                format!("{} := {}", self.expr(target, ATOM), self.expr(value, ATOM)),
            ),
            ExprKind::Tuple { elts, .. } => match elts.as_slice() {
                [] => "()".to_string(),
                [only] => parens_if(outer > TUPLE, format!("{},", self.expr(only, TEST))),
                _ => parens_if(outer > TUPLE, self.comma_list(elts, TEST)),
            },
            ExprKind::Yield(value) => {
                let text = match value {
                    Some(value) => format!("yield {}", self.expr(value, ATOM)),
                    None => "yield".to_string(),
                };
                parens_if(outer > YIELD, text)
            }
            ExprKind::YieldFrom(value) => parens_if(outer > YIELD, format!("yield from {}", self.expr(value, ATOM))),
            ExprKind::Lambda { args, body } => {
                let params = self.arguments(args, false);
                let head = if params.is_empty() { "lambda".to_string() } else { format!("lambda {params}") };
                parens_if(outer > TEST, format!("{head}: {}", self.expr(body, TEST)))
            }
            ExprKind::IfExp { test, body, orelse } => parens_if(
                outer > TEST,
                format!(
                    "{} if {} else {}",
                    self.expr(body, TEST + 1),
                    self.expr(test, TEST + 1),
                    self.expr(orelse, TEST)
                ),
            ),
            ExprKind::BoolOp { op, values } => {
                let (level, word) = match op {
                    BoolOp::Or => (OR, " or "),
                    BoolOp::And => (AND, " and "),
                };
                let parts: Vec<String> = values.iter().map(|v| self.expr(v, level + 1)).collect();
                parens_if(outer > level, parts.join(word))
            }
            ExprKind::UnaryOp { op, operand } => {
                let level = if *op == UnaryOp::Not { NOT } else { FACTOR };
                parens_if(outer > level, format!("{}{}", op.as_str(), self.expr(operand, level)))
            }
            ExprKind::BinOp { left, op, right } => {
                let level = binop_prec(*op);
                let (left_level, right_level) = if *op == Operator::Pow {
                    (level + 1, level)
                } else {
                    (level, level + 1)
                };
                parens_if(
                    outer > level,
                    format!(
                        "{} {} {}",
                        self.expr(left, left_level),
                        op.as_str(),
                        self.expr(right, right_level)
                    ),
                )
            }
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let mut text = self.expr(left, CMP + 1);
                for (op, right) in ops.iter().zip(comparators) {
                    text.push(' ');
                    text.push_str(op.as_str());
                    text.push(' ');
                    text.push_str(&self.expr(right, CMP + 1));
                }
                parens_if(outer > CMP, text)
            }
            ExprKind::Await(value) => parens_if(outer > AWAIT, format!("await {}", self.expr(value, ATOM))),
            ExprKind::Call { func, args, keywords } => {
                let mut parts: Vec<String> = args.iter().map(|a| self.expr(a, TEST)).collect();
                parts.extend(keywords.iter().map(|k| self.keyword(k)));
                format!("{}({})", self.expr(func, ATOM), parts.join(", "))
            }
            ExprKind::Attribute { value, attr, .. } => {
                let base = self.expr(value, ATOM);
                let is_int = matches!(
                    value.node,
                    ExprKind::Constant {
                        value: Constant::Int(_),
                        ..
                    }
                );
                if is_int { format!("{base} .{attr}") } else { format!("{base}.{attr}") }
            }
            ExprKind::Subscript { value, slice, .. } => {
                let index = match &slice.node {
                    ExprKind::Tuple { elts, .. } if !elts.is_empty() => {
                        let parts: Vec<String> = elts.iter().map(|e| self.slice_item(e)).collect();
                        // `a[*b]` is already a tuple; `a[b,]` needs the comma.
                        match elts.as_slice() {
                            [only] if !matches!(only.node, ExprKind::Starred { .. }) => format!("{},", parts[0]),
                            _ => parts.join(", "),
                        }
                    }
                    _ => self.slice_item(slice),
                };
                format!("{}[{index}]", self.expr(value, ATOM))
            }
            ExprKind::Slice { .. } => self.slice_item(expr),
            ExprKind::Starred { value, .. } => format!("*{}", self.expr(value, EXPR)),
            ExprKind::Name { id, .. } => id.clone(),
            ExprKind::List { elts, .. } => format!("[{}]", self.comma_list(elts, TEST)),
            ExprKind::Set(elts) if elts.is_empty() => "{*()}".to_string(),
            ExprKind::Set(elts) => format!("{{{}}}", self.comma_list(elts, TEST)),
            ExprKind::Dict { keys, values } => {
                let parts: Vec<String> = keys
                    .iter()
                    .zip(values)
                    .map(|(key, value)| match key {
                        Some(key) => format!("{}: {}", self.expr(key, TEST), self.expr(value, TEST)),
                        None => format!("**{}", self.expr(value, EXPR)),
                    })
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            ExprKind::ListComp { elt, generators } => {
                format!("[{}{}]", self.expr(elt, TEST), self.generators(generators))
            }
            ExprKind::SetComp { elt, generators } => {
                format!("{{{}{}}}", self.expr(elt, TEST), self.generators(generators))
            }
            ExprKind::GeneratorExp { elt, generators } => {
                format!("({}{})", self.expr(elt, TEST), self.generators(generators))
            }
            ExprKind::DictComp { key, value, generators } => format!(
                "{{{}: {}{}}}",
                self.expr(key, TEST),
                self.expr(value, TEST),
                self.generators(generators)
            ),
            ExprKind::Constant { value, kind } => self.constant(value, kind.as_deref()),
            ExprKind::JoinedStr(values) => self.fstring(values),
            ExprKind::FormattedValue { .. } => self.fstring(std::slice::from_ref(expr)),
        }
    }

    fn slice_item(&self, expr: &Expr) -> String {
        match &expr.node {
            ExprKind::Slice { lower, upper, step } => {
                let part = |e: &Option<Box<Expr>>| e.as_ref().map(|e| self.expr(e, TEST)).unwrap_or_default();
                let mut text = format!("{}:{}", part(lower), part(upper));
                if step.is_some() {
                    text.push(':');
                    text.push_str(&part(step));
                }
                text
            }
            _ => self.expr(expr, TEST),
        }
    }

    fn generators(&self, generators: &[Comprehension]) -> String {
        let mut text = String::new();
        for generator in generators {
            text.push_str(if generator.is_async { " async for " } else { " for " });
            text.push_str(&self.expr(&generator.target, TUPLE));
            text.push_str(" in ");
            text.push_str(&self.expr(&generator.iter, TEST + 1));
            for cond in &generator.ifs {
                text.push_str(" if ");
                text.push_str(&self.expr(cond, TEST + 1));
            }
        }
        text
    }

    fn constant(&self, value: &Constant, kind: Option<&str>) -> String {
        match value {
            Constant::Str(s) => {
                let quote = match self.fstring_quote {
                    Some('\'') => '"',
                    Some(_) => '\'',
                    None => preferred_quote(s),
                };
                format!("{}{}", kind.unwrap_or_default(), repr_str(s, quote))
            }
            Constant::Ellipsis => "...".to_string(),
            Constant::Float(f) if f.is_infinite() => "1e309".to_string(),
            Constant::Complex { imag, .. } if imag.is_infinite() => "1e309j".to_string(),
            other => repr_constant(other),
        }
    }

    // ========================================================================
    // f-strings
    // ========================================================================

    fn fstring(&self, values: &[Expr]) -> String {
        let quote = match self.fstring_quote {
            Some('\'') => '"',
            _ => '\'',
        };
        let mut body = String::new();
        self.fstring_body(values, quote, &mut body);
        format!("f{quote}{body}{quote}")
    }

    fn fstring_body(&self, values: &[Expr], quote: char, out: &mut String) {
        for value in values {
            match &value.node {
                ExprKind::Constant {
                    value: Constant::Str(s),
                    ..
                } => {
                    let escaped = repr_str(s, quote);
                    let inner = &escaped[1..escaped.len() - 1];
                    out.push_str(&inner.replace('{', "{{").replace('}', "}}"));
                }
                ExprKind::FormattedValue {
                    value,
                    conversion,
                    format_spec,
                } => {
                    let field = Unparser::in_fstring(quote).expr(value, TEST + 1);
                    out.push('{');
                    if field.starts_with('{') {
                        out.push(' ');
                    }
                    out.push_str(&field);
                    match conversion {
                        Conversion::None => {}
                        Conversion::Str => out.push_str("!s"),
                        Conversion::Repr => out.push_str("!r"),
                        Conversion::Ascii => out.push_str("!a"),
                    }
                    if let Some(spec) = format_spec {
                        out.push(':');
                        if let ExprKind::JoinedStr(parts) = &spec.node {
                            self.fstring_body(parts, quote, out);
                        }
                    }
                    out.push('}');
                }
                _ => {}
            }
        }
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    /// Render a pattern; `nested` patterns parenthesize `|` and `as`.
    fn pattern(&self, pattern: &Pattern, nested: bool) -> String {
        match &pattern.node {
            PatternKind::MatchValue(value) => self.expr(value, TEST),
            PatternKind::MatchSingleton(value) => repr_constant(value),
            PatternKind::MatchSequence(patterns) => {
                let parts: Vec<String> = patterns.iter().map(|p| self.pattern(p, true)).collect();
                format!("[{}]", parts.join(", "))
            }
            PatternKind::MatchMapping { keys, patterns, rest } => {
                let mut parts: Vec<String> = keys
                    .iter()
                    .zip(patterns)
                    .map(|(k, p)| format!("{}: {}", self.expr(k, TEST), self.pattern(p, true)))
                    .collect();
                if let Some(rest) = rest {
                    parts.push(format!("**{rest}"));
                }
                format!("{{{}}}", parts.join(", "))
            }
            PatternKind::MatchClass {
                cls,
                patterns,
                kwd_attrs,
                kwd_patterns,
            } => {
                let mut parts: Vec<String> = patterns.iter().map(|p| self.pattern(p, true)).collect();
                parts.extend(
                    kwd_attrs
                        .iter()
                        .zip(kwd_patterns)
                        .map(|(attr, p)| format!("{attr}={}", self.pattern(p, true))),
                );
                format!("{}({})", self.expr(cls, ATOM), parts.join(", "))
            }
            PatternKind::MatchStar(name) => format!("*{}", name.as_deref().unwrap_or("_")),
            PatternKind::MatchAs { pattern: None, name } => name.clone().unwrap_or_else(|| "_".to_string()),
            PatternKind::MatchAs {
                pattern: Some(inner),
                name,
            } => {
                let inner_is_as = matches!(inner.node, PatternKind::MatchAs { pattern: Some(_), .. });
                let inner = parens_if(inner_is_as, self.pattern(inner, false));
                parens_if(nested, format!("{inner} as {}", name.as_deref().unwrap_or("_")))
            }
            PatternKind::MatchOr(patterns) => {
                let parts: Vec<String> = patterns.iter().map(|p| self.pattern(p, true)).collect();
                parens_if(nested, parts.join(" | "))
            }
        }
    }
}

fn aliases(names: &[Alias]) -> String {
    let parts: Vec<String> = names
        .iter()
        .map(|alias| match &alias.node.asname {
            Some(asname) => format!("{} as {asname}", alias.node.name),
            None => alias.node.name.clone(),
        })
        .collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::{DumpOptions, dump};
    use crate::parser::{Mode, parse_source};

    fn roundtrip(source: &str) -> String {
        let tree = parse_source(source, Mode::Module).unwrap();
        let text = unparse(&tree);
        let reparsed = parse_source(&text, Mode::Module)
            .unwrap_or_else(|e| panic!("unparsed source does not parse: {e}\n{text}"));
        let options = DumpOptions::default();
        assert_eq!(dump(&tree, &options), dump(&reparsed, &options), "{text}");
        text
    }

    #[test]
    fn test_precedence_keeps_needed_parentheses() {
        assert_eq!(roundtrip("(a + b) * c\n"), "(a + b) * c\n");
        assert_eq!(roundtrip("a - (b - c)\n"), "a - (b - c)\n");
        assert_eq!(roundtrip("(a ** b) ** c\n"), "(a ** b) ** c\n");
        assert_eq!(roundtrip("a ** b ** c\n"), "a ** b ** c\n");
        assert_eq!(roundtrip("-x ** 2\n"), "-x ** 2\n");
        assert_eq!(roundtrip("(not a) == b\n"), "(not a) == b\n");
        assert_eq!(roundtrip("(a or b) and c\n"), "(a or b) and c\n");
    }

    #[test]
    fn test_statements() {
        let source = "\
@dec
async def f[T](a, /, b: int = 1, *args, c, d=2, **kw) -> T:
    if a:
        return b
    elif c:
        pass
    else:
        raise E from None
class C(B, metaclass=M):
    x: int = 0
for i, j in pairs:
    continue
else:
    del a[1:2, ::3], b.c
try:
    import os.path as p
except* (A, B) as e:
    from ..pkg import x as y, z
finally:
    global g
with open(f) as fh, lock:
    x += 1
type Alias[*Ts, **P] = tuple[*Ts]
";
        insta::assert_snapshot!(roundtrip(source), @r###"
        @dec
        async def f[T](a, /, b: int = 1, *args, c, d=2, **kw) -> T:
            if a:
                return b
            elif c:
                pass
            else:
                raise E from None
        class C(B, metaclass=M):
            x: int = 0
        for i, j in pairs:
            continue
        else:
            del a[1:2, ::3], b.c
        try:
            import os.path as p
        except* (A, B) as e:
            from ..pkg import x as y, z
        finally:
            global g
        with open(f) as fh, lock:
            x += 1
        type Alias[*Ts, **P] = tuple[*Ts]
        "###);
    }

    #[test]
    fn test_expressions() {
        roundtrip("x = [y for y in z if y async for w in v]\n");
        roundtrip("x = {k: v for k, v in items}\n");
        roundtrip("x = {**a, 'b': 1, c: {1, 2}, d: set()}\n");
        roundtrip("x = lambda a, *, b=1: (yield)\n");
        roundtrip("x = a if b else c if d else e\n");
        roundtrip("f(*args, key=1, **kw)\n");
        roundtrip("(x := 10)\n");
        roundtrip("x = 1 .real + 1.5.imag\n");
        roundtrip("x = (1,)\n");
        roundtrip("x = ()\n");
        roundtrip("print(*a, sep='')\n");
        roundtrip("x = a[1:2:3]\n");
        roundtrip("x = not a < b <= c is not d\n");
        roundtrip("x = await y if False else 1e100 + 2j\n");
    }

    #[test]
    fn test_strings() {
        assert_eq!(roundtrip("x = 'a' \"b\"\n"), "x = 'ab'\n");
        roundtrip("x = b'\\x00\\n'\n");
        roundtrip("x = u'text'\n");
        roundtrip("x = \"it's\"\n");
        roundtrip("x = f'{a!r:>{width}} and {{braces}} {b[\"k\"]}'\n");
        roundtrip("x = f'{x=}'\n");
    }

    #[test]
    fn test_match_patterns() {
        let source = "\
match command:
    case [Point(x=0, y=0) | None, *rest]:
        pass
    case {'key': [1, 2] as pair, **others} if pair:
        pass
    case (1 | 2) as n:
        pass
    case -1 | 1 + 2j | a.b:
        pass
    case _:
        pass
";
        roundtrip(source);
    }

    #[test]
    fn test_eval_and_func_type_modes() {
        let tree = parse_source("a, *b", Mode::FString).unwrap();
        assert_eq!(unparse(&tree), "a, *b");
        // The starred argument type is stored bare, as in `ast.FunctionType`.
        let tree = parse_source("(int, *str) -> bool", Mode::FuncType).unwrap();
        assert_eq!(unparse(&tree), "(int, str) -> bool");
    }
}
