//! `ast.dump`-style rendering of syntax trees.
//!
//! The output matches Python 3.12's `ast.dump(node, include_attributes=..., indent=...)`:
//! node names and field order follow the `ast` module, optional fields that are `None` are left
//! out, and leaf values are written as Python `repr`s.
//!
//! ```rust
//! use serpent_syntax::dump::{DumpOptions, dump};
//! use serpent_syntax::parser::{Mode, parse_source};
//!
//! let tree = parse_source("pass", Mode::Module).unwrap();
//! assert_eq!(dump(&tree, &DumpOptions::default()), "Module(body=[Pass()], type_ignores=[])");
//! ```

use crate::ast::*;

/// How [`dump`] lays out its output.
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Append `lineno`, `col_offset`, `end_lineno` and `end_col_offset` to located nodes.
    pub include_attributes: bool,
    /// Pretty-print with this many spaces per level; `None` writes a single line.
    pub indent: Option<usize>,
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.include_attributes = enabled;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }
}

/// Render `node` the way `ast.dump` does.
pub fn dump<N: Dump + ?Sized>(node: &N, options: &DumpOptions) -> String {
    let value = node.to_value();
    let indent = options.indent.map(|n| " ".repeat(n));
    format(&value, 0, indent.as_deref(), options.include_attributes).0
}

/// Syntax tree parts that [`dump`] can render.
pub trait Dump {
    fn to_value(&self) -> DumpValue;
}

/// The language-neutral shape [`dump`] formats: AST nodes, lists and `repr`ed leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpValue {
    Node {
        name: &'static str,
        fields: Vec<(&'static str, DumpValue)>,
        span: Option<Span>,
    },
    List(Vec<DumpValue>),
    Leaf(String),
    /// An optional field that is unset; omitted from the output.
    Absent,
}

fn format(value: &DumpValue, level: usize, indent: Option<&str>, attributes: bool) -> (String, bool) {
    let (prefix, sep) = match indent {
        Some(unit) => {
            let pad = unit.repeat(level + 1);
            (format!("\n{pad}"), format!(",\n{pad}"))
        }
        None => (String::new(), ", ".to_string()),
    };
    match value {
        DumpValue::Node { name, fields, span } => {
            let mut args = Vec::new();
            let mut all_simple = true;
            for (field, value) in fields {
                if *value == DumpValue::Absent {
                    continue;
                }
                let (text, simple) = format(value, level + 1, indent, attributes);
                all_simple &= simple;
                args.push(format!("{field}={text}"));
            }
            if let (true, Some(span)) = (attributes, span) {
                args.push(format!("lineno={}", span.start.line));
                args.push(format!("col_offset={}", span.start.col));
                args.push(format!("end_lineno={}", span.end.line));
                args.push(format!("end_col_offset={}", span.end.col));
            }
            if all_simple && args.len() <= 3 {
                let simple = args.is_empty();
                (format!("{name}({})", args.join(", ")), simple)
            } else {
                (format!("{name}({prefix}{})", args.join(&sep)), false)
            }
        }
        DumpValue::List(items) if items.is_empty() => ("[]".to_string(), true),
        DumpValue::List(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| format(item, level + 1, indent, attributes).0)
                .collect();
            (format!("[{prefix}{}]", items.join(&sep)), false)
        }
        DumpValue::Leaf(text) => (text.clone(), true),
        DumpValue::Absent => ("None".to_string(), true),
    }
}

// ============================================================================
// Value builders
// ============================================================================

fn node(name: &'static str, fields: Vec<(&'static str, DumpValue)>) -> DumpValue {
    DumpValue::Node {
        name,
        fields,
        span: None,
    }
}

fn located(name: &'static str, span: Span, fields: Vec<(&'static str, DumpValue)>) -> DumpValue {
    DumpValue::Node {
        name,
        fields,
        span: Some(span),
    }
}

fn list<T: Dump>(items: &[T]) -> DumpValue {
    DumpValue::List(items.iter().map(Dump::to_value).collect())
}

fn opt<T: Dump + ?Sized>(item: Option<&T>) -> DumpValue {
    item.map_or(DumpValue::Absent, Dump::to_value)
}

fn ident(name: &str) -> DumpValue {
    DumpValue::Leaf(repr_str(name, '\''))
}

fn opt_ident(name: Option<&Ident>) -> DumpValue {
    name.map_or(DumpValue::Absent, |n| ident(n))
}

fn idents(names: &[Ident]) -> DumpValue {
    DumpValue::List(names.iter().map(|n| ident(n)).collect())
}

fn int(value: impl std::fmt::Display) -> DumpValue {
    DumpValue::Leaf(value.to_string())
}

fn unit(name: &'static str) -> DumpValue {
    node(name, Vec::new())
}

impl<T: Dump + ?Sized> Dump for Box<T> {
    fn to_value(&self) -> DumpValue {
        (**self).to_value()
    }
}

impl Dump for Mod {
    fn to_value(&self) -> DumpValue {
        match self {
            Mod::Module { body, type_ignores } => node(
                "Module",
                vec![("body", list(body)), ("type_ignores", list(type_ignores))],
            ),
            Mod::Interactive { body } => node("Interactive", vec![("body", list(body))]),
            Mod::Expression { body } => node("Expression", vec![("body", body.to_value())]),
            Mod::FunctionType { argtypes, returns } => node(
                "FunctionType",
                vec![("argtypes", list(argtypes)), ("returns", returns.to_value())],
            ),
        }
    }
}

impl Dump for TypeIgnore {
    fn to_value(&self) -> DumpValue {
        node(
            "TypeIgnore",
            vec![("lineno", int(self.lineno)), ("tag", ident(&self.tag))],
        )
    }
}

fn function_def(name: &'static str, span: Span, def: &FunctionDef) -> DumpValue {
    located(
        name,
        span,
        vec![
            ("name", ident(&def.name)),
            ("args", def.args.to_value()),
            ("body", list(&def.body)),
            ("decorator_list", list(&def.decorator_list)),
            ("returns", opt(def.returns.as_ref())),
            ("type_comment", opt_ident(def.type_comment.as_ref())),
            ("type_params", list(&def.type_params)),
        ],
    )
}

fn for_loop(name: &'static str, span: Span, f: &For) -> DumpValue {
    located(
        name,
        span,
        vec![
            ("target", f.target.to_value()),
            ("iter", f.iter.to_value()),
            ("body", list(&f.body)),
            ("orelse", list(&f.orelse)),
            ("type_comment", opt_ident(f.type_comment.as_ref())),
        ],
    )
}

fn with(name: &'static str, span: Span, w: &With) -> DumpValue {
    located(
        name,
        span,
        vec![
            ("items", list(&w.items)),
            ("body", list(&w.body)),
            ("type_comment", opt_ident(w.type_comment.as_ref())),
        ],
    )
}

fn try_stmt(name: &'static str, span: Span, t: &Try) -> DumpValue {
    located(
        name,
        span,
        vec![
            ("body", list(&t.body)),
            ("handlers", list(&t.handlers)),
            ("orelse", list(&t.orelse)),
            ("finalbody", list(&t.finalbody)),
        ],
    )
}

impl Dump for Stmt {
    fn to_value(&self) -> DumpValue {
        let span = self.span;
        match &self.node {
            StmtKind::FunctionDef(def) => function_def("FunctionDef", span, def),
            StmtKind::AsyncFunctionDef(def) => function_def("AsyncFunctionDef", span, def),
            StmtKind::ClassDef(class) => located(
                "ClassDef",
                span,
                vec![
                    ("name", ident(&class.name)),
                    ("bases", list(&class.bases)),
                    ("keywords", list(&class.keywords)),
                    ("body", list(&class.body)),
                    ("decorator_list", list(&class.decorator_list)),
                    ("type_params", list(&class.type_params)),
                ],
            ),
            StmtKind::Return(value) => located("Return", span, vec![("value", opt(value.as_ref()))]),
            StmtKind::Delete(targets) => located("Delete", span, vec![("targets", list(targets))]),
            StmtKind::Assign {
                targets,
                value,
                type_comment,
            } => located(
                "Assign",
                span,
                vec![
                    ("targets", list(targets)),
                    ("value", value.to_value()),
                    ("type_comment", opt_ident(type_comment.as_ref())),
                ],
            ),
            StmtKind::TypeAlias {
                name,
                type_params,
                value,
            } => located(
                "TypeAlias",
                span,
                vec![
                    ("name", name.to_value()),
                    ("type_params", list(type_params)),
                    ("value", value.to_value()),
                ],
            ),
            StmtKind::AugAssign { target, op, value } => located(
                "AugAssign",
                span,
                vec![("target", target.to_value()), ("op", op.to_value()), ("value", value.to_value())],
            ),
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
                simple,
            } => located(
                "AnnAssign",
                span,
                vec![
                    ("target", target.to_value()),
                    ("annotation", annotation.to_value()),
                    ("value", opt(value.as_ref())),
                    ("simple", int(u8::from(*simple))),
                ],
            ),
            StmtKind::For(f) => for_loop("For", span, f),
            StmtKind::AsyncFor(f) => for_loop("AsyncFor", span, f),
            StmtKind::While { test, body, orelse } => located(
                "While",
                span,
                vec![("test", test.to_value()), ("body", list(body)), ("orelse", list(orelse))],
            ),
            StmtKind::If { test, body, orelse } => located(
                "If",
                span,
                vec![("test", test.to_value()), ("body", list(body)), ("orelse", list(orelse))],
            ),
            StmtKind::With(w) => with("With", span, w),
            StmtKind::AsyncWith(w) => with("AsyncWith", span, w),
            StmtKind::Match { subject, cases } => located(
                "Match",
                span,
                vec![("subject", subject.to_value()), ("cases", list(cases))],
            ),
            StmtKind::Raise { exc, cause } => located(
                "Raise",
                span,
                vec![("exc", opt(exc.as_ref())), ("cause", opt(cause.as_ref()))],
            ),
            StmtKind::Try(t) => try_stmt("Try", span, t),
            StmtKind::TryStar(t) => try_stmt("TryStar", span, t),
            StmtKind::Assert { test, msg } => located(
                "Assert",
                span,
                vec![("test", test.to_value()), ("msg", opt(msg.as_ref()))],
            ),
            StmtKind::Import(names) => located("Import", span, vec![("names", list(names))]),
            StmtKind::ImportFrom { module, names, level } => located(
                "ImportFrom",
                span,
                vec![
                    ("module", opt_ident(module.as_ref())),
                    ("names", list(names)),
                    ("level", int(level)),
                ],
            ),
            StmtKind::Global(names) => located("Global", span, vec![("names", idents(names))]),
            StmtKind::Nonlocal(names) => located("Nonlocal", span, vec![("names", idents(names))]),
            StmtKind::Expr(value) => located("Expr", span, vec![("value", value.to_value())]),
            StmtKind::Pass => located("Pass", span, Vec::new()),
            StmtKind::Break => located("Break", span, Vec::new()),
            StmtKind::Continue => located("Continue", span, Vec::new()),
        }
    }
}

fn comprehension_expr(name: &'static str, span: Span, elt: &Expr, generators: &[Comprehension]) -> DumpValue {
    located(
        name,
        span,
        vec![("elt", elt.to_value()), ("generators", list(generators))],
    )
}

impl Dump for Expr {
    fn to_value(&self) -> DumpValue {
        let span = self.span;
        match &self.node {
            ExprKind::BoolOp { op, values } => {
                located("BoolOp", span, vec![("op", op.to_value()), ("values", list(values))])
            }
            ExprKind::NamedExpr { target, value } => located(
                "NamedExpr",
                span,
                vec![("target", target.to_value()), ("value", value.to_value())],
            ),
            ExprKind::BinOp { left, op, right } => located(
                "BinOp",
                span,
                vec![("left", left.to_value()), ("op", op.to_value()), ("right", right.to_value())],
            ),
            ExprKind::UnaryOp { op, operand } => located(
                "UnaryOp",
                span,
                vec![("op", op.to_value()), ("operand", operand.to_value())],
            ),
            ExprKind::Lambda { args, body } => {
                located("Lambda", span, vec![("args", args.to_value()), ("body", body.to_value())])
            }
            ExprKind::IfExp { test, body, orelse } => located(
                "IfExp",
                span,
                vec![("test", test.to_value()), ("body", body.to_value()), ("orelse", orelse.to_value())],
            ),
            ExprKind::Dict { keys, values } => {
                let keys = keys
                    .iter()
                    .map(|k| k.as_ref().map_or(DumpValue::Leaf("None".to_string()), Dump::to_value))
                    .collect();
                located("Dict", span, vec![("keys", DumpValue::List(keys)), ("values", list(values))])
            }
            ExprKind::Set(elts) => located("Set", span, vec![("elts", list(elts))]),
            ExprKind::ListComp { elt, generators } => comprehension_expr("ListComp", span, elt, generators),
            ExprKind::SetComp { elt, generators } => comprehension_expr("SetComp", span, elt, generators),
            ExprKind::GeneratorExp { elt, generators } => comprehension_expr("GeneratorExp", span, elt, generators),
            ExprKind::DictComp { key, value, generators } => located(
                "DictComp",
                span,
                vec![
                    ("key", key.to_value()),
                    ("value", value.to_value()),
                    ("generators", list(generators)),
                ],
            ),
            ExprKind::Await(value) => located("Await", span, vec![("value", value.to_value())]),
            ExprKind::Yield(value) => located("Yield", span, vec![("value", opt(value.as_ref()))]),
            ExprKind::YieldFrom(value) => located("YieldFrom", span, vec![("value", value.to_value())]),
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => located(
                "Compare",
                span,
                vec![
                    ("left", left.to_value()),
                    ("ops", list(ops)),
                    ("comparators", list(comparators)),
                ],
            ),
            ExprKind::Call { func, args, keywords } => located(
                "Call",
                span,
                vec![("func", func.to_value()), ("args", list(args)), ("keywords", list(keywords))],
            ),
            ExprKind::FormattedValue {
                value,
                conversion,
                format_spec,
            } => located(
                "FormattedValue",
                span,
                vec![
                    ("value", value.to_value()),
                    ("conversion", int(conversion.code())),
                    ("format_spec", opt(format_spec.as_ref())),
                ],
            ),
            ExprKind::JoinedStr(values) => located("JoinedStr", span, vec![("values", list(values))]),
            ExprKind::Constant { value, kind } => located(
                "Constant",
                span,
                vec![
                    ("value", DumpValue::Leaf(repr_constant(value))),
                    ("kind", opt_ident(kind.as_ref())),
                ],
            ),
            ExprKind::Attribute { value, attr, ctx } => located(
                "Attribute",
                span,
                vec![("value", value.to_value()), ("attr", ident(attr)), ("ctx", ctx.to_value())],
            ),
            ExprKind::Subscript { value, slice, ctx } => located(
                "Subscript",
                span,
                vec![("value", value.to_value()), ("slice", slice.to_value()), ("ctx", ctx.to_value())],
            ),
            ExprKind::Starred { value, ctx } => {
                located("Starred", span, vec![("value", value.to_value()), ("ctx", ctx.to_value())])
            }
            ExprKind::Name { id, ctx } => located("Name", span, vec![("id", ident(id)), ("ctx", ctx.to_value())]),
            ExprKind::List { elts, ctx } => located("List", span, vec![("elts", list(elts)), ("ctx", ctx.to_value())]),
            ExprKind::Tuple { elts, ctx } => {
                located("Tuple", span, vec![("elts", list(elts)), ("ctx", ctx.to_value())])
            }
            ExprKind::Slice { lower, upper, step } => located(
                "Slice",
                span,
                vec![
                    ("lower", opt(lower.as_ref())),
                    ("upper", opt(upper.as_ref())),
                    ("step", opt(step.as_ref())),
                ],
            ),
        }
    }
}

impl Dump for ExprContext {
    fn to_value(&self) -> DumpValue {
        unit(match self {
            ExprContext::Load => "Load",
            ExprContext::Store => "Store",
            ExprContext::Del => "Del",
        })
    }
}

impl Dump for BoolOp {
    fn to_value(&self) -> DumpValue {
        unit(match self {
            BoolOp::And => "And",
            BoolOp::Or => "Or",
        })
    }
}

impl Dump for Operator {
    fn to_value(&self) -> DumpValue {
        unit(match self {
            Operator::Add => "Add",
            Operator::Sub => "Sub",
            Operator::Mult => "Mult",
            Operator::MatMult => "MatMult",
            Operator::Div => "Div",
            Operator::Mod => "Mod",
            Operator::Pow => "Pow",
            Operator::LShift => "LShift",
            Operator::RShift => "RShift",
            Operator::BitOr => "BitOr",
            Operator::BitXor => "BitXor",
            Operator::BitAnd => "BitAnd",
            Operator::FloorDiv => "FloorDiv",
        })
    }
}

impl Dump for UnaryOp {
    fn to_value(&self) -> DumpValue {
        unit(match self {
            UnaryOp::Invert => "Invert",
            UnaryOp::Not => "Not",
            UnaryOp::UAdd => "UAdd",
            UnaryOp::USub => "USub",
        })
    }
}

impl Dump for CmpOp {
    fn to_value(&self) -> DumpValue {
        unit(match self {
            CmpOp::Eq => "Eq",
            CmpOp::NotEq => "NotEq",
            CmpOp::Lt => "Lt",
            CmpOp::LtE => "LtE",
            CmpOp::Gt => "Gt",
            CmpOp::GtE => "GtE",
            CmpOp::Is => "Is",
            CmpOp::IsNot => "IsNot",
            CmpOp::In => "In",
            CmpOp::NotIn => "NotIn",
        })
    }
}

impl Dump for Comprehension {
    fn to_value(&self) -> DumpValue {
        node(
            "comprehension",
            vec![
                ("target", self.target.to_value()),
                ("iter", self.iter.to_value()),
                ("ifs", list(&self.ifs)),
                ("is_async", int(u8::from(self.is_async))),
            ],
        )
    }
}

impl Dump for ExceptHandler {
    fn to_value(&self) -> DumpValue {
        located(
            "ExceptHandler",
            self.span,
            vec![
                ("type", opt(self.node.type_.as_ref())),
                ("name", opt_ident(self.node.name.as_ref())),
                ("body", list(&self.node.body)),
            ],
        )
    }
}

impl Dump for Arguments {
    fn to_value(&self) -> DumpValue {
        let kw_defaults = self
            .kw_defaults
            .iter()
            .map(|d| d.as_ref().map_or(DumpValue::Leaf("None".to_string()), Dump::to_value))
            .collect();
        node(
            "arguments",
            vec![
                ("posonlyargs", list(&self.posonlyargs)),
                ("args", list(&self.args)),
                ("vararg", opt(self.vararg.as_ref())),
                ("kwonlyargs", list(&self.kwonlyargs)),
                ("kw_defaults", DumpValue::List(kw_defaults)),
                ("kwarg", opt(self.kwarg.as_ref())),
                ("defaults", list(&self.defaults)),
            ],
        )
    }
}

impl Dump for Arg {
    fn to_value(&self) -> DumpValue {
        located(
            "arg",
            self.span,
            vec![
                ("arg", ident(&self.node.arg)),
                ("annotation", opt(self.node.annotation.as_ref())),
                ("type_comment", opt_ident(self.node.type_comment.as_ref())),
            ],
        )
    }
}

impl Dump for Keyword {
    fn to_value(&self) -> DumpValue {
        located(
            "keyword",
            self.span,
            vec![("arg", opt_ident(self.node.arg.as_ref())), ("value", self.node.value.to_value())],
        )
    }
}

impl Dump for Alias {
    fn to_value(&self) -> DumpValue {
        located(
            "alias",
            self.span,
            vec![("name", ident(&self.node.name)), ("asname", opt_ident(self.node.asname.as_ref()))],
        )
    }
}

impl Dump for WithItem {
    fn to_value(&self) -> DumpValue {
        node(
            "withitem",
            vec![
                ("context_expr", self.context_expr.to_value()),
                ("optional_vars", opt(self.optional_vars.as_ref())),
            ],
        )
    }
}

impl Dump for MatchCase {
    fn to_value(&self) -> DumpValue {
        node(
            "match_case",
            vec![
                ("pattern", self.pattern.to_value()),
                ("guard", opt(self.guard.as_ref())),
                ("body", list(&self.body)),
            ],
        )
    }
}

impl Dump for Pattern {
    fn to_value(&self) -> DumpValue {
        let span = self.span;
        match &self.node {
            PatternKind::MatchValue(value) => located("MatchValue", span, vec![("value", value.to_value())]),
            PatternKind::MatchSingleton(value) => {
                located("MatchSingleton", span, vec![("value", DumpValue::Leaf(repr_constant(value)))])
            }
            PatternKind::MatchSequence(patterns) => {
                located("MatchSequence", span, vec![("patterns", list(patterns))])
            }
            PatternKind::MatchMapping { keys, patterns, rest } => located(
                "MatchMapping",
                span,
                vec![
                    ("keys", list(keys)),
                    ("patterns", list(patterns)),
                    ("rest", opt_ident(rest.as_ref())),
                ],
            ),
            PatternKind::MatchClass {
                cls,
                patterns,
                kwd_attrs,
                kwd_patterns,
            } => located(
                "MatchClass",
                span,
                vec![
                    ("cls", cls.to_value()),
                    ("patterns", list(patterns)),
                    ("kwd_attrs", idents(kwd_attrs)),
                    ("kwd_patterns", list(kwd_patterns)),
                ],
            ),
            PatternKind::MatchStar(name) => located("MatchStar", span, vec![("name", opt_ident(name.as_ref()))]),
            PatternKind::MatchAs { pattern, name } => located(
                "MatchAs",
                span,
                vec![("pattern", opt(pattern.as_ref())), ("name", opt_ident(name.as_ref()))],
            ),
            PatternKind::MatchOr(patterns) => located("MatchOr", span, vec![("patterns", list(patterns))]),
        }
    }
}

impl Dump for TypeParam {
    fn to_value(&self) -> DumpValue {
        let span = self.span;
        match &self.node {
            TypeParamKind::TypeVar { name, bound } => located(
                "TypeVar",
                span,
                vec![("name", ident(name)), ("bound", opt(bound.as_ref()))],
            ),
            TypeParamKind::ParamSpec { name } => located("ParamSpec", span, vec![("name", ident(name))]),
            TypeParamKind::TypeVarTuple { name } => located("TypeVarTuple", span, vec![("name", ident(name))]),
        }
    }
}

// ============================================================================
// Python reprs
// ============================================================================

/// `repr()` of a constant.
pub(crate) fn repr_constant(value: &Constant) -> String {
    match value {
        Constant::None => "None".to_string(),
        Constant::Bool(true) => "True".to_string(),
        Constant::Bool(false) => "False".to_string(),
        Constant::Str(s) => repr_str(s, preferred_quote(s)),
        Constant::Bytes(b) => repr_bytes(b),
        Constant::Int(i) => i.to_string(),
        Constant::Float(f) => repr_float(*f),
        Constant::Complex { real, imag } if *real == 0.0 => format!("{}j", repr_imag(*imag)),
        Constant::Complex { real, imag } => format!("({}+{}j)", repr_float(*real), repr_imag(*imag)),
        Constant::Ellipsis => "Ellipsis".to_string(),
    }
}

/// Python picks single quotes unless the text contains one and no double quote.
pub(crate) fn preferred_quote(s: &str) -> char {
    if s.contains('\'') && !s.contains('"') { '"' } else { '\'' }
}

pub(crate) fn repr_str(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if c.is_control() || is_invisible(c) => match c as u32 {
                n if n < 0x100 => out.push_str(&format!("\\x{n:02x}")),
                n if n < 0x10000 => out.push_str(&format!("\\u{n:04x}")),
                n => out.push_str(&format!("\\U{n:08x}")),
            },
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn is_invisible(c: char) -> bool {
    matches!(c as u32, 0x2028 | 0x2029 | 0xfeff)
}

pub(crate) fn repr_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') { '"' } else { '\'' };
    let mut out = String::from("b");
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(quote);
            }
            0x20..=0x7e => out.push(b as char),
            b => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push(quote);
    out
}

/// `repr()` of a float: shortest round-trip digits, scientific outside `1e-4 <= |x| < 1e16`.
pub(crate) fn repr_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        let fixed = format!("{value}");
        if fixed.contains('.') { fixed } else { format!("{fixed}.0") }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// The imaginary part of a complex repr: integral values drop the `.0`.
fn repr_imag(value: f64) -> String {
    let text = repr_float(value);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Mode, parse_source};

    fn dump_source(source: &str, mode: Mode) -> String {
        dump(&parse_source(source, mode).unwrap(), &DumpOptions::default())
    }

    #[test]
    fn test_single_line_dump() {
        insta::assert_snapshot!(
            dump_source("x = f(a, *b, k=1)\n", Mode::Module),
            @"Module(body=[Assign(targets=[Name(id='x', ctx=Store())], value=Call(func=Name(id='f', ctx=Load()), args=[Name(id='a', ctx=Load()), Starred(value=Name(id='b', ctx=Load()), ctx=Load())], keywords=[keyword(arg='k', value=Constant(value=1))]))], type_ignores=[])"
        );
    }

    #[test]
    fn test_indented_dump() {
        let tree = parse_source("a + 1", Mode::Eval).unwrap();
        insta::assert_snapshot!(dump(&tree, &DumpOptions::new().with_indent(2)), @r###"
        Expression(
          body=BinOp(
            left=Name(id='a', ctx=Load()),
            op=Add(),
            right=Constant(value=1)))
        "###);
    }

    #[test]
    fn test_dump_with_positions() {
        let tree = parse_source("a", Mode::Eval).unwrap();
        assert_eq!(
            dump(&tree, &DumpOptions::new().with_attributes(true)),
            "Expression(body=Name(id='a', ctx=Load(), lineno=1, col_offset=0, end_lineno=1, end_col_offset=1))"
        );
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        assert_eq!(
            dump_source("return\n", Mode::Module),
            "Module(body=[Return()], type_ignores=[])"
        );
        assert_eq!(
            dump_source("{**a, 'b': 1}", Mode::Eval),
            "Expression(body=Dict(keys=[None, Constant(value='b')], values=[Name(id='a', ctx=Load()), Constant(value=1)]))"
        );
    }

    #[test]
    fn test_float_reprs() {
        assert_eq!(repr_float(1.0), "1.0");
        assert_eq!(repr_float(0.1), "0.1");
        assert_eq!(repr_float(1e16), "1e+16");
        assert_eq!(repr_float(1.5e-7), "1.5e-07");
        assert_eq!(repr_float(123456.789), "123456.789");
        assert_eq!(repr_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_constant_reprs() {
        assert_eq!(repr_constant(&Constant::Str("it's".into())), "\"it's\"");
        assert_eq!(repr_constant(&Constant::Str("a\nb\u{1}".into())), "'a\\nb\\x01'");
        assert_eq!(repr_constant(&Constant::Bytes(b"\x00ok'".to_vec())), "b\"\\x00ok'\"");
        assert_eq!(repr_constant(&Constant::Complex { real: 0.0, imag: 2.0 }), "2j");
        assert_eq!(repr_constant(&Constant::Complex { real: 0.0, imag: 2.5 }), "2.5j");
        assert_eq!(repr_constant(&Constant::Ellipsis), "Ellipsis");
    }
}
