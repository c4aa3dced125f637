//! Property tests over generated expression programs.

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::select;
use proptest::test_runner::{Config, TestCaseError, TestRunner};
use serpent_syntax::ast::Span;
use serpent_syntax::dump::{Dump, DumpValue};
use serpent_syntax::{DumpOptions, Mode, dump, parse_source, unparse};

fn atom() -> impl Strategy<Value = String> {
    prop_oneof![
        select(vec!["a", "b", "x", "y", "spam"]).prop_map(str::to_string),
        (0u32..1000).prop_map(|n| n.to_string()),
        "[a-z ]{0,6}".prop_map(|s| format!("'{s}'")),
        Just("None".to_string()),
        Just("True".to_string()),
    ]
}

/// Fully parenthesized expressions, so the source itself never depends on precedence.
fn expr() -> impl Strategy<Value = String> {
    let binary = vec![
        "+", "-", "*", "/", "//", "%", "**", "<<", ">>", "&", "|", "^", "@", "and", "or", "<", "<=", "==",
        "!=", "in", "not in", "is", "is not",
    ];
    atom().prop_recursive(4, 48, 4, move |inner| {
        prop_oneof![
            (inner.clone(), select(binary.clone()), inner.clone()).prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            (select(vec!["-", "+", "~", "not "]), inner.clone()).prop_map(|(op, e)| format!("({op}{e})")),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(a, b, c)| format!("({a} if {b} else {c})")),
            (inner.clone(), vec(inner.clone(), 0..3)).prop_map(|(f, args)| format!("({f})({})", args.join(", "))),
            inner.clone().prop_map(|e| format!("({e}).attr")),
            (inner.clone(), inner.clone()).prop_map(|(e, i)| format!("({e})[{i}]")),
            vec(inner.clone(), 0..3).prop_map(|es| format!("[{}]", es.join(", "))),
            vec(inner.clone(), 2..4).prop_map(|es| format!("({})", es.join(", "))),
            inner.clone().prop_map(|e| format!("(lambda q: {e})")),
        ]
    })
}

fn program() -> impl Strategy<Value = String> {
    let statement = prop_oneof![
        expr(),
        (select(vec!["a", "b", "total"]), expr()).prop_map(|(name, e)| format!("{name} = {e}")),
    ];
    vec(statement, 1..4).prop_map(|lines| {
        let mut source = lines.join("\n");
        source.push('\n');
        source
    })
}

fn check<S, F>(make: F, cases: u32, test: impl Fn(S::Value) -> Result<(), TestCaseError>)
where
    S: Strategy,
    F: FnOnce() -> S,
{
    let mut runner = TestRunner::new(Config::with_cases(cases));
    if let Err(e) = runner.run(&make(), test) {
        panic!("{e}");
    }
}

fn contained(inner: Span, outer: Span) -> bool {
    outer.start.offset <= inner.start.offset && inner.end.offset <= outer.end.offset
}

fn check_spans(value: &DumpValue, enclosing: Option<Span>) -> Result<(), String> {
    match value {
        DumpValue::Node { name, fields, span } => {
            if let Some(span) = span {
                if span.start.offset > span.end.offset {
                    return Err(format!("{name} ends before it starts: {span:?}"));
                }
                if let Some(outer) = enclosing {
                    if !contained(*span, outer) {
                        return Err(format!("{name} at {span:?} escapes its parent at {outer:?}"));
                    }
                }
            }
            let enclosing = span.or(enclosing);
            fields.iter().try_for_each(|(_, v)| check_spans(v, enclosing))
        }
        DumpValue::List(items) => items.iter().try_for_each(|v| check_spans(v, enclosing)),
        DumpValue::Leaf(_) | DumpValue::Absent => Ok(()),
    }
}

#[test]
fn test_generated_programs_parse() {
    check(program, 128, |source| {
        let result = parse_source(&source, Mode::Module);
        prop_assert!(result.is_ok(), "{source:?}: {}", result.unwrap_err().render());
        Ok(())
    });
}

#[test]
fn test_parsing_is_deterministic() {
    check(program, 64, |source| {
        let options = DumpOptions::new().with_attributes(true);
        let first = dump(&parse_source(&source, Mode::Module).unwrap(), &options);
        let second = dump(&parse_source(&source, Mode::Module).unwrap(), &options);
        prop_assert_eq!(first, second);
        Ok(())
    });
}

#[test]
fn test_children_lie_within_their_parents() {
    check(program, 128, |source| {
        let tree = parse_source(&source, Mode::Module).unwrap();
        if let Err(message) = check_spans(&tree.to_value(), None) {
            return Err(TestCaseError::fail(format!("{source:?}: {message}")));
        }
        Ok(())
    });
}

#[test]
fn test_unparse_reparses_to_the_same_tree() {
    check(program, 128, |source| {
        let options = DumpOptions::default();
        let tree = parse_source(&source, Mode::Module).unwrap();
        let text = unparse(&tree);
        let reparsed = parse_source(&text, Mode::Module);
        prop_assert!(reparsed.is_ok(), "{source:?} unparsed to {text:?}");
        prop_assert_eq!(dump(&reparsed.unwrap(), &options), dump(&tree, &options), "unparsed: {:?}", text);
        Ok(())
    });
}

#[test]
fn test_left_recursive_chains_terminate() {
    let chains = || (1usize..200, select(vec!["-", "*", "."]));
    check(chains, 32, |(n, op)| {
        let terms: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
        let source = if op == "." { terms.join(".") } else { terms.join(&format!(" {op} ")) };
        let tree = parse_source(&source, Mode::Eval).unwrap();
        let text = dump(&tree, &DumpOptions::default());
        let node = if op == "." { "Attribute(" } else { "BinOp(" };
        prop_assert_eq!(text.matches(node).count(), n - 1);
        // Left associativity puts the first term innermost.
        let innermost = [format!("{}value=Name(id='t0'", node), format!("{}left=Name(id='t0'", node)];
        let first_innermost = n == 1 || innermost.iter().any(|prefix| text.contains(prefix.as_str()));
        prop_assert!(first_innermost, "t0 is not innermost in {}", text);
        Ok(())
    });
}
