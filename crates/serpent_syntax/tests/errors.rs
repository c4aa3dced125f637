//! Syntax error messages and locations, checked against what CPython reports.

use serpent_core::ErrorKind;
use serpent_syntax::{Mode, SyntaxError, parse_source};

fn error(source: &str) -> SyntaxError {
    match parse_source(source, Mode::Module) {
        Ok(tree) => panic!("expected a syntax error for {source:?}, got {tree:?}"),
        Err(err) => err,
    }
}

#[track_caller]
fn assert_message(source: &str, message: &str) {
    let err = error(source);
    assert_eq!(err.message, message, "source: {source:?}");
}

// =============================================================================
// Second-pass rules
// =============================================================================

#[test]
fn test_call_arguments() {
    assert_message("f(x=1, y)\n", "positional argument follows keyword argument");
    assert_message("f(**k, y)\n", "positional argument follows keyword argument unpacking");
    assert_message("f(a, b for b in c)\n", "Generator expression must be parenthesized");
}

#[test]
fn test_parameters() {
    let err = error("def f(a=1, b): pass\n");
    assert_eq!(err.message, "non-default argument follows default argument");
    assert_eq!((err.start.line, err.start.col), (1, 11));
    assert_message("def f(*): pass\n", "named arguments must follow bare *");
    assert_message("def f(/, a): pass\n", "at least one argument must precede /");
    assert_message("lambda *: 0\n", "named arguments must follow bare *");
}

#[test]
fn test_missing_colon() {
    let err = error("if x\n    pass\n");
    assert_eq!(err.message, "expected ':'");
    assert_eq!(err.start.line, 1);
    assert_message("class C(B)\n    pass\n", "expected ':'");
    assert_message("while x\n    pass\n", "expected ':'");
}

#[test]
fn test_missing_indented_block() {
    let err = error("if x:\npass\n");
    assert_eq!(err.message, "expected an indented block after 'if' statement on line 1");
    assert_eq!(err.kind, ErrorKind::Indentation);
    assert_eq!(err.exception_name(), "IndentationError");

    assert_message(
        "x = 1\ndef f():\nreturn\n",
        "expected an indented block after function definition on line 2",
    );
}

#[test]
fn test_invalid_targets() {
    assert_message("a, b += 1\n", "'tuple' is an illegal expression for augmented assignment");
    assert_message(
        "if f() = 1: pass\n",
        "cannot assign to function call here. Maybe you meant '==' instead of '='?",
    );
    assert_message("del f()\n", "cannot delete function call");
    assert_message("for 1 in x: pass\n", "cannot assign to literal");
    assert_message("a, b: int\n", "only single target (not tuple) can be annotated");
}

#[test]
fn test_forgot_comma_points_at_both_expressions() {
    let err = error("[a b]\n");
    assert_eq!(err.message, "invalid syntax. Perhaps you forgot a comma?");
    assert_eq!((err.start.col, err.end.col), (1, 4));
}

#[test]
fn test_forgot_comma_needs_brackets() {
    assert_eq!(error("a b\n").message, "invalid syntax");
}

#[test]
fn test_statement_shapes() {
    assert_message("from m import a, b,\n", "trailing comma not allowed without surrounding parentheses");
    assert_message("try:\n    pass\nx = 1\n", "expected 'except' or 'finally' block");
    assert_message("x = a if b\n", "expected 'else' after 'if' expression");
}

#[test]
fn test_displays() {
    assert_message("[*x for x in y]\n", "iterable unpacking cannot be used in comprehension");
    assert_message("{1: *a}\n", "cannot use a starred expression in a dictionary value");
}

#[test]
fn test_legacy_print() {
    assert_message("print 'hello'\n", "Missing parentheses in call to 'print'. Did you mean print(...)?");
}

// =============================================================================
// Tokenizer errors
// =============================================================================

#[test]
fn test_unterminated_string() {
    let err = error("x = 'abc\n");
    assert_eq!(err.message, "unterminated string literal (detected at line 1)");
    assert_eq!((err.start.line, err.start.col), (1, 4));
    assert_eq!(err.kind, ErrorKind::Lexical);
}

#[test]
fn test_unindent_mismatch() {
    let err = error("if x:\n        a\n    b\n");
    assert_eq!(err.message, "unindent does not match any outer indentation level");
    assert_eq!(err.exception_name(), "IndentationError");
}

#[test]
fn test_leading_zeros() {
    assert_message(
        "x = 012\n",
        "leading zeros in decimal integer literals are not permitted; use an 0o prefix for octal integers",
    );
}

#[test]
fn test_unexpected_indent() {
    let err = error("x = 1\n    y = 2\n");
    assert_eq!(err.message, "unexpected indent");
    assert_eq!(err.exception_name(), "IndentationError");
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_render_unclosed_paren() {
    insta::assert_snapshot!(error("x = (1,\n").render(), @r###"
      File "<unknown>", line 1
        x = (1,
            ^
    SyntaxError: '(' was never closed
    "###);
}

#[test]
fn test_render_carets_span_the_offending_range() {
    insta::assert_snapshot!(error("f(a, b for b in c)\n").render(), @r###"
      File "<unknown>", line 1
        f(a, b for b in c)
             ^^^^^^^^^^^^
    SyntaxError: Generator expression must be parenthesized
    "###);
}

#[test]
fn test_render_uses_filename() {
    let err = error("if x\n").with_filename("demo.py");
    assert!(err.render().starts_with("  File \"demo.py\", line 1\n"));
}
