//! End-to-end tests for the generator: grammar text in, Rust source out.
//!
//! The emitted file is parsed back with `syn` so assertions look at items and method bodies rather
//! than at formatting details.

use proptest::prelude::*;
use quote::ToTokens;
use serpent_pegen::{GeneratorConfig, GrammarErrorKind, check_grammar, generate};

const CALC: &str = r#"
@class CalcParser
@subheader '''
use std::fmt::Debug;
'''

start[i64]: e=expr NEWLINE? ENDMARKER { e }
expr[i64]:
    | l=expr '+' r=term { l + r }
    | l=expr '-' r=term { l - r }
    | term
term[i64] (memo): n=NUMBER { n.text.parse().unwrap_or(0) } | '(' ~ e=expr ')' { e }
names[Vec<String>]: ns=','.NAME+ { ns.into_iter().map(|t| t.text).collect() }
kw[()]: "match" &&':' 'pass' { () }
"#;

fn parsed(config: &GeneratorConfig) -> syn::File {
    let code = generate(CALC, "calc.gram", config).unwrap();
    assert!(code.starts_with("// @generated by serpent-pegen"));
    let body: String = code.lines().skip(1).collect::<Vec<_>>().join("\n");
    syn::parse_file(&body).unwrap()
}

/// Bodies of every method in every inherent impl, by name.
fn methods(file: &syn::File) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for item in &file.items {
        if let syn::Item::Impl(imp) = item {
            for member in &imp.items {
                if let syn::ImplItem::Fn(f) = member {
                    out.push((f.sig.ident.to_string(), f.block.to_token_stream().to_string()));
                }
            }
        }
    }
    out
}

fn body_of<'a>(methods: &'a [(String, String)], name: &str) -> &'a str {
    methods
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, b)| b.as_str())
        .unwrap_or_else(|| panic!("no method {name}"))
}

#[test]
fn test_emits_struct_tables_and_rule_methods() {
    let file = parsed(&GeneratorConfig::default());
    let has_struct = file
        .items
        .iter()
        .any(|i| matches!(i, syn::Item::Struct(s) if s.ident == "CalcParser"));
    assert!(has_struct);

    let consts: Vec<String> = file
        .items
        .iter()
        .filter_map(|i| match i {
            syn::Item::Const(c) => Some(c.ident.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(consts, vec!["KEYWORDS", "SOFT_KEYWORDS", "RULE_NAMES", "RULE_ID_BASE"]);

    let uses_debug = file.items.iter().any(|i| matches!(i, syn::Item::Use(_)));
    assert!(uses_debug, "subheader items are emitted");

    let m = methods(&file);
    for rule in ["start", "expr", "term", "names", "kw"] {
        body_of(&m, rule);
        body_of(&m, &format!("__{rule}_body"));
    }
}

#[test]
fn test_drivers_follow_analysis() {
    let m = methods(&parsed(&GeneratorConfig::default()));
    assert!(body_of(&m, "expr").contains("left_rec_rule (1001u16"));
    assert!(body_of(&m, "term").contains("memo_rule (1002u16"));
    assert!(body_of(&m, "start").contains("plain_rule"));
}

#[test]
fn test_item_lowering() {
    let m = methods(&parsed(&GeneratorConfig::default()));
    let term = body_of(&m, "__term_body");
    assert!(term.contains("expect_kind (:: serpent_core :: TokenKind :: Number)"));
    assert!(term.contains("expect_op (:: serpent_core :: OpKind :: Lpar)"));
    // After the cut a failure leaves the rule.
    assert!(term.contains("return None"));

    let kw = body_of(&m, "__kw_body");
    assert!(kw.contains("expect_soft_keyword (\"match\")"));
    assert!(kw.contains("forced"));
    assert!(kw.contains("expect_keyword (\"pass\")"));

    assert!(body_of(&m, "__names_body").contains("name_token"));
}

#[test]
fn test_actions_are_spliced_into_the_success_block() {
    let file = parsed(&GeneratorConfig::default());
    let term = body_of(&methods(&file), "__term_body").to_string();
    assert!(term.contains("end_position () ; n . text . parse ()"), "{term}");

    let impls = file.items.iter().filter_map(|i| match i {
        syn::Item::Impl(imp) if imp.trait_.is_none() => Some(imp),
        _ => None,
    });
    for imp in impls {
        let attrs = imp.attrs.iter().map(|a| a.to_token_stream().to_string()).collect::<String>();
        assert!(attrs.contains("dead_code"), "{attrs}");
    }
}

#[test]
fn test_keyword_tables() {
    let (_, analysis) = check_grammar(CALC, "calc.gram", &GeneratorConfig::default()).unwrap();
    assert_eq!(analysis.keywords, vec!["pass"]);
    assert_eq!(analysis.soft_keywords, vec!["match"]);
    assert_eq!(analysis.leaders, vec!["expr"]);
}

#[test]
fn test_rules_read_back_as_meta_text() {
    let (grammar, _) = check_grammar(CALC, "calc.gram", &GeneratorConfig::default()).unwrap();
    let text: String = grammar.rules.iter().map(|r| format!("{r}\n")).collect();
    insta::assert_snapshot!(text, @r###"
    start: e=expr NEWLINE? ENDMARKER
    expr: l=expr '+' r=term | l=expr '-' r=term | term
    term (memo): n=NUMBER | '(' ~ e=expr ')'
    names: ns=','.NAME+
    kw: "match" &&':' 'pass'
    "###);
}

#[test]
fn test_rule_named_like_a_suffixed_rule_gets_its_own_body() {
    let src = "start[()]: x x_raw ENDMARKER { () }\nx[()]: 'a' { () }\nx_raw[()]: 'b' { () }\n";
    let code = generate(src, "pair.gram", &GeneratorConfig::default().with_format(false)).unwrap();
    let body: String = code.lines().skip(1).collect::<Vec<_>>().join("\n");
    let file = syn::parse_file(&body).unwrap();
    let m = methods(&file);
    let mut names: Vec<&str> = m.iter().map(|(n, _)| n.as_str()).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(names.len(), before, "duplicate methods: {names:?}");
    for name in ["x", "x_raw", "__x_body", "__x_raw_body"] {
        body_of(&m, name);
    }
}

#[test]
fn test_rule_clashing_with_a_generated_method_is_rejected() {
    let src = "start[()]: __x_body ENDMARKER\n__x_body[()]: x\nx[()]: 'a'\n";
    let err = check_grammar(src, "clash.gram", &GeneratorConfig::default()).unwrap_err();
    assert_eq!(err.kind, GrammarErrorKind::DuplicateRule);
    assert!(err.message.contains("'__x_body'"), "{}", err.message);

    let err = check_grammar("start[()]: mark ENDMARKER\nmark[()]: 'a'\n", "clash.gram", &GeneratorConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, GrammarErrorKind::DuplicateRule);
}

#[test]
fn test_runtime_path_and_class_override() {
    let config = GeneratorConfig::default()
        .with_runtime_path("crate::rt")
        .with_class_name("Other")
        .with_format(false);
    let code = generate(CALC, "calc.gram", &config).unwrap();
    assert!(code.contains("crate :: rt :: ParserState"));
    assert!(code.contains("pub struct Other"));
}

#[test]
fn test_bad_action_is_reported_against_the_grammar() {
    let src = "start[()]: 'x' { let = }\n";
    let err = generate(src, "bad.gram", &GeneratorConfig::default()).unwrap_err();
    assert_eq!(err.kind, GrammarErrorKind::HostCode);
    assert_eq!(err.line_col(src), Some((1, 12)));
}

#[test]
fn test_bad_type_is_reported() {
    let err = generate("start[Vec<]: 'x'\n", "bad.gram", &GeneratorConfig::default()).unwrap_err();
    assert_eq!(err.kind, GrammarErrorKind::HostCode);
}

#[test]
fn test_diagnostic_renders_with_source() {
    let err = generate("start[()]: missing\n", "bad.gram", &GeneratorConfig::default()).unwrap_err();
    let mut out = String::new();
    miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, &err)
        .unwrap();
    assert!(out.contains("bad.gram"));
    assert!(out.contains("'missing' is neither a rule nor a token kind"));
}

proptest! {
    #[test]
    fn meta_front_end_never_panics(src in "\\PC{0,200}") {
        let _ = check_grammar(&src, "fuzz.gram", &GeneratorConfig::default());
    }

    #[test]
    fn generation_is_deterministic(memo in any::<bool>()) {
        let config = GeneratorConfig::default().with_memoize_all(memo);
        let a = generate(CALC, "calc.gram", &config).unwrap();
        let b = generate(CALC, "calc.gram", &config).unwrap();
        prop_assert_eq!(a, b);
    }
}
