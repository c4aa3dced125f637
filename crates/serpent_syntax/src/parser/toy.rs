//! Runtime behaviour checked against the small grammar in `grammar/toy.gram`, using the Python
//! tokenizer as token source.

include!(concat!(env!("OUT_DIR"), "/toy_parser.rs"));

mod tests {
    use serpent_core::{Expected, PegParser, TokenKind, TokenStream};

    use super::{RULE_ID_BASE, SOFT_KEYWORDS, ToyParser};
    use crate::tokenizer::Tokenizer;

    fn parser(source: &str) -> ToyParser<'_> {
        ToyParser::new(TokenStream::new(Tokenizer::new(source)))
    }

    fn toy(source: &str) -> Option<String> {
        parser(source).start()
    }

    #[test]
    fn test_left_recursion_is_left_associative() {
        assert_eq!(toy("1 - 2 - 3\n").as_deref(), Some("(- (- 1 2) 3)"));
        assert_eq!(toy("1 + 2 * 3 / 4\n").as_deref(), Some("(+ 1 (/ (* 2 3) 4))"));
    }

    #[test]
    fn test_indirect_left_recursion() {
        assert_eq!(toy("a.b.c\n").as_deref(), Some("(. (. a b) c)"));
        assert_eq!(toy("f().x\n").as_deref(), Some("(. (call f) x)"));
    }

    #[test]
    fn test_long_left_recursive_chain_terminates() {
        let source = format!("{}\n", vec!["1"; 300].join(" + "));
        let tree = toy(&source).expect("chain should parse");
        assert_eq!(tree.matches("(+").count(), 299);
    }

    #[test]
    fn test_cut_commits_to_alternative() {
        assert_eq!(toy("let x = 1 + 2\n").as_deref(), Some("(let x (+ 1 2))"));
        // Without the cut, `let + 1` would fall through to the expression alternative.
        assert_eq!(toy("let + 1\n"), None);
    }

    #[test]
    fn test_soft_keyword_is_still_a_name() {
        assert_eq!(SOFT_KEYWORDS, &["let"]);
        assert_eq!(toy("x + let\n").as_deref(), Some("(+ x let)"));
    }

    #[test]
    fn test_hard_keyword_is_never_a_name() {
        assert_eq!(toy("del a, b\n").as_deref(), Some("(del a b)"));
        assert_eq!(toy("del\n"), None);
        assert_eq!(toy("x + del\n"), None);
    }

    #[test]
    fn test_gather_and_optional_trailing_separator() {
        assert_eq!(toy("(1, 2, 3)\n").as_deref(), Some("(tuple 1 2 3)"));
        assert_eq!(toy("(1, 2,)\n").as_deref(), Some("(tuple 1 2)"));
        assert_eq!(toy("(1)\n").as_deref(), Some("1"));
    }

    #[test]
    fn test_negative_lookahead() {
        // `NAME !'('` refuses a call, and `NAME '(' ')'` needs an empty argument list.
        assert_eq!(toy("f(1)\n"), None);
        assert_eq!(toy("f()\n").as_deref(), Some("(call f)"));
    }

    #[test]
    fn test_statements_are_joined() {
        assert_eq!(toy("x\ny\n").as_deref(), Some("x y"));
    }

    #[test]
    fn test_failure_records_expected_at_furthest_token() {
        let mut p = parser("1 +\n");
        assert_eq!(p.start(), None);
        let state = p.state();
        assert_eq!(state.furthest_failure(), 2);
        assert!(state.expected().contains(&Expected::Kind(TokenKind::Number)));
        assert!(state.expected().contains(&Expected::Kind(TokenKind::Name)));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "let y = (a.b, f(), 3 * 4)\n";
        assert_eq!(toy(source), toy(source));
        assert_eq!(toy(source).as_deref(), Some("(let y (tuple (. a b) (call f) (* 3 4)))"));
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(ToyParser::rule_name(RULE_ID_BASE), Some("start"));
        assert_eq!(ToyParser::rule_name(RULE_ID_BASE - 1), None);
        assert_eq!(ToyParser::rule_name(RULE_ID_BASE + 100), None);
    }
}
