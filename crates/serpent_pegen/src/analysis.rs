//! Grammar analysis: validation and derived rule properties.
//!
//! Runs once between meta-parsing and code emission:
//!
//! 1. structural checks (start rules, type annotations, names, literals),
//! 2. nullability as a fixpoint over all rules,
//! 3. the "leading call" graph (which rules can be invoked at a rule's own start position),
//! 4. strongly connected components of that graph. Every rule on a cycle is left-recursive and
//!    each cycle gets one *leader*: a rule present in every cycle of its component. Only leaders
//!    run the grow-the-seed driver; the other members are called normally and never memoized, so
//!    the leader's seed is what breaks the recursion.
//! 5. the memoization decision.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serpent_core::{OpKind, TokenKind};

use crate::config::GeneratorConfig;
use crate::errors::{GrammarError, GrammarErrorKind, GrammarResult};
use crate::grammar::{Alt, Grammar, Item, Quote, Span};

/// Pseudo-token name matching any enabled soft keyword.
pub const SOFT_KEYWORD_TOKEN: &str = "SOFT_KEYWORD";

/// What analysis learned about a grammar, besides the flags it set on each rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub start_rules: Vec<String>,
    /// Hard keywords, sorted.
    pub keywords: Vec<String>,
    /// Soft keywords, sorted.
    pub soft_keywords: Vec<String>,
    pub left_recursive: Vec<String>,
    pub leaders: Vec<String>,
    pub unreachable: Vec<String>,
}

/// What a string literal in the grammar matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind<'a> {
    Keyword(&'a str),
    SoftKeyword(&'a str),
    Op(OpKind),
}

/// Classify a literal: identifier-like text is a keyword (hard when single-quoted), anything
/// else must be an exact operator spelling.
pub fn classify_literal(value: &str, quote: Quote) -> Option<LiteralKind<'_>> {
    let mut chars = value.chars();
    let ident = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    match (ident, quote) {
        (true, Quote::Single) => Some(LiteralKind::Keyword(value)),
        (true, Quote::Double) => Some(LiteralKind::SoftKeyword(value)),
        (false, _) => OpKind::from_spelling(value).map(LiteralKind::Op),
    }
}

/// Validate `grammar` and fill in `nullable`, `left_recursive`, `leader` and `memo` on its rules.
#[tracing::instrument(skip_all, fields(rules = grammar.rules.len()))]
pub fn analyze(grammar: &mut Grammar, config: &GeneratorConfig) -> GrammarResult<Analysis> {
    let start_rules = check_start(grammar)?;
    check_types(grammar)?;
    check_names(grammar)?;
    check_method_names(grammar)?;
    let (keywords, soft_keywords) = collect_literals(grammar)?;

    compute_nullable(grammar);
    check_repeats(grammar)?;
    check_cuts(grammar)?;

    let graph = leading_call_graph(grammar);
    let (left_recursive, leaders) = mark_left_recursion(grammar, &graph)?;
    decide_memo(grammar, config);
    let unreachable = find_unreachable(grammar, &start_rules, config);

    tracing::debug!(
        keywords = keywords.len(),
        soft_keywords = soft_keywords.len(),
        left_recursive = left_recursive.len(),
        leaders = leaders.len(),
        "grammar analysed"
    );
    Ok(Analysis {
        start_rules,
        keywords,
        soft_keywords,
        left_recursive,
        leaders,
        unreachable,
    })
}

// ============================================================================
// Traversal
// ============================================================================

/// Visit every item (nested ones included) together with the span of its top-level item.
fn walk_items<'a, F>(alts: &'a [Alt], f: &mut F) -> GrammarResult<()>
where
    F: FnMut(&'a Item, Span) -> GrammarResult<()>,
{
    for alt in alts {
        for named in &alt.items {
            walk_item(&named.item, named.span, f)?;
        }
    }
    Ok(())
}

fn walk_item<'a, F>(item: &'a Item, span: Span, f: &mut F) -> GrammarResult<()>
where
    F: FnMut(&'a Item, Span) -> GrammarResult<()>,
{
    f(item, span)?;
    match item {
        Item::Name(_) | Item::Literal { .. } | Item::Cut => Ok(()),
        Item::Group(alts) => walk_items(alts, f),
        Item::Optional(inner)
        | Item::Repeat0(inner)
        | Item::Repeat1(inner)
        | Item::PositiveLookahead(inner)
        | Item::NegativeLookahead(inner)
        | Item::Forced(inner) => walk_item(inner, span, f),
        Item::Gather { sep, elem } => {
            walk_item(sep, span, f)?;
            walk_item(elem, span, f)
        }
    }
}

/// Visit every alternative, including those of nested groups.
fn walk_alts<'a, F>(alts: &'a [Alt], f: &mut F) -> GrammarResult<()>
where
    F: FnMut(&'a Alt) -> GrammarResult<()>,
{
    for alt in alts {
        f(alt)?;
    }
    walk_items(alts, &mut |item, _| match item {
        Item::Group(inner) => inner.iter().try_for_each(|alt| f(alt)),
        _ => Ok(()),
    })
}

// ============================================================================
// Structural checks
// ============================================================================

fn check_start(grammar: &Grammar) -> GrammarResult<Vec<String>> {
    if grammar.rules.is_empty() {
        return Err(GrammarError::new(
            GrammarErrorKind::MissingStart,
            "grammar defines no rules",
            None,
        ));
    }
    let starts: Vec<String> = grammar.start_rules().into_iter().map(str::to_string).collect();
    if starts.is_empty() {
        return Err(GrammarError::new(
            GrammarErrorKind::MissingStart,
            "@start lists no rules",
            grammar.meta("start").map(|m| m.span),
        ));
    }
    for name in &starts {
        if grammar.rule(name).is_none() {
            return Err(GrammarError::new(
                GrammarErrorKind::MissingStart,
                format!("start rule '{name}' is not defined"),
                grammar.meta("start").map(|m| m.span),
            ));
        }
    }
    Ok(starts)
}

fn check_types(grammar: &Grammar) -> GrammarResult<()> {
    match grammar.rules.iter().find(|r| r.ty.is_none()) {
        Some(rule) => Err(GrammarError::new(
            GrammarErrorKind::MissingType,
            format!("rule '{}' has no type annotation", rule.name),
            Some(rule.span),
        )
        .with_help(format!("declare it as `{}[Type]: ...`", rule.name))),
        None => Ok(()),
    }
}

fn check_names(grammar: &Grammar) -> GrammarResult<()> {
    for rule in &grammar.rules {
        walk_items(&rule.alts, &mut |item, span| match item {
            Item::Name(name)
                if grammar.rule(name).is_none()
                    && TokenKind::from_name(name).is_none()
                    && name != SOFT_KEYWORD_TOKEN =>
            {
                Err(GrammarError::new(
                    GrammarErrorKind::UndefinedName,
                    format!("'{name}' is neither a rule nor a token kind"),
                    Some(span),
                )
                .with_help("token kinds are upper-case names such as NAME, NUMBER, NEWLINE or LPAR"))
            }
            _ => Ok(()),
        })?;
    }
    Ok(())
}

/// Methods every generated parser already has, from its inherent impl and `PegParser`.
const PARSER_METHODS: &[&str] = &[
    "new",
    "from_state",
    "into_state",
    "rule_name",
    "state",
    "state_mut",
    "mark",
    "reset",
    "start_position",
    "end_position",
    "has_error",
    "call_invalid_rules",
    "plain_rule",
    "memo_rule",
    "left_rec_rule",
    "expect_where",
    "expect_kind",
    "expect_op",
    "expect_keyword",
    "expect_soft_keyword",
    "name_token",
    "soft_keyword_token",
    "forced",
    "lookahead",
    "raise_error",
];

/// Rule names become method names next to each rule's generated body and the runtime's methods.
fn check_method_names(grammar: &Grammar) -> GrammarResult<()> {
    let bodies: HashSet<String> = grammar.rules.iter().map(|r| r.body_name()).collect();
    for rule in &grammar.rules {
        if bodies.contains(&rule.name) {
            return Err(GrammarError::new(
                GrammarErrorKind::DuplicateRule,
                format!("rule '{}' clashes with the generated body of another rule", rule.name),
                Some(rule.span),
            ));
        }
        if PARSER_METHODS.contains(&rule.name.as_str()) {
            return Err(GrammarError::new(
                GrammarErrorKind::DuplicateRule,
                format!("rule '{}' clashes with a generated parser method", rule.name),
                Some(rule.span),
            )
            .with_help("rename the rule"));
        }
    }
    Ok(())
}

fn collect_literals(grammar: &Grammar) -> GrammarResult<(Vec<String>, Vec<String>)> {
    let mut keywords = BTreeSet::new();
    let mut soft = BTreeSet::new();
    for rule in &grammar.rules {
        walk_items(&rule.alts, &mut |item, span| {
            let Item::Literal { value, quote } = item else {
                return Ok(());
            };
            match classify_literal(value, *quote) {
                Some(LiteralKind::Keyword(k)) => {
                    keywords.insert(k.to_string());
                }
                Some(LiteralKind::SoftKeyword(k)) => {
                    soft.insert(k.to_string());
                }
                Some(LiteralKind::Op(_)) => {}
                None => {
                    return Err(GrammarError::new(
                        GrammarErrorKind::UnknownLiteral,
                        format!("'{value}' is neither a keyword nor a known operator"),
                        Some(span),
                    ));
                }
            }
            Ok(())
        })?;
    }
    Ok((keywords.into_iter().collect(), soft.into_iter().collect()))
}

// ============================================================================
// Nullability
// ============================================================================

fn item_nullable(item: &Item, rule_nullable: &dyn Fn(&str) -> bool) -> bool {
    match item {
        Item::Name(name) => rule_nullable(name),
        Item::Literal { .. } => false,
        Item::Group(alts) => alts.iter().any(|alt| alt_nullable(alt, rule_nullable)),
        Item::Optional(_)
        | Item::Repeat0(_)
        | Item::PositiveLookahead(_)
        | Item::NegativeLookahead(_)
        | Item::Cut => true,
        Item::Repeat1(inner) | Item::Forced(inner) => item_nullable(inner, rule_nullable),
        Item::Gather { elem, .. } => item_nullable(elem, rule_nullable),
    }
}

fn alt_nullable(alt: &Alt, rule_nullable: &dyn Fn(&str) -> bool) -> bool {
    alt.items.iter().all(|named| item_nullable(&named.item, rule_nullable))
}

fn compute_nullable(grammar: &mut Grammar) {
    let mut nullable = vec![false; grammar.rules.len()];
    loop {
        let mut changed = false;
        for (i, rule) in grammar.rules.iter().enumerate() {
            if nullable[i] {
                continue;
            }
            let lookup = |name: &str| grammar.rule_index(name).is_some_and(|j| nullable[j]);
            if rule.alts.iter().any(|alt| alt_nullable(alt, &lookup)) {
                nullable[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    for (rule, n) in grammar.rules.iter_mut().zip(nullable) {
        rule.nullable = n;
    }
}

fn derived_nullable(grammar: &Grammar) -> impl Fn(&str) -> bool + '_ {
    move |name: &str| grammar.rule(name).is_some_and(|r| r.nullable)
}

fn check_repeats(grammar: &Grammar) -> GrammarResult<()> {
    let nullable = derived_nullable(grammar);
    for rule in &grammar.rules {
        walk_items(&rule.alts, &mut |item, span| {
            let looping = match item {
                Item::Repeat0(inner) | Item::Repeat1(inner) => item_nullable(inner, &nullable),
                Item::Gather { sep, elem } => item_nullable(sep, &nullable) && item_nullable(elem, &nullable),
                _ => false,
            };
            if looping {
                return Err(GrammarError::new(
                    GrammarErrorKind::NullableRepeat,
                    format!("'{item}' repeats something that can match without consuming input"),
                    Some(span),
                ));
            }
            Ok(())
        })?;
    }
    Ok(())
}

/// A cut must follow at least one item that always consumes input.
fn check_cuts(grammar: &Grammar) -> GrammarResult<()> {
    let nullable = derived_nullable(grammar);
    for rule in &grammar.rules {
        walk_alts(&rule.alts, &mut |alt| {
            let Some(cut) = alt.items.iter().position(|n| matches!(n.item, Item::Cut)) else {
                return Ok(());
            };
            let consumed = alt.items[..cut]
                .iter()
                .any(|n| n.item.binds_value() && !item_nullable(&n.item, &nullable));
            if consumed {
                Ok(())
            } else {
                Err(GrammarError::new(
                    GrammarErrorKind::CutPlacement,
                    "'~' must follow an item that consumes input",
                    Some(alt.items[cut].span),
                ))
            }
        })?;
    }
    Ok(())
}

// ============================================================================
// Left recursion
// ============================================================================

/// Rule names callable at the position `item` starts at.
fn leading_names<'a>(item: &'a Item, nullable: &dyn Fn(&str) -> bool, out: &mut Vec<&'a str>) {
    match item {
        Item::Name(name) => out.push(name),
        Item::Literal { .. } | Item::Cut => {}
        Item::Group(alts) => {
            for alt in alts {
                alt_leading_names(alt, nullable, out);
            }
        }
        Item::Optional(inner)
        | Item::Repeat0(inner)
        | Item::Repeat1(inner)
        | Item::Forced(inner)
        | Item::PositiveLookahead(inner)
        | Item::NegativeLookahead(inner) => leading_names(inner, nullable, out),
        Item::Gather { sep, elem } => {
            leading_names(elem, nullable, out);
            if item_nullable(elem, nullable) {
                leading_names(sep, nullable, out);
            }
        }
    }
}

fn alt_leading_names<'a>(alt: &'a Alt, nullable: &dyn Fn(&str) -> bool, out: &mut Vec<&'a str>) {
    for named in &alt.items {
        leading_names(&named.item, nullable, out);
        if !item_nullable(&named.item, nullable) {
            break;
        }
    }
}

/// Adjacency lists over rule indices: `graph[a]` holds every rule `a` can call without consuming.
fn leading_call_graph(grammar: &Grammar) -> Vec<Vec<usize>> {
    let nullable = derived_nullable(grammar);
    grammar
        .rules
        .iter()
        .map(|rule| {
            let mut names = Vec::new();
            for alt in &rule.alts {
                alt_leading_names(alt, &nullable, &mut names);
            }
            let mut edges: Vec<usize> = names.into_iter().filter_map(|n| grammar.rule_index(n)).collect();
            edges.sort_unstable();
            edges.dedup();
            edges
        })
        .collect()
}

struct Tarjan<'g> {
    graph: &'g [Vec<usize>],
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next: usize,
    sccs: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn run(graph: &'g [Vec<usize>]) -> Vec<Vec<usize>> {
        let n = graph.len();
        let mut t = Tarjan {
            graph,
            index: vec![None; n],
            low: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next: 0,
            sccs: Vec::new(),
        };
        for v in 0..n {
            if t.index[v].is_none() {
                t.connect(v);
            }
        }
        t.sccs
    }

    fn connect(&mut self, v: usize) {
        self.index[v] = Some(self.next);
        self.low[v] = self.next;
        self.next += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        let graph = self.graph;
        for &w in &graph[v] {
            match self.index[w] {
                None => {
                    self.connect(w);
                    self.low[v] = self.low[v].min(self.low[w]);
                }
                Some(iw) if self.on_stack[w] => self.low[v] = self.low[v].min(iw),
                Some(_) => {}
            }
        }

        if self.index[v] == Some(self.low[v]) {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            scc.sort_unstable();
            self.sccs.push(scc);
        }
    }
}

/// Every simple cycle through `start` that stays inside `members`.
fn cycles_through(graph: &[Vec<usize>], members: &HashSet<usize>, start: usize) -> Vec<Vec<usize>> {
    fn extend(
        graph: &[Vec<usize>],
        members: &HashSet<usize>,
        start: usize,
        path: &mut Vec<usize>,
        cycles: &mut Vec<Vec<usize>>,
    ) {
        let Some(&v) = path.last() else { return };
        for &w in &graph[v] {
            if !members.contains(&w) {
                continue;
            }
            if w == start {
                cycles.push(path.clone());
            } else if !path.contains(&w) {
                path.push(w);
                extend(graph, members, start, path, cycles);
                path.pop();
            }
        }
    }

    let mut cycles = Vec::new();
    extend(graph, members, start, &mut vec![start], &mut cycles);
    cycles
}

fn mark_left_recursion(grammar: &mut Grammar, graph: &[Vec<usize>]) -> GrammarResult<(Vec<String>, Vec<String>)> {
    let mut left_recursive = Vec::new();
    let mut leaders = Vec::new();

    for scc in Tarjan::run(graph) {
        let cyclic = scc.len() > 1 || graph[scc[0]].contains(&scc[0]);
        if !cyclic {
            continue;
        }
        for &i in &scc {
            grammar.rules[i].left_recursive = true;
        }

        let leader = if scc.len() == 1 {
            scc[0]
        } else {
            let members: HashSet<usize> = scc.iter().copied().collect();
            let mut candidates = members.clone();
            for &start in &scc {
                for cycle in cycles_through(graph, &members, start) {
                    candidates.retain(|c| cycle.contains(c));
                }
            }
            match candidates.into_iter().min() {
                Some(leader) => leader,
                None => {
                    let names: Vec<&str> = scc.iter().map(|&i| grammar.rules[i].name.as_str()).collect();
                    return Err(GrammarError::new(
                        GrammarErrorKind::NoLeader,
                        format!(
                            "left-recursive rules {{{}}} have no rule shared by every cycle",
                            names.join(", ")
                        ),
                        Some(grammar.rules[scc[0]].span),
                    )
                    .with_help("restructure the cycle so a single rule is entered by all of its paths"));
                }
            }
        };
        grammar.rules[leader].leader = true;
        tracing::debug!(
            leader = grammar.rules[leader].name.as_str(),
            members = scc.len(),
            "left-recursive cycle"
        );
    }

    for rule in &grammar.rules {
        if rule.left_recursive {
            left_recursive.push(rule.name.clone());
        }
        if rule.leader {
            leaders.push(rule.name.clone());
        }
    }
    Ok((left_recursive, leaders))
}

// ============================================================================
// Memoization and reachability
// ============================================================================

fn decide_memo(grammar: &mut Grammar, config: &GeneratorConfig) {
    for rule in &mut grammar.rules {
        rule.memo = if rule.leader {
            true
        } else if rule.left_recursive {
            if rule.memo_annotation {
                tracing::warn!(
                    rule = rule.name.as_str(),
                    "(memo) ignored on a left-recursive rule that does not lead its cycle"
                );
            }
            false
        } else {
            rule.memo_annotation || config.memoize_all
        };
    }
}

fn find_unreachable(grammar: &Grammar, starts: &[String], config: &GeneratorConfig) -> Vec<String> {
    let mut seen = vec![false; grammar.rules.len()];
    let mut queue: VecDeque<usize> = starts.iter().filter_map(|s| grammar.rule_index(s)).collect();
    for &i in &queue {
        seen[i] = true;
    }
    while let Some(i) = queue.pop_front() {
        for alt in &grammar.rules[i].alts {
            alt.for_each_name(&mut |name| {
                if let Some(j) = grammar.rule_index(name) {
                    if !seen[j] {
                        seen[j] = true;
                        queue.push_back(j);
                    }
                }
            });
        }
    }

    let unreachable: Vec<String> = grammar
        .rules
        .iter()
        .zip(&seen)
        .filter(|&(_, &s)| !s)
        .map(|(r, _)| r.name.clone())
        .collect();
    for name in unreachable.iter().take(config.max_unreachable_reported) {
        tracing::warn!(rule = name.as_str(), "rule is unreachable from the start rules");
    }
    if unreachable.len() > config.max_unreachable_reported {
        tracing::warn!(
            more = unreachable.len() - config.max_unreachable_reported,
            "further unreachable rules not listed"
        );
    }
    unreachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::parse_grammar;

    fn analysed(src: &str) -> GrammarResult<(Grammar, Analysis)> {
        let mut grammar = parse_grammar(src)?;
        let analysis = analyze(&mut grammar, &GeneratorConfig::default())?;
        Ok((grammar, analysis))
    }

    fn error_kind(src: &str) -> GrammarErrorKind {
        analysed(src).unwrap_err().kind
    }

    #[test]
    fn test_direct_left_recursion_is_its_own_leader() {
        let (g, a) = analysed(
            "start[i64]: expr ENDMARKER\n\
             expr[i64]: expr '+' term | term\n\
             term[i64]: NUMBER\n",
        )
        .unwrap();
        let expr = g.rule("expr").unwrap();
        assert!(expr.left_recursive && expr.leader && expr.memo);
        assert!(!g.rule("term").unwrap().left_recursive);
        assert_eq!(a.leaders, vec!["expr"]);
    }

    #[test]
    fn test_indirect_cycle_marks_all_members_and_one_leader() {
        let (g, a) = analysed(
            "start[()]: a\n\
             a[()]: b 'x' | 'y'\n\
             b[()] (memo): a 'z' | c\n\
             c[()]: 'w'\n",
        )
        .unwrap();
        assert_eq!(a.left_recursive, vec!["a", "b"]);
        assert_eq!(a.leaders, vec!["a"]);
        let b = g.rule("b").unwrap();
        assert!(b.left_recursive && !b.leader);
        assert!(!b.memo, "non-leader members must not be memoized");
    }

    #[test]
    fn test_cycles_without_common_rule_are_rejected() {
        let kind = error_kind(
            "start[()]: a\n\
             a[()]: b 'x' | c 'y' | 'z'\n\
             b[()]: a 'x'\n\
             c[()]: d 'x' | a 'y'\n\
             d[()]: c 'x'\n",
        );
        assert_eq!(kind, GrammarErrorKind::NoLeader);
    }

    #[test]
    fn test_left_recursion_through_nullable_prefix() {
        let (g, _) = analysed("start[()]: opt start 'x' | 'y'\nopt[()]: 'z'?\n").unwrap();
        assert!(g.rule("opt").unwrap().nullable);
        assert!(g.rule("start").unwrap().leader);
    }

    #[test]
    fn test_lookahead_names_count_as_leading_calls() {
        let (g, _) = analysed("start[()]: &start 'x' 'y' | 'z'\n").unwrap();
        assert!(g.rule("start").unwrap().left_recursive);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(error_kind("start[()]: foo\n"), GrammarErrorKind::UndefinedName);
        assert_eq!(error_kind("start: 'x'\n"), GrammarErrorKind::MissingType);
        assert_eq!(error_kind("@start 'main'\nstart[()]: 'x'\n"), GrammarErrorKind::MissingStart);
        assert_eq!(error_kind("start[()]: '$$'\n"), GrammarErrorKind::UnknownLiteral);
        assert_eq!(error_kind("start[()]: ~ 'x' | 'y'\n"), GrammarErrorKind::CutPlacement);
        assert_eq!(error_kind("start[()]: a*\na[()]: 'x'?\n"), GrammarErrorKind::NullableRepeat);
    }

    #[test]
    fn test_undefined_name_points_at_item() {
        let src = "start[()]: 'x' foo\n";
        let err = analysed(src).unwrap_err();
        assert_eq!(err.line_col(src), Some((1, 16)));
    }

    #[test]
    fn test_token_names_and_cut_after_consumption_are_accepted() {
        assert!(analysed("start[()]: NAME NEWLINE LPAR SOFT_KEYWORD\n").is_ok());
        assert!(analysed("start[()]: 'x' ~ 'y' | 'z'\n").is_ok());
    }

    #[test]
    fn test_keywords_are_collected_by_quote_style() {
        let (_, a) = analysed("start[()]: 'if' \"match\" 'if' ':=' \"case\" 'else'\n").unwrap();
        assert_eq!(a.keywords, vec!["else", "if"]);
        assert_eq!(a.soft_keywords, vec!["case", "match"]);
    }

    #[test]
    fn test_memo_decisions() {
        let src = "start[()]: a b\na[()] (memo): 'x'\nb[()]: 'y'\n";
        let (g, _) = analysed(src).unwrap();
        assert!(g.rule("a").unwrap().memo);
        assert!(!g.rule("b").unwrap().memo);

        let mut g = parse_grammar(src).unwrap();
        analyze(&mut g, &GeneratorConfig::default().with_memoize_all(true)).unwrap();
        assert!(g.rules.iter().all(|r| r.memo));
    }

    #[test]
    fn test_unreachable_rules_are_reported() {
        let (_, a) = analysed("start[()]: 'x'\norphan[()]: 'y'\n").unwrap();
        assert_eq!(a.unreachable, vec!["orphan"]);
    }

    #[test]
    fn test_classify_literal() {
        assert_eq!(classify_literal("if", Quote::Single), Some(LiteralKind::Keyword("if")));
        assert_eq!(classify_literal("match", Quote::Double), Some(LiteralKind::SoftKeyword("match")));
        assert_eq!(classify_literal("**=", Quote::Single), Some(LiteralKind::Op(OpKind::DoubleStarEqual)));
        assert_eq!(classify_literal("$", Quote::Single), None);
    }
}
