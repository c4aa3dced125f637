//! Hand-written recursive-descent parser for the meta-language.
//!
//! ```text
//! file:     meta* rule* EOF
//! meta:     '@' NAME [NAME | STRING]
//! rule:     NAME [TYPE] ['(' 'memo' ')'] ':' alts
//! alts:     ['|'] alt ('|' alt)*
//! alt:      item* [ACTION]
//! item:     [NAME '='] ('&&' atom | '&' atom | '!' atom | '~' | quantified)
//! quantified: atom ['?' | '*' | '+' | '.' atom '+']
//! atom:     NAME | STRING | '(' alts ')' | '[' alts ']'
//! ```
//!
//! A rule ends where the next column-0 token begins.

use std::collections::HashSet;

use super::lexer::{MetaToken, MetaTokenKind};
use crate::errors::{GrammarError, GrammarErrorKind, GrammarResult};
use crate::grammar::{Alt, Grammar, Item, Meta, NamedItem, Rule, Span};

pub struct MetaParser {
    tokens: Vec<MetaToken>,
    pos: usize,
}

impl MetaParser {
    pub fn new(tokens: Vec<MetaToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> GrammarResult<Grammar> {
        let mut metas = Vec::new();
        while self.check(&MetaTokenKind::At) {
            metas.push(self.meta()?);
        }

        let mut rules = Vec::new();
        let mut seen = HashSet::new();
        while !self.check(&MetaTokenKind::Eof) {
            if self.check(&MetaTokenKind::At) {
                return Err(GrammarError::syntax(
                    "meta-directives must precede the first rule",
                    self.peek().span,
                ));
            }
            let rule = self.rule()?;
            if !seen.insert(rule.name.clone()) {
                return Err(GrammarError::new(
                    GrammarErrorKind::DuplicateRule,
                    format!("rule '{}' is defined more than once", rule.name),
                    Some(rule.span),
                ));
            }
            rules.push(rule);
        }
        Ok(Grammar::new(rules, metas))
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> &MetaToken {
        // The lexer always ends the vector with Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &MetaToken {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> MetaToken {
        let tok = self.peek().clone();
        if tok.kind != MetaTokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &MetaTokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: MetaTokenKind, what: &str) -> GrammarResult<MetaToken> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> GrammarError {
        let tok = self.peek();
        let found = match &tok.kind {
            MetaTokenKind::Eof => "end of file".to_string(),
            MetaTokenKind::Name(n) => format!("name '{n}'"),
            MetaTokenKind::String { value, .. } => format!("string '{value}'"),
            MetaTokenKind::Action(_) => "action".to_string(),
            other => format!("{other:?}"),
        };
        GrammarError::syntax(format!("expected {what}, found {found}"), tok.span)
    }

    /// Whether the current token starts a new rule or directive (or ends the file).
    fn at_rule_boundary(&self) -> bool {
        let tok = self.peek();
        tok.kind == MetaTokenKind::Eof || tok.at_line_start
    }

    // ========================================================================
    // Grammar structure
    // ========================================================================

    fn meta(&mut self) -> GrammarResult<Meta> {
        let at = self.expect(MetaTokenKind::At, "'@'")?;
        let name_tok = self.advance();
        let MetaTokenKind::Name(name) = name_tok.kind else {
            return Err(GrammarError::syntax("expected directive name after '@'", name_tok.span));
        };
        let mut span = at.span.merge(name_tok.span);
        let value = if self.at_rule_boundary() {
            None
        } else {
            let tok = self.advance();
            span = span.merge(tok.span);
            match tok.kind {
                MetaTokenKind::Name(v) => Some(v),
                MetaTokenKind::String { value, .. } => Some(value),
                _ => return Err(GrammarError::syntax("expected a name or string value", tok.span)),
            }
        };
        Ok(Meta { name, value, span })
    }

    fn rule(&mut self) -> GrammarResult<Rule> {
        let name_tok = self.advance();
        let MetaTokenKind::Name(name) = name_tok.kind else {
            return Err(GrammarError::syntax("expected a rule name", name_tok.span));
        };
        if !name_tok.at_line_start {
            return Err(GrammarError::syntax("rule names must start in column 0", name_tok.span));
        }

        let ty = if let MetaTokenKind::Type(ty) = &self.peek().kind {
            let ty = ty.clone();
            self.advance();
            Some(ty)
        } else {
            None
        };

        let mut memo = false;
        if self.check(&MetaTokenKind::LParen) {
            self.advance();
            let flag = self.advance();
            match flag.kind {
                MetaTokenKind::Name(ref n) if n == "memo" => memo = true,
                _ => return Err(GrammarError::syntax("expected '(memo)'", flag.span)),
            }
            self.expect(MetaTokenKind::RParen, "')'")?;
        }

        self.expect(MetaTokenKind::Colon, "':' after rule name")?;
        let alts = self.alts(true)?;
        let end = alts.last().map(|a| a.span.end).unwrap_or(name_tok.span.end);
        let mut rule = Rule::new(name, ty, alts, Span::new(name_tok.span.start, end));
        rule.memo_annotation = memo;
        Ok(rule)
    }

    /// Parse `['|'] alt ('|' alt)*`. At top level a column-0 token ends the list.
    fn alts(&mut self, top_level: bool) -> GrammarResult<Vec<Alt>> {
        if self.check(&MetaTokenKind::Bar) {
            self.advance();
        }
        let mut alts = vec![self.alt(top_level)?];
        while self.check(&MetaTokenKind::Bar) && !(top_level && self.at_rule_boundary()) {
            self.advance();
            alts.push(self.alt(top_level)?);
        }
        Ok(alts)
    }

    fn alt(&mut self, top_level: bool) -> GrammarResult<Alt> {
        let start = self.peek().span;
        let mut items = Vec::new();
        loop {
            if top_level && self.at_rule_boundary() {
                break;
            }
            match self.peek().kind {
                MetaTokenKind::Bar
                | MetaTokenKind::RParen
                | MetaTokenKind::RBracket
                | MetaTokenKind::Action(_)
                | MetaTokenKind::Eof => break,
                _ => items.push(self.named_item()?),
            }
        }

        let mut span = items.iter().fold(Span::new(start.start, start.start), |s, i| s.merge(i.span));
        let action = if let MetaTokenKind::Action(code) = &self.peek().kind {
            let code = code.clone();
            span = span.merge(self.advance().span);
            Some(code)
        } else {
            None
        };

        if items.is_empty() && action.is_none() {
            return Err(self.unexpected("an item or an action"));
        }
        Ok(Alt { items, action, span })
    }

    fn named_item(&mut self) -> GrammarResult<NamedItem> {
        let start = self.peek().span;
        let name = match (&self.peek().kind, &self.peek_at(1).kind) {
            (MetaTokenKind::Name(n), MetaTokenKind::Equals) => {
                let n = n.clone();
                self.advance();
                self.advance();
                Some(n)
            }
            _ => None,
        };

        let item = match self.peek().kind {
            MetaTokenKind::AmpAmp => {
                self.advance();
                Item::Forced(Box::new(self.atom()?))
            }
            MetaTokenKind::Amp => {
                self.advance();
                Item::PositiveLookahead(Box::new(self.atom()?))
            }
            MetaTokenKind::Bang => {
                self.advance();
                Item::NegativeLookahead(Box::new(self.atom()?))
            }
            MetaTokenKind::Tilde => {
                self.advance();
                Item::Cut
            }
            _ => self.quantified()?,
        };
        if name.is_some() && !item.binds_value() {
            return Err(GrammarError::syntax("lookaheads and cuts cannot be named", start));
        }

        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(NamedItem {
            name,
            item,
            span: Span::new(start.start, end.max(start.start)),
        })
    }

    fn quantified(&mut self) -> GrammarResult<Item> {
        let atom = self.atom()?;
        let item = match self.peek().kind {
            MetaTokenKind::Question => {
                self.advance();
                Item::Optional(Box::new(atom))
            }
            MetaTokenKind::Star => {
                self.advance();
                Item::Repeat0(Box::new(atom))
            }
            MetaTokenKind::Plus => {
                self.advance();
                Item::Repeat1(Box::new(atom))
            }
            MetaTokenKind::Dot => {
                self.advance();
                let elem = self.atom()?;
                self.expect(MetaTokenKind::Plus, "'+' to close the gather")?;
                Item::Gather {
                    sep: Box::new(atom),
                    elem: Box::new(elem),
                }
            }
            _ => atom,
        };
        Ok(item)
    }

    fn atom(&mut self) -> GrammarResult<Item> {
        let tok = self.peek().clone();
        match tok.kind {
            MetaTokenKind::Name(name) => {
                self.advance();
                Ok(Item::Name(name))
            }
            MetaTokenKind::String { value, quote } => {
                self.advance();
                if value.is_empty() {
                    return Err(GrammarError::syntax("empty string literal", tok.span));
                }
                Ok(Item::Literal { value, quote })
            }
            MetaTokenKind::LParen => {
                self.advance();
                let alts = self.alts(false)?;
                self.expect(MetaTokenKind::RParen, "')'")?;
                Ok(Item::Group(alts))
            }
            MetaTokenKind::LBracket => {
                self.advance();
                let alts = self.alts(false)?;
                self.expect(MetaTokenKind::RBracket, "']'")?;
                Ok(Item::Optional(Box::new(Item::Group(alts))))
            }
            _ => Err(self.unexpected("an atom")),
        }
    }
}
