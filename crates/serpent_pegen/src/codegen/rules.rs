//! Lowering of rules, alternatives and items to Rust.
//!
//! Every rule becomes a public entry method that picks a driver (`plain_rule`, `memo_rule` or
//! `left_rec_rule`) plus a private `__*_body` method. A body tries each alternative in order inside its
//! own labelled block and rewinds to the rule's start mark between attempts:
//!
//! ```text
//! fn __expr_body(&mut self) -> Option<Expr> {
//!     let _mark = self.mark();
//!     let start_pos = self.start_position(_mark);
//!     'alt_0: {
//!         let Some(a) = (self.expr()) else { break 'alt_0; };
//!         ...
//!         return Some({ let end_pos = self.end_position(); action });
//!     }
//!     self.reset(_mark);
//!     None
//! }
//! ```
//!
//! ## Notes
//! - Groups, repetitions and gathers are block expressions, so their element types never need
//!   naming. A group is a labelled block that `break`s out with `Some(value)` or `None`.
//! - Every fallible item expression evaluates to `Option<_>` and leaves the mark untouched when it
//!   yields `None`.
//! - Lookahead operands run inside a closure that receives the parser as `p`; everything emitted
//!   for them uses `p` as the receiver.
//! - After a cut, a failing item leaves the enclosing rule (or group) instead of the alternative.

use proc_macro2::{Ident, Span as TokenSpan, TokenStream};
use quote::{format_ident, quote};
use syn::Lifetime;

use super::host;
use crate::analysis::{LiteralKind, SOFT_KEYWORD_TOKEN, classify_literal};
use crate::errors::{GrammarError, GrammarErrorKind, GrammarResult};
use crate::grammar::{Alt, Grammar, Item, Rule, Span};
use serpent_core::TokenKind;

/// The enum variant an operator or token kind prints as, e.g. `Lpar`.
fn variant_ident(value: impl std::fmt::Debug) -> Ident {
    Ident::new(&format!("{value:?}"), TokenSpan::call_site())
}

/// Where a successful or cut-failed alternative transfers control to.
enum Exit {
    Rule,
    Group { label: Lifetime, mark: Ident },
}

struct AltContext {
    receiver: Ident,
    exit: Exit,
}

impl AltContext {
    fn success(&self, value: TokenStream) -> TokenStream {
        match &self.exit {
            Exit::Rule => quote! { return Some(#value); },
            Exit::Group { label, .. } => quote! { break #label Some(#value); },
        }
    }

    fn cut_failure(&self) -> TokenStream {
        let r = &self.receiver;
        match &self.exit {
            Exit::Rule => quote! { #r.reset(_mark); return None; },
            Exit::Group { label, mark } => quote! { #r.reset(#mark); break #label None; },
        }
    }
}

/// An item lowered to an expression.
struct Lowered {
    tokens: TokenStream,
    /// Evaluates to `Option<_>` and may fail. Infallible items evaluate to their value directly.
    fallible: bool,
}

impl Lowered {
    fn fallible(tokens: TokenStream) -> Self {
        Self { tokens, fallible: true }
    }

    fn infallible(tokens: TokenStream) -> Self {
        Self { tokens, fallible: false }
    }

    fn into_option(self) -> TokenStream {
        let tokens = self.tokens;
        if self.fallible { tokens } else { quote! { Some(#tokens) } }
    }
}

pub(super) struct RuleEmitter<'g> {
    grammar: &'g Grammar,
    rt: &'g syn::Path,
    rule_comments: bool,
    labels: usize,
    /// Span of the top-level item being lowered, for errors in nested fragments.
    span: Span,
}

impl<'g> RuleEmitter<'g> {
    pub(super) fn new(grammar: &'g Grammar, rt: &'g syn::Path, rule_comments: bool) -> Self {
        Self {
            grammar,
            rt,
            rule_comments,
            labels: 0,
            span: Span::default(),
        }
    }

    fn label(&mut self, kind: &str) -> Lifetime {
        let label = Lifetime::new(&format!("'{kind}_{}", self.labels), TokenSpan::call_site());
        self.labels += 1;
        label
    }

    /// The public entry method and private body for one rule.
    pub(super) fn rule(&mut self, rule: &Rule, id: u16) -> GrammarResult<TokenStream> {
        self.labels = 0;
        let name = host::ident(&rule.name, rule.span)?;
        let raw = Ident::new(&rule.body_name(), TokenSpan::call_site());
        let ty = host::rule_type(rule.ty.as_deref().unwrap_or("()"), rule.span)?;

        let driver = if rule.leader {
            quote! { self.left_rec_rule(#id, Self::#raw) }
        } else if rule.memo {
            quote! { self.memo_rule(#id, Self::#raw) }
        } else {
            quote! { self.plain_rule(Self::#raw) }
        };
        let doc = self.rule_comments.then(|| {
            let text = format!(" `{rule}`");
            quote! { #[doc = #text] }
        });

        let ctx = AltContext {
            receiver: Ident::new("self", TokenSpan::call_site()),
            exit: Exit::Rule,
        };
        let alts = rule
            .alts
            .iter()
            .map(|alt| self.alt(alt, &ctx))
            .collect::<GrammarResult<Vec<_>>>()?;

        Ok(quote! {
            #doc
            pub fn #name(&mut self) -> Option<#ty> {
                #driver
            }

            fn #raw(&mut self) -> Option<#ty> {
                let _mark = self.mark();
                let start_pos = self.start_position(_mark);
                #(
                    #alts
                    self.reset(_mark);
                )*
                None
            }
        })
    }

    // ========================================================================
    // Alternatives
    // ========================================================================

    fn alt(&mut self, alt: &Alt, ctx: &AltContext) -> GrammarResult<TokenStream> {
        let label = self.label("alt");
        let r = &ctx.receiver;
        let mut stmts = Vec::new();
        if alt.is_invalid_only() {
            stmts.push(quote! {
                if !#r.call_invalid_rules() {
                    break #label;
                }
            });
        }

        let mut after_cut = false;
        let mut bound = Vec::new();
        for (i, named) in alt.items.iter().enumerate() {
            self.span = named.span;
            let fail = if after_cut {
                ctx.cut_failure()
            } else {
                quote! { break #label; }
            };
            match &named.item {
                Item::Cut => after_cut = true,
                Item::PositiveLookahead(inner) | Item::NegativeLookahead(inner) => {
                    let positive = matches!(named.item, Item::PositiveLookahead(_));
                    let operand = self.lookahead_operand(inner)?;
                    stmts.push(quote! {
                        if !#r.lookahead(#positive, |p| #operand) {
                            #fail
                        }
                    });
                }
                item => {
                    let binding = match &named.name {
                        Some(name) => host::ident(name, named.span)?,
                        None => format_ident!("_{}", i + 1),
                    };
                    let lowered = self.item(item, r)?;
                    let expr = lowered.tokens;
                    stmts.push(if lowered.fallible {
                        quote! { let Some(#binding) = (#expr) else { #fail }; }
                    } else {
                        quote! { let #binding = #expr; }
                    });
                    bound.push(binding);
                }
            }
        }

        let finish = match &alt.action {
            // A bare reference to diagnostic rules only exists for the errors they raise.
            None if alt.is_invalid_only() => quote! { break #label; },
            None => ctx.success(match bound.as_slice() {
                [] => quote! { () },
                [one] => quote! { #one },
                many => quote! { (#(#many),*) },
            }),
            Some(code) => {
                let action = host::action(code, alt.span)?;
                ctx.success(quote! {{
                    let end_pos = #r.end_position();
                    #action
                }})
            }
        };

        Ok(quote! {
            #label: {
                #(#stmts)*
                #finish
            }
        })
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn lookahead_operand(&mut self, inner: &Item) -> GrammarResult<TokenStream> {
        let p = Ident::new("p", TokenSpan::call_site());
        Ok(self.item(inner, &p)?.into_option())
    }

    fn item(&mut self, item: &Item, r: &Ident) -> GrammarResult<Lowered> {
        let lowered = match item {
            Item::Name(name) => Lowered::fallible(self.name_ref(name, r)?),
            Item::Literal { value, quote: q } => {
                let rt = self.rt;
                match classify_literal(value, *q) {
                    Some(LiteralKind::Keyword(kw)) => Lowered::fallible(quote! { #r.expect_keyword(#kw) }),
                    Some(LiteralKind::SoftKeyword(kw)) => Lowered::fallible(quote! { #r.expect_soft_keyword(#kw) }),
                    Some(LiteralKind::Op(op)) => {
                        let variant = variant_ident(op);
                        Lowered::fallible(quote! { #r.expect_op(#rt::OpKind::#variant) })
                    }
                    None => {
                        return Err(GrammarError::new(
                            GrammarErrorKind::UnknownLiteral,
                            format!("'{value}' is neither a keyword nor a known operator"),
                            Some(self.span),
                        ));
                    }
                }
            }
            Item::Group(alts) => Lowered::fallible(self.group(alts, r)?),
            Item::Optional(inner) => Lowered::infallible(self.item(inner, r)?.into_option()),
            Item::Repeat0(inner) => {
                let elem = self.item(inner, r)?.into_option();
                Lowered::infallible(quote! {{
                    let mut _items = Vec::new();
                    while let Some(_item) = (#elem) {
                        _items.push(_item);
                    }
                    _items
                }})
            }
            Item::Repeat1(inner) => {
                let elem = self.item(inner, r)?.into_option();
                Lowered::fallible(quote! {{
                    let mut _items = Vec::new();
                    while let Some(_item) = (#elem) {
                        _items.push(_item);
                    }
                    if _items.is_empty() { None } else { Some(_items) }
                }})
            }
            Item::Gather { sep, elem } => {
                let elem = self.item(elem, r)?.into_option();
                let sep = self.item(sep, r)?.into_option();
                // Rewinding to `_resume` drops a trailing separator whose element failed.
                Lowered::fallible(quote! {{
                    let mut _items = Vec::new();
                    let mut _resume = #r.mark();
                    loop {
                        match (#elem) {
                            Some(_item) => _items.push(_item),
                            None => {
                                #r.reset(_resume);
                                break;
                            }
                        }
                        _resume = #r.mark();
                        if (#sep).is_none() {
                            break;
                        }
                    }
                    if _items.is_empty() { None } else { Some(_items) }
                }})
            }
            Item::PositiveLookahead(inner) | Item::NegativeLookahead(inner) => {
                let positive = matches!(item, Item::PositiveLookahead(_));
                let operand = self.lookahead_operand(inner)?;
                Lowered::fallible(quote! {
                    if #r.lookahead(#positive, |p| #operand) { Some(()) } else { None }
                })
            }
            Item::Forced(inner) => {
                let operand = self.item(inner, r)?.into_option();
                let expected = match inner.as_ref() {
                    Item::Literal { value, .. } => format!("'{value}'"),
                    other => other.to_string(),
                };
                Lowered::fallible(quote! {{
                    let _forced = #operand;
                    #r.forced(_forced, #expected)
                }})
            }
            Item::Cut => Lowered::infallible(quote! { () }),
        };
        Ok(lowered)
    }

    /// A reference to a rule, a token kind, or the soft-keyword pseudo token.
    fn name_ref(&self, name: &str, r: &Ident) -> GrammarResult<TokenStream> {
        let rt = self.rt;
        if self.grammar.rule(name).is_some() {
            let method = host::ident(name, self.span)?;
            return Ok(quote! { #r.#method() });
        }
        if name == SOFT_KEYWORD_TOKEN {
            return Ok(quote! { #r.soft_keyword_token() });
        }
        match TokenKind::from_name(name) {
            Some(TokenKind::Name) => Ok(quote! { #r.name_token() }),
            Some(TokenKind::Op(op)) => {
                let variant = variant_ident(op);
                Ok(quote! { #r.expect_op(#rt::OpKind::#variant) })
            }
            Some(kind) => {
                let variant = variant_ident(kind);
                Ok(quote! { #r.expect_kind(#rt::TokenKind::#variant) })
            }
            None => Err(GrammarError::new(
                GrammarErrorKind::UndefinedName,
                format!("'{name}' is neither a rule nor a token kind"),
                Some(self.span),
            )),
        }
    }

    fn group(&mut self, alts: &[Alt], r: &Ident) -> GrammarResult<TokenStream> {
        let label = self.label("group");
        let mark = format_ident!("_group_mark_{}", self.labels);
        let ctx = AltContext {
            receiver: r.clone(),
            exit: Exit::Group {
                label: label.clone(),
                mark: mark.clone(),
            },
        };
        let span = self.span;
        let alts = alts
            .iter()
            .map(|alt| self.alt(alt, &ctx))
            .collect::<GrammarResult<Vec<_>>>()?;
        self.span = span;
        Ok(quote! {
            #label: {
                let #mark = #r.mark();
                #(
                    #alts
                    #r.reset(#mark);
                )*
                None
            }
        })
    }
}
