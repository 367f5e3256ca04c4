//! Element literals, fragments and their children.

use super::{PResult, Parser};
use crate::ast::*;
use crate::diagnostics::{Diagnostic, Phase, PARSE_MISMATCHED_TAG};
use crate::escape::decode_entities;
use crate::span::Span;
use crate::token::TokenKind;

impl Parser {
    pub(crate) fn parse_markup(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::TagOpen, "`<`")?.span;

        if self.eat(TokenKind::TagClose) {
            let children = self.parse_children()?;
            self.expect(TokenKind::TagEndOpen, "`</>`")?;
            if self.at(TokenKind::JsxName) {
                let token = self.advance();
                self.report(mismatched(&token.lexeme, "", token.span));
            }
            self.expect(TokenKind::TagClose, "`>`")?;
            let span = self.span_from(start);
            return Ok(Expr::new(
                ExprKind::Fragment(Box::new(Fragment { children, span })),
                span,
            ));
        }

        let name = self.expect(TokenKind::JsxName, "a tag name")?.lexeme;
        let attributes = self.parse_attributes()?;

        if self.eat(TokenKind::TagSelfClose) {
            let span = self.span_from(start);
            return Ok(element(name, attributes, Vec::new(), true, span));
        }
        self.expect(TokenKind::TagClose, "`>` or `/>`")?;

        let children = self.parse_children()?;
        let close = self.expect(TokenKind::TagEndOpen, &format!("`</{}>`", name))?;
        if self.at(TokenKind::JsxName) {
            let token = self.advance();
            if token.lexeme != name {
                self.report(mismatched(&token.lexeme, &name, token.span));
            }
        } else {
            self.report(mismatched("", &name, close.span));
        }
        self.expect(TokenKind::TagClose, "`>`")?;
        let span = self.span_from(start);
        Ok(element(name, attributes, children, false, span))
    }

    fn parse_attributes(&mut self) -> PResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        loop {
            let start = self.current().span;
            match self.kind() {
                TokenKind::JsxName => {
                    let name = self.advance().lexeme;
                    let value = if self.eat(TokenKind::Eq) {
                        Some(self.parse_attribute_value()?)
                    } else {
                        None
                    };
                    attributes.push(Attribute::Named {
                        name,
                        value,
                        span: self.span_from(start),
                    });
                }
                TokenKind::LBrace => {
                    self.advance();
                    self.expect(TokenKind::DotDotDot, "`...` in a spread attribute")?;
                    let expr = self.parse_assignment()?;
                    self.expect(TokenKind::RBrace, "`}`")?;
                    attributes.push(Attribute::Spread {
                        expr,
                        span: self.span_from(start),
                    });
                }
                TokenKind::TagClose | TokenKind::TagSelfClose => return Ok(attributes),
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_attribute_value(&mut self) -> PResult<AttrValue> {
        match self.kind() {
            TokenKind::JsxString => {
                let raw = self.advance().lexeme;
                let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("");
                Ok(AttrValue::String(decode_entities(inner)))
            }
            TokenKind::LBrace => {
                self.advance();
                if self.at(TokenKind::RBrace) {
                    return Err(self.expected("an expression"));
                }
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RBrace, "`}`")?;
                Ok(AttrValue::Expr(expr))
            }
            TokenKind::ShorthandOpen => Ok(AttrValue::Expr(self.parse_shorthand()?)),
            TokenKind::Error => {
                let span = self.advance().span;
                Ok(AttrValue::Expr(Expr::new(ExprKind::Invalid, span)))
            }
            _ => Err(self.expected("an attribute value")),
        }
    }

    /// `@{name}` or `@{store.count}`, desugared to the getter call.
    fn parse_shorthand(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::ShorthandOpen, "`@{`")?.span;
        let head = self.expect_ident("a reactive binding name")?;
        let mut callee = Expr::new(ExprKind::Ident(head.lexeme), head.span);
        while self.eat(TokenKind::Dot) {
            let name = self.expect_ident("a property name")?;
            let span = callee.span.to(name.span);
            callee = Expr::new(
                ExprKind::Member {
                    object: Box::new(callee),
                    property: MemberProp::Ident(name.lexeme),
                    optional: false,
                },
                span,
            );
        }
        self.expect(TokenKind::RBrace, "`}` closing the shorthand binding")?;
        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args: Vec::new(),
                optional: false,
            },
            self.span_from(start),
        ))
    }

    fn parse_children(&mut self) -> PResult<Vec<JsxChild>> {
        let mut children = Vec::new();
        loop {
            let start = self.current().span;
            let kind = match self.kind() {
                TokenKind::JsxText => JsxChildKind::Text(self.advance().lexeme),
                TokenKind::LBrace => {
                    self.advance();
                    if self.eat(TokenKind::RBrace) {
                        JsxChildKind::Empty
                    } else if self.eat(TokenKind::DotDotDot) {
                        let expr = self.parse_expression()?;
                        self.expect(TokenKind::RBrace, "`}`")?;
                        JsxChildKind::Spread(expr)
                    } else {
                        let expr = self.parse_expression()?;
                        self.expect(TokenKind::RBrace, "`}`")?;
                        JsxChildKind::Expr(expr)
                    }
                }
                TokenKind::ShorthandOpen => JsxChildKind::Shorthand(self.parse_shorthand()?),
                TokenKind::TagOpen => {
                    let nested = self.parse_markup()?;
                    match nested.kind {
                        ExprKind::Element(el) => JsxChildKind::Element(el),
                        ExprKind::Fragment(fragment) => JsxChildKind::Fragment(fragment),
                        _ => JsxChildKind::Empty,
                    }
                }
                TokenKind::TagEndOpen | TokenKind::Eof => return Ok(children),
                _ => return Err(self.unexpected()),
            };
            children.push(JsxChild {
                kind,
                span: self.span_from(start),
            });
        }
    }
}

fn element(name: String, attributes: Vec<Attribute>, children: Vec<JsxChild>, self_closing: bool, span: Span) -> Expr {
    Expr::new(
        ExprKind::Element(Box::new(Element {
            name,
            attributes,
            children,
            self_closing,
            span,
        })),
        span,
    )
}

fn mismatched(found: &str, expected: &str, span: Span) -> Diagnostic {
    let describe = |name: &str| {
        if name.is_empty() {
            "<>".to_string()
        } else {
            format!("<{}>", name)
        }
    };
    Diagnostic::error(
        PARSE_MISMATCHED_TAG,
        format!(
            "closing tag </{}> does not match {}",
            found,
            describe(expected)
        ),
        span,
        Phase::Parser,
    )
    .with_suggestion(if expected.is_empty() {
        "close the fragment with `</>`".to_string()
    } else {
        format!("close the element with `</{}>`", expected)
    })
}
