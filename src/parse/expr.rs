//! Expression grammar: precedence climbing from assignment down to primaries.

use super::{PResult, Parser};
use crate::ast::*;
use crate::diagnostics::{Diagnostic, Phase, PARSE_EXPECTED_TOKEN, PARSE_UNEXPECTED_TOKEN};
use crate::escape::cook_string_literal;
use crate::span::Span;
use crate::token::{Keyword, TokenKind};

/// One element of a parenthesized list that may turn out to be arrow parameters.
struct CoverItem {
    expr: Expr,
    rest: bool,
    optional: bool,
    type_annotation: Option<String>,
    default: Option<Expr>,
    span: Span,
}

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> PResult<Expr> {
        let first = self.parse_assignment()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let start = first.span;
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_assignment()?);
        }
        Ok(Expr::new(ExprKind::Sequence(exprs), self.span_from(start)))
    }

    pub(crate) fn parse_assignment(&mut self) -> PResult<Expr> {
        if self.at_keyword(Keyword::Yield) {
            return self.parse_yield();
        }
        let left = self.parse_conditional()?;
        let Some(op) = assign_op(self.kind()) else {
            return Ok(left);
        };
        self.advance();
        let start = left.span;
        let target = self.to_assign_target(left, op)?;
        let value = self.parse_assignment()?;
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target,
                value: Box::new(value),
            },
            self.span_from(start),
        ))
    }

    fn parse_yield(&mut self) -> PResult<Expr> {
        let start = self.advance().span;
        let delegate = self.eat(TokenKind::Star);
        let token = self.current();
        let bare = token.newline_before
            || matches!(
                token.kind,
                TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::Colon
                    | TokenKind::Eof
            );
        let arg = if bare && !delegate {
            None
        } else {
            Some(Box::new(self.parse_assignment()?))
        };
        Ok(Expr::new(ExprKind::Yield { arg, delegate }, self.span_from(start)))
    }

    fn to_assign_target(&self, expr: Expr, op: AssignOp) -> PResult<AssignTarget> {
        let (simple, destructuring) = match &expr.unwrapped().kind {
            ExprKind::Ident(_) | ExprKind::Member { .. } => (true, false),
            ExprKind::Array(_) | ExprKind::Object(_) => (false, op == AssignOp::Assign),
            _ => (false, false),
        };
        if simple {
            Ok(AssignTarget::Simple(Box::new(expr)))
        } else if destructuring {
            Ok(AssignTarget::Pattern(self.expr_to_pattern(expr)?))
        } else {
            Err(self.invalid_target(expr.span))
        }
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let test = self.parse_binary(0)?;
        // `a?:` and `a?,` are optional arrow parameters, not a conditional.
        let is_conditional = self.at(TokenKind::Question)
            && !matches!(
                self.peek().kind,
                TokenKind::Colon | TokenKind::Comma | TokenKind::RParen
            );
        if !is_conditional {
            return Ok(test);
        }
        self.advance();
        let saved = std::mem::replace(&mut self.no_in, false);
        let consequent = self.parse_assignment();
        self.no_in = saved;
        let consequent = consequent?;
        self.expect(TokenKind::Colon, "`:`")?;
        let alternate = self.parse_assignment()?;
        let start = test.span;
        Ok(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            self.span_from(start),
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let assertion = (self.at_ident("as") || self.at_ident("satisfies")) && !self.current().newline_before;
            if assertion && min_prec < BinaryOp::Lt.precedence() {
                self.advance();
                let type_text = self.parse_type()?;
                let start = left.span;
                left = Expr::new(
                    ExprKind::TypeAssertion {
                        expr: Box::new(left),
                        type_text,
                    },
                    self.span_from(start),
                );
                continue;
            }
            let Some(op) = self.binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec <= min_prec {
                break;
            }
            self.advance();
            // `**` is right-associative.
            let next_min = if op == BinaryOp::Exp { prec - 1 } else { prec };
            let right = self.parse_binary(next_min)?;
            let start = left.span;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                self.span_from(start),
            );
        }
        Ok(left)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.kind() {
            TokenKind::QuestionQuestion => BinaryOp::Nullish,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::BangEqEq => BinaryOp::StrictNotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::Keyword(Keyword::Instanceof) => BinaryOp::Instanceof,
            TokenKind::Keyword(Keyword::In) if !self.no_in => BinaryOp::In,
            TokenKind::LtLt => BinaryOp::Shl,
            TokenKind::GtGt => BinaryOp::Shr,
            TokenKind::GtGtGt => BinaryOp::UShr,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Exp,
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let op = match self.kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Keyword(Keyword::Typeof) => Some(UnaryOp::Typeof),
            TokenKind::Keyword(Keyword::Void) => Some(UnaryOp::Void),
            TokenKind::Keyword(Keyword::Delete) => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let arg = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary { op, arg: Box::new(arg) }, self.span_from(start)));
        }
        match self.kind() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.advance().kind == TokenKind::PlusPlus {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                let arg = self.parse_unary()?;
                Ok(Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        arg: Box::new(arg),
                    },
                    self.span_from(start),
                ))
            }
            TokenKind::Keyword(Keyword::Await) => {
                self.advance();
                let arg = self.parse_unary()?;
                Ok(Expr::new(ExprKind::Await(Box::new(arg)), self.span_from(start)))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let expr = self.parse_call_member()?;
        let is_update = matches!(self.kind(), TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.current().newline_before;
        if !is_update {
            return Ok(expr);
        }
        let op = if self.advance().kind == TokenKind::PlusPlus {
            UpdateOp::Increment
        } else {
            UpdateOp::Decrement
        };
        let start = expr.span;
        Ok(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                arg: Box::new(expr),
            },
            self.span_from(start),
        ))
    }

    fn parse_call_member(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let mut expr = if self.at_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            expr = match self.kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident("a property name")?.lexeme;
                    member(expr, MemberProp::Ident(name), false, self.span_from(start))
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    match self.kind() {
                        TokenKind::LParen => {
                            let args = self.parse_arguments()?;
                            call(expr, args, true, self.span_from(start))
                        }
                        TokenKind::LBracket => {
                            let property = self.parse_computed_member()?;
                            member(expr, property, true, self.span_from(start))
                        }
                        _ => {
                            let name = self.expect_ident("a property name")?.lexeme;
                            member(expr, MemberProp::Ident(name), true, self.span_from(start))
                        }
                    }
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_member()?;
                    member(expr, property, false, self.span_from(start))
                }
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    call(expr, args, false, self.span_from(start))
                }
                TokenKind::TemplateStart => {
                    let template = self.parse_template()?;
                    Expr::new(
                        ExprKind::TaggedTemplate {
                            tag: Box::new(expr),
                            template,
                        },
                        self.span_from(start),
                    )
                }
                TokenKind::Bang if !self.current().newline_before => {
                    self.advance();
                    Expr::new(
                        ExprKind::TypeAssertion {
                            expr: Box::new(expr),
                            type_text: "!".to_string(),
                        },
                        self.span_from(start),
                    )
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn parse_computed_member(&mut self) -> PResult<MemberProp> {
        self.expect(TokenKind::LBracket, "`[`")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let property = self.parse_expression();
        self.no_in = saved;
        let property = property?;
        self.expect(TokenKind::RBracket, "`]`")?;
        Ok(MemberProp::Computed(Box::new(property)))
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        let start = self.advance().span;
        let mut callee = if self.at_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            callee = match self.kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident("a property name")?.lexeme;
                    member(callee, MemberProp::Ident(name), false, self.span_from(start))
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_member()?;
                    member(callee, property, false, self.span_from(start))
                }
                _ => break,
            };
        }
        let args = if self.at(TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            self.span_from(start),
        ))
    }

    pub(crate) fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen, "`(`")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) {
            args.push(self.parse_spread_or_assignment()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.no_in = saved;
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(args)
    }

    fn parse_spread_or_assignment(&mut self) -> PResult<Expr> {
        if self.at(TokenKind::DotDotDot) {
            let start = self.advance().span;
            let arg = self.parse_assignment()?;
            return Ok(Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(start)));
        }
        self.parse_assignment()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PRIMARY EXPRESSIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.current().clone();
        let start = token.span;
        let kind = match token.kind {
            TokenKind::Identifier => {
                let next = self.peek();
                let next_kind = next.kind;
                let next_same_line = !next.newline_before;
                if token.lexeme == "async" && next_same_line {
                    match next_kind {
                        TokenKind::Keyword(Keyword::Function) => {
                            self.advance();
                            let function = self.parse_function(start, true, false)?;
                            return Ok(Expr::new(ExprKind::Function(Box::new(function)), self.span_from(start)));
                        }
                        TokenKind::LParen => {
                            self.advance();
                            return self.parse_paren_or_arrow(start, true);
                        }
                        TokenKind::Identifier => {
                            self.advance();
                            return self.parse_ident_arrow(start, true);
                        }
                        _ => {}
                    }
                }
                if next_kind == TokenKind::Arrow && next_same_line {
                    return self.parse_ident_arrow(start, false);
                }
                self.advance();
                ExprKind::Ident(token.lexeme)
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Keyword(Keyword::Super) => {
                self.advance();
                ExprKind::Super
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Keyword(Keyword::Import) => {
                // `import(...)` and `import.meta`; the call/member loop does the rest.
                self.advance();
                ExprKind::Ident(token.lexeme)
            }
            TokenKind::Keyword(Keyword::Function) => {
                let function = self.parse_function(start, false, false)?;
                ExprKind::Function(Box::new(function))
            }
            TokenKind::Number => {
                self.advance();
                ExprKind::Number(token.lexeme)
            }
            TokenKind::String => {
                self.advance();
                ExprKind::String(cook_string_literal(&token.lexeme))
            }
            TokenKind::Regex => {
                self.advance();
                ExprKind::Regex(token.lexeme)
            }
            TokenKind::TemplateStart => ExprKind::Template(self.parse_template()?),
            TokenKind::LParen => return self.parse_paren_or_arrow(start, false),
            TokenKind::LBracket => self.parse_array_literal()?,
            TokenKind::LBrace => self.parse_object_literal()?,
            TokenKind::TagOpen => return self.parse_markup(),
            TokenKind::Error => {
                // Already reported by the lexer.
                self.advance();
                ExprKind::Invalid
            }
            _ => return Err(self.unexpected()),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_ident_arrow(&mut self, start: Span, is_async: bool) -> PResult<Expr> {
        let token = self.expect_ident("a parameter name")?;
        let param = Param {
            pattern: Pattern {
                kind: PatternKind::Ident(token.lexeme),
                span: token.span,
            },
            type_annotation: None,
            optional: false,
            rest: false,
            span: token.span,
        };
        self.expect(TokenKind::Arrow, "`=>`")?;
        self.parse_arrow_body(start, vec![param], is_async)
    }

    fn parse_arrow_body(&mut self, start: Span, params: Vec<Param>, is_async: bool) -> PResult<Expr> {
        let body = if self.at(TokenKind::LBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            let saved = std::mem::replace(&mut self.no_in, false);
            let body = self.parse_assignment();
            self.no_in = saved;
            ArrowBody::Expr(Box::new(body?))
        };
        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::Arrow(Box::new(Arrow {
                params,
                body,
                is_async,
                span,
            })),
            span,
        ))
    }

    /// `( ... )` is either a parenthesized expression or an arrow parameter
    /// list; which one is only known once the closing paren is followed (or
    /// not) by `=>`. The contents are parsed as expressions and reinterpreted.
    fn parse_paren_or_arrow(&mut self, start: Span, is_async: bool) -> PResult<Expr> {
        self.expect(TokenKind::LParen, "`(`")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let items = self.parse_cover_items();
        self.no_in = saved;
        let items = items?;
        let close = self.expect(TokenKind::RParen, "`)`")?;

        // Arrow return types are erased along with every other annotation.
        if self.at(TokenKind::Colon) && self.colon_starts_return_type() {
            self.advance();
            self.parse_type()?;
        }

        if self.at(TokenKind::Arrow) && !self.current().newline_before {
            self.advance();
            let mut params = Vec::with_capacity(items.len());
            for item in items {
                let mut pattern = self.expr_to_pattern(item.expr)?;
                if let Some(default) = item.default {
                    let span = pattern.span.to(default.span);
                    pattern = Pattern {
                        kind: PatternKind::Assign {
                            target: Box::new(pattern),
                            default: Box::new(default),
                        },
                        span,
                    };
                }
                params.push(Param {
                    pattern,
                    type_annotation: item.type_annotation,
                    optional: item.optional,
                    rest: item.rest,
                    span: item.span,
                });
            }
            return self.parse_arrow_body(start, params, is_async);
        }

        if is_async {
            let args = items
                .into_iter()
                .map(|item| {
                    if item.rest {
                        let span = item.span;
                        Expr::new(ExprKind::Spread(Box::new(item.expr)), span)
                    } else {
                        item.expr
                    }
                })
                .collect();
            let callee = Expr::new(ExprKind::Ident("async".to_string()), start);
            return Ok(call(callee, args, false, self.span_from(start)));
        }

        if let Some(item) = items
            .iter()
            .find(|i| i.rest || i.optional || i.type_annotation.is_some() || i.default.is_some())
        {
            return Err(Box::new(Diagnostic::error(
                PARSE_UNEXPECTED_TOKEN,
                "parameter syntax in a parenthesized expression",
                item.span,
                Phase::Parser,
            )));
        }
        let mut exprs: Vec<Expr> = items.into_iter().map(|i| i.expr).collect();
        let inner = match exprs.len() {
            0 => return Err(self.expected_at_close(close.span)),
            1 => exprs.remove(0),
            _ => {
                let span = exprs[0].span.to(close.span);
                Expr::new(ExprKind::Sequence(exprs), span)
            }
        };
        Ok(Expr::new(ExprKind::Paren(Box::new(inner)), self.span_from(start)))
    }

    fn parse_cover_items(&mut self) -> PResult<Vec<CoverItem>> {
        let mut items = Vec::new();
        while !self.at(TokenKind::RParen) {
            let start = self.current().span;
            let rest = self.eat(TokenKind::DotDotDot);
            let expr = self.parse_assignment()?;
            let optional = self.eat(TokenKind::Question);
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if type_annotation.is_some() && self.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            items.push(CoverItem {
                expr,
                rest,
                optional,
                type_annotation,
                default,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// After `)`, looks ahead (without consuming) for `: Type =>`.
    fn colon_starts_return_type(&self) -> bool {
        let mut depth = 0usize;
        for token in self.tokens[self.pos + 1..].iter() {
            match token.kind {
                TokenKind::Arrow if depth == 0 => return true,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::Lt => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::Gt => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::Comma | TokenKind::Semicolon | TokenKind::Colon | TokenKind::Question
                    if depth == 0 =>
                {
                    return false
                }
                TokenKind::Eof | TokenKind::Eq => return false,
                _ => {}
            }
            if token.newline_before && depth == 0 {
                return false;
            }
        }
        false
    }

    fn expected_at_close(&self, span: Span) -> Box<Diagnostic> {
        Box::new(Diagnostic::error(
            PARSE_EXPECTED_TOKEN,
            "expected an expression inside parentheses",
            span,
            Phase::Parser,
        ))
    }

    fn parse_array_literal(&mut self) -> PResult<ExprKind> {
        self.expect(TokenKind::LBracket, "`[`")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let mut elements = Vec::new();
        let result = loop {
            if self.at(TokenKind::RBracket) {
                break Ok(());
            }
            if self.eat(TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            match self.parse_spread_or_assignment() {
                Ok(element) => elements.push(Some(element)),
                Err(err) => break Err(err),
            }
            if !self.at(TokenKind::RBracket) {
                if let Err(err) = self.expect(TokenKind::Comma, "`,` or `]`") {
                    break Err(err);
                }
            }
        };
        self.no_in = saved;
        result?;
        self.expect(TokenKind::RBracket, "`]`")?;
        Ok(ExprKind::Array(elements))
    }

    fn parse_object_literal(&mut self) -> PResult<ExprKind> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let mut props = Vec::new();
        let result = loop {
            if self.at(TokenKind::RBrace) {
                break Ok(());
            }
            match self.parse_property() {
                Ok(prop) => props.push(prop),
                Err(err) => break Err(err),
            }
            if !self.eat(TokenKind::Comma) {
                break Ok(());
            }
        };
        self.no_in = saved;
        result?;
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(ExprKind::Object(props))
    }

    fn parse_property(&mut self) -> PResult<Property> {
        let start = self.current().span;
        if self.eat(TokenKind::DotDotDot) {
            let arg = self.parse_assignment()?;
            return Ok(Property {
                kind: PropertyKind::Spread(arg),
                span: self.span_from(start),
            });
        }

        let next_is_key = matches!(
            self.peek().kind,
            TokenKind::Identifier
                | TokenKind::Keyword(_)
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::LBracket
        );
        let mut method_kind = MethodKind::Method;
        let mut is_async = false;
        if next_is_key && (self.at_ident("get") || self.at_ident("set")) {
            method_kind = if self.advance().lexeme == "get" {
                MethodKind::Get
            } else {
                MethodKind::Set
            };
        } else if self.at_ident("async")
            && (next_is_key || self.peek().kind == TokenKind::Star)
            && !self.peek().newline_before
        {
            self.advance();
            is_async = true;
        }
        let is_generator = self.eat(TokenKind::Star);

        let key_is_ident = self.at(TokenKind::Identifier);
        let key = self.parse_property_key()?;

        if method_kind != MethodKind::Method || is_async || is_generator || self.at(TokenKind::LParen) {
            let name = match &key {
                PropKey::Ident(name) | PropKey::String(name) | PropKey::Number(name) => Some(name.clone()),
                PropKey::Computed(_) => None,
            };
            let function = self.parse_function_rest(start, name, is_async, is_generator)?;
            return Ok(Property {
                kind: PropertyKind::Method {
                    key,
                    kind: method_kind,
                    function,
                },
                span: self.span_from(start),
            });
        }

        if self.eat(TokenKind::Colon) {
            let value = self.parse_assignment()?;
            return Ok(Property {
                kind: PropertyKind::KeyValue { key, value },
                span: self.span_from(start),
            });
        }

        match key {
            PropKey::Ident(name) if key_is_ident => {
                let default = if self.eat(TokenKind::Eq) {
                    Some(self.parse_assignment()?)
                } else {
                    None
                };
                Ok(Property {
                    kind: PropertyKind::Shorthand { name, default },
                    span: self.span_from(start),
                })
            }
            _ => Err(self.expected("`:`")),
        }
    }

    pub(crate) fn parse_template(&mut self) -> PResult<Template> {
        self.expect(TokenKind::TemplateStart, "a template literal")?;
        let mut quasis = vec![String::new()];
        let mut exprs = Vec::new();
        loop {
            match self.kind() {
                TokenKind::TemplateChunk => {
                    let chunk = self.advance().lexeme;
                    if let Some(last) = quasis.last_mut() {
                        last.push_str(&chunk);
                    }
                }
                TokenKind::TemplateExprStart => {
                    self.advance();
                    let saved = std::mem::replace(&mut self.no_in, false);
                    let expr = self.parse_expression();
                    self.no_in = saved;
                    exprs.push(expr?);
                    self.expect(TokenKind::RBrace, "`}` closing the interpolation")?;
                    quasis.push(String::new());
                }
                TokenKind::TemplateEnd => {
                    self.advance();
                    break;
                }
                _ => return Err(self.expected("the end of the template literal")),
            }
        }
        Ok(Template { quasis, exprs })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REINTERPRETATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reinterprets an expression parsed in a cover position as a pattern.
    pub(crate) fn expr_to_pattern(&self, expr: Expr) -> PResult<Pattern> {
        let span = expr.span;
        let kind = match expr.kind {
            ExprKind::Ident(name) => PatternKind::Ident(name),
            ExprKind::Paren(inner) if matches!(inner.kind, ExprKind::Ident(_) | ExprKind::Member { .. }) => {
                return self.expr_to_pattern(*inner);
            }
            ExprKind::Member { .. } => PatternKind::Expr(Box::new(expr)),
            ExprKind::Assign {
                op: AssignOp::Assign,
                target,
                value,
            } => {
                let target = match target {
                    AssignTarget::Simple(simple) => self.expr_to_pattern(*simple)?,
                    AssignTarget::Pattern(pattern) => pattern,
                };
                PatternKind::Assign {
                    target: Box::new(target),
                    default: value,
                }
            }
            ExprKind::Array(elements) => {
                let mut out = Vec::with_capacity(elements.len());
                let mut rest = None;
                let count = elements.len();
                for (i, element) in elements.into_iter().enumerate() {
                    match element {
                        None => out.push(None),
                        Some(Expr {
                            kind: ExprKind::Spread(inner),
                            span,
                        }) => {
                            if i + 1 != count {
                                return Err(self.invalid_target(span));
                            }
                            rest = Some(Box::new(self.expr_to_pattern(*inner)?));
                        }
                        Some(element) => out.push(Some(self.expr_to_pattern(element)?)),
                    }
                }
                PatternKind::Array { elements: out, rest }
            }
            ExprKind::Object(props) => {
                let mut out = Vec::with_capacity(props.len());
                let mut rest = None;
                for prop in props {
                    let prop_span = prop.span;
                    match prop.kind {
                        PropertyKind::KeyValue { key, value } => out.push(ObjectPatternProp {
                            key,
                            value: self.expr_to_pattern(value)?,
                            shorthand: false,
                            span: prop_span,
                        }),
                        PropertyKind::Shorthand { name, default } => {
                            let mut value = Pattern {
                                kind: PatternKind::Ident(name.clone()),
                                span: prop_span,
                            };
                            if let Some(default) = default {
                                value = Pattern {
                                    kind: PatternKind::Assign {
                                        target: Box::new(value),
                                        default: Box::new(default),
                                    },
                                    span: prop_span,
                                };
                            }
                            out.push(ObjectPatternProp {
                                key: PropKey::Ident(name),
                                value,
                                shorthand: true,
                                span: prop_span,
                            });
                        }
                        PropertyKind::Spread(arg) => rest = Some(Box::new(self.expr_to_pattern(arg)?)),
                        PropertyKind::Method { .. } => return Err(self.invalid_target(prop_span)),
                    }
                }
                PatternKind::Object { props: out, rest }
            }
            _ => return Err(self.invalid_target(span)),
        };
        Ok(Pattern { kind, span })
    }
}

fn member(object: Expr, property: MemberProp, optional: bool, span: Span) -> Expr {
    Expr::new(
        ExprKind::Member {
            object: Box::new(object),
            property,
            optional,
        },
        span,
    )
}

fn call(callee: Expr, args: Vec<Expr>, optional: bool, span: Span) -> Expr {
    Expr::new(
        ExprKind::Call {
            callee: Box::new(callee),
            args,
            optional,
        },
        span,
    )
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::StarStarEq => AssignOp::Exp,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::LtLtEq => AssignOp::Shl,
        TokenKind::GtGtEq => AssignOp::Shr,
        TokenKind::GtGtGtEq => AssignOp::UShr,
        TokenKind::AmpAmpEq => AssignOp::And,
        TokenKind::PipePipeEq => AssignOp::Or,
        TokenKind::QuestionQuestionEq => AssignOp::Nullish,
        _ => return None,
    };
    Some(op)
}
