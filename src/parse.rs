//! Recursive-descent parser.
//!
//! One token of lookahead and no backtracking: the lexer has already decided
//! every `<`-versus-relational and `{`-versus-block question. A syntax error is
//! reported once, then the parser skips to the next statement boundary and
//! carries on, so a unit with several mistakes still yields a usable tree.

mod expr;
mod markup;

use crate::ast::*;
use crate::diagnostics::{
    Diagnostic, Phase, LEX_UNTERMINATED_COMMENT, LEX_UNTERMINATED_ELEMENT, LEX_UNTERMINATED_REGEX,
    LEX_UNTERMINATED_STRING, LEX_UNTERMINATED_TEMPLATE, PARSE_EXPECTED_TOKEN, PARSE_INVALID_TARGET,
    PARSE_UNEXPECTED_TOKEN,
};
use crate::escape::cook_string_literal;
use crate::lexer::tokenize;
use crate::span::Span;
use crate::token::{Keyword, Token, TokenKind};

pub(crate) type PResult<T> = Result<T, Box<Diagnostic>>;

#[derive(Debug, Clone)]
pub struct ParseResult {
    pub program: Program,
    /// Lexer diagnostics first, then parser diagnostics in source order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses one unit's token stream.
pub fn parse(tokens: Vec<Token>) -> ParseResult {
    Parser::new(tokens).parse_program()
}

/// Tokenizes and parses `source`.
pub fn parse_source(source: &str) -> ParseResult {
    parse(tokenize(source))
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    /// Set inside a `for (` head, where `in` ends the initializer.
    no_in: bool,
    /// The lexer already reported an unterminated construct, so running into
    /// end of input is not worth a second diagnostic.
    lexer_hit_eof: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut kept = Vec::with_capacity(tokens.len());
        let mut diagnostics = Vec::new();
        let mut lexer_hit_eof = false;

        for mut token in tokens {
            if token.kind != TokenKind::Error {
                kept.push(token);
                continue;
            }
            let value_like = match token.diagnostic.take() {
                Some(diagnostic) => {
                    let code = diagnostic.code.as_str();
                    lexer_hit_eof |= matches!(
                        code,
                        LEX_UNTERMINATED_TEMPLATE | LEX_UNTERMINATED_ELEMENT | LEX_UNTERMINATED_COMMENT
                    );
                    let value_like = matches!(code, LEX_UNTERMINATED_STRING | LEX_UNTERMINATED_REGEX);
                    diagnostics.push(*diagnostic);
                    value_like
                }
                None => false,
            };
            // Malformed literals still occupy an operand slot.
            if value_like {
                kept.push(token);
            }
        }

        if kept.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let end = kept.last().map(|t| t.span).unwrap_or_default();
            kept.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                span: Span::new(end.end, end.end, end.line, end.column),
                newline_before: false,
                space_before: false,
                diagnostic: None,
            });
        }

        Self {
            tokens: kept,
            pos: 0,
            diagnostics,
            no_in: false,
            lexer_hit_eof,
        }
    }

    pub fn parse_program(mut self) -> ParseResult {
        let start = self.current().span;
        let body = self.parse_statement_list(|_| false);
        let span = start.to(self.current().span);
        ParseResult {
            program: Program { body, span },
            diagnostics: self.diagnostics,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CURSOR
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    pub(crate) fn at_keyword(&self, kw: Keyword) -> bool {
        self.current().kind == TokenKind::Keyword(kw)
    }

    pub(crate) fn at_ident(&self, name: &str) -> bool {
        self.current().is_ident(name)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_ident(&mut self, name: &str) -> bool {
        if self.at_ident(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(what))
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> PResult<Token> {
        self.expect(TokenKind::Identifier, what)
    }

    pub(crate) fn expect_contextual(&mut self, name: &str) -> PResult<Token> {
        if self.at_ident(name) {
            Ok(self.advance())
        } else {
            Err(self.expected(&format!("`{}`", name)))
        }
    }

    /// Span of the most recently consumed token.
    pub(crate) fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1) {
            Some(i) => self.tokens[i].span,
            None => self.current().span,
        }
    }

    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.to(self.prev_span())
    }

    pub(crate) fn expected(&self, what: &str) -> Box<Diagnostic> {
        let found = describe_token(self.current());
        Box::new(Diagnostic::error(
            PARSE_EXPECTED_TOKEN,
            format!("expected {}, found {}", what, found),
            self.current().span,
            Phase::Parser,
        ))
    }

    pub(crate) fn unexpected(&self) -> Box<Diagnostic> {
        Box::new(Diagnostic::error(
            PARSE_UNEXPECTED_TOKEN,
            format!("unexpected {}", describe_token(self.current())),
            self.current().span,
            Phase::Parser,
        ))
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Automatic semicolon insertion: a `;` is optional at a line break,
    /// before `}` and at end of input.
    pub(crate) fn consume_semicolon(&mut self) -> PResult<()> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.current();
        if token.kind == TokenKind::RBrace || token.kind == TokenKind::Eof || token.newline_before {
            return Ok(());
        }
        Err(self.expected("`;`"))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RECOVERY
    // ═══════════════════════════════════════════════════════════════════════════

    fn parse_statement_list(&mut self, stop: fn(&Token) -> bool) -> Vec<Stmt> {
        let mut body = Vec::new();
        loop {
            if self.at(TokenKind::Eof) || stop(self.current()) {
                break;
            }
            let start = self.pos;
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(err) => {
                    if !(self.lexer_hit_eof && self.at(TokenKind::Eof)) {
                        self.diagnostics.push(*err);
                    }
                    self.synchronize(start);
                }
            }
            if self.pos == start {
                self.advance();
            }
        }
        body
    }

    /// Skips to the next statement boundary: past a `;`, before a `}` that
    /// closes an enclosing block, or before a statement keyword on a new line.
    ///
    /// Brackets the failed statement left open are tracked apart from those
    /// opened while skipping. A newline-led statement keyword ends recovery
    /// whenever no skipped-over bracket is still open, and a `;` does so once
    /// it sits on a later line than the innermost unclosed opener. A `}` only
    /// closes an unclosed `{` or `${`; with none left it belongs to the
    /// enclosing block.
    fn synchronize(&mut self, stmt_start: usize) {
        self.no_in = false;
        let mut unclosed: Vec<(TokenKind, Span)> = Vec::new();
        for token in &self.tokens[stmt_start..self.pos] {
            match token.kind {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket | TokenKind::TemplateExprStart => {
                    unclosed.push((token.kind, token.span))
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    unclosed.pop();
                }
                _ => {}
            }
        }

        let mut skipped = 0usize;
        loop {
            let token = self.current();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon if skipped == 0 => {
                    let boundary = match unclosed.last() {
                        None => true,
                        Some((_, opener)) => opener.line < token.span.line,
                    };
                    if boundary {
                        self.advance();
                        return;
                    }
                }
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket | TokenKind::TemplateExprStart => {
                    skipped += 1
                }
                _ if skipped > 0 && matches!(token.kind, TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket) => {
                    skipped -= 1
                }
                TokenKind::RBrace => {
                    let brace = unclosed
                        .iter()
                        .rposition(|(kind, _)| matches!(kind, TokenKind::LBrace | TokenKind::TemplateExprStart));
                    match brace {
                        Some(index) => unclosed.truncate(index),
                        None => return,
                    }
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    let opener = if token.kind == TokenKind::RParen {
                        TokenKind::LParen
                    } else {
                        TokenKind::LBracket
                    };
                    if unclosed.last().is_some_and(|(kind, _)| *kind == opener) {
                        unclosed.pop();
                    }
                }
                _ => {
                    if skipped == 0 && token.newline_before && starts_statement(token) && self.pos > stmt_start {
                        return;
                    }
                }
            }
            self.advance();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATEMENTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        let peek_kind = self.peek().kind;
        let peek_same_line = !self.peek().newline_before;

        let kind = match self.kind() {
            TokenKind::Keyword(Keyword::Const) if self.peek().is_ident("enum") => {
                self.advance();
                StmtKind::Enum(self.parse_enum(true)?)
            }
            TokenKind::Keyword(Keyword::Var | Keyword::Let | Keyword::Const) => {
                let decl = self.parse_var_decl()?;
                self.consume_semicolon()?;
                StmtKind::Var(decl)
            }
            TokenKind::Keyword(Keyword::Function) => StmtKind::Function(self.parse_function(start, false, true)?),
            TokenKind::Identifier
                if self.at_ident("async") && peek_kind == TokenKind::Keyword(Keyword::Function) && peek_same_line =>
            {
                self.advance();
                StmtKind::Function(self.parse_function(start, true, true)?)
            }
            TokenKind::Identifier if self.at_ident("component") && peek_kind == TokenKind::Identifier && peek_same_line => {
                StmtKind::Component(self.parse_component(start)?)
            }
            TokenKind::Identifier if self.at_ident("interface") && peek_kind == TokenKind::Identifier && peek_same_line => {
                StmtKind::Interface(self.parse_interface()?)
            }
            TokenKind::Identifier if self.at_ident("type") && peek_kind == TokenKind::Identifier && peek_same_line => {
                StmtKind::TypeAlias(self.parse_type_alias()?)
            }
            TokenKind::Identifier if self.at_ident("enum") && peek_kind == TokenKind::Identifier && peek_same_line => {
                StmtKind::Enum(self.parse_enum(false)?)
            }
            TokenKind::Identifier if peek_kind == TokenKind::Colon => {
                let label = self.advance().lexeme;
                self.advance();
                let body = Box::new(self.parse_statement()?);
                StmtKind::Labeled { label, body }
            }
            TokenKind::Keyword(Keyword::Import) if !matches!(peek_kind, TokenKind::LParen | TokenKind::Dot) => {
                StmtKind::Import(self.parse_import()?)
            }
            TokenKind::Keyword(Keyword::Export) => StmtKind::Export(self.parse_export()?),
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Keyword(Keyword::If) => self.parse_if()?,
            TokenKind::Keyword(Keyword::For) => self.parse_for()?,
            TokenKind::Keyword(Keyword::While) => {
                self.advance();
                let test = self.parse_paren_condition()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::While { test, body }
            }
            TokenKind::Keyword(Keyword::Do) => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect(TokenKind::Keyword(Keyword::While), "`while`")?;
                let test = self.parse_paren_condition()?;
                self.eat(TokenKind::Semicolon);
                StmtKind::DoWhile { body, test }
            }
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch()?,
            TokenKind::Keyword(Keyword::Try) => self.parse_try()?,
            TokenKind::Keyword(Keyword::Throw) => {
                self.advance();
                let arg = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Throw(arg)
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let token = self.current();
                let bare = token.newline_before
                    || matches!(token.kind, TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof);
                let arg = if bare { None } else { Some(self.parse_expression()?) };
                self.consume_semicolon()?;
                StmtKind::Return(arg)
            }
            TokenKind::Keyword(kw @ (Keyword::Break | Keyword::Continue)) => {
                self.advance();
                let label = if self.at(TokenKind::Identifier) && !self.current().newline_before {
                    Some(self.advance().lexeme)
                } else {
                    None
                };
                self.consume_semicolon()?;
                if kw == Keyword::Break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            TokenKind::Keyword(Keyword::Debugger) => {
                self.advance();
                self.consume_semicolon()?;
                StmtKind::Debugger
            }
            TokenKind::Keyword(Keyword::Class) => {
                return Err(Box::new(
                    Diagnostic::error(
                        PARSE_UNEXPECTED_TOKEN,
                        "class declarations are not supported",
                        start,
                        Phase::Parser,
                    )
                    .with_suggestion("declare a `component` or a factory function instead"),
                ));
            }
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt {
            kind,
            span: self.span_from(start),
        })
    }

    pub(crate) fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let body = self.parse_statement_list(|t| t.kind == TokenKind::RBrace);
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(body)
    }

    fn parse_paren_condition(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::LParen, "`(`")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(test)
    }

    fn parse_if(&mut self) -> PResult<StmtKind> {
        self.advance();
        let test = self.parse_paren_condition()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(TokenKind::Keyword(Keyword::Else)) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.advance();
        let is_await = self.eat(TokenKind::Keyword(Keyword::Await));
        self.expect(TokenKind::LParen, "`(`")?;

        let mut init = None;
        if !self.at(TokenKind::Semicolon) {
            self.no_in = true;
            let parsed = if matches!(
                self.kind(),
                TokenKind::Keyword(Keyword::Var | Keyword::Let | Keyword::Const)
            ) {
                self.parse_var_decl().map(ForInit::Var)
            } else {
                self.parse_expression().map(ForInit::Expr)
            };
            self.no_in = false;
            let parsed = parsed?;

            let is_in = self.at_keyword(Keyword::In);
            if is_in || self.at_ident("of") {
                let left = self.for_head(parsed)?;
                self.advance();
                let right = if is_in {
                    self.parse_expression()?
                } else {
                    self.parse_assignment()?
                };
                self.expect(TokenKind::RParen, "`)`")?;
                let body = Box::new(self.parse_statement()?);
                return Ok(if is_in {
                    StmtKind::ForIn { left, right, body }
                } else {
                    StmtKind::ForOf {
                        left,
                        right,
                        body,
                        is_await,
                    }
                });
            }
            init = Some(parsed);
        }

        self.expect(TokenKind::Semicolon, "`;`")?;
        let test = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "`;`")?;
        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen, "`)`")?;
        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    fn for_head(&mut self, init: ForInit) -> PResult<ForHead> {
        match init {
            ForInit::Var(mut decl) => {
                let single = decl.declarators.len() == 1 && decl.declarators[0].init.is_none();
                match decl.declarators.pop() {
                    Some(declarator) if single => Ok(ForHead::Var(decl.kind, declarator.pattern)),
                    _ => Err(self.expected("a single binding without initializer")),
                }
            }
            ForInit::Expr(expr) => {
                let assignable = matches!(
                    expr.unwrapped().kind,
                    ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Array(_) | ExprKind::Object(_)
                );
                if assignable {
                    Ok(ForHead::Target(expr))
                } else {
                    Err(self.invalid_target(expr.span))
                }
            }
        }
    }

    fn parse_switch(&mut self) -> PResult<StmtKind> {
        self.advance();
        let discriminant = self.parse_paren_condition()?;
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut cases = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let start = self.current().span;
            let test = if self.eat(TokenKind::Keyword(Keyword::Case)) {
                Some(self.parse_expression()?)
            } else if self.eat(TokenKind::Keyword(Keyword::Default)) {
                None
            } else {
                return Err(self.expected("`case`, `default` or `}`"));
            };
            self.expect(TokenKind::Colon, "`:`")?;
            let body = self.parse_statement_list(|t| {
                matches!(
                    t.kind,
                    TokenKind::RBrace
                        | TokenKind::Keyword(Keyword::Case)
                        | TokenKind::Keyword(Keyword::Default)
                )
            });
            cases.push(SwitchCase {
                test,
                body,
                span: self.span_from(start),
            });
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(StmtKind::Switch { discriminant, cases })
    }

    fn parse_try(&mut self) -> PResult<StmtKind> {
        self.advance();
        let block = self.parse_block()?;
        let handler = if self.at_keyword(Keyword::Catch) {
            let start = self.advance().span;
            let param = if self.eat(TokenKind::LParen) {
                let pattern = self.parse_binding_pattern()?;
                if self.eat(TokenKind::Colon) {
                    self.parse_type()?;
                }
                self.expect(TokenKind::RParen, "`)`")?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(start),
            })
        } else {
            None
        };
        let finalizer = if self.eat(TokenKind::Keyword(Keyword::Finally)) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.expected("`catch` or `finally`"));
        }
        Ok(StmtKind::Try {
            block,
            handler,
            finalizer,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DECLARATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let kind = match self.advance().kind {
            TokenKind::Keyword(Keyword::Var) => VarKind::Var,
            TokenKind::Keyword(Keyword::Let) => VarKind::Let,
            _ => VarKind::Const,
        };
        let mut declarators = Vec::new();
        loop {
            let start = self.current().span;
            let pattern = self.parse_binding_pattern()?;
            self.eat(TokenKind::Bang);
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(VarDeclarator {
                pattern,
                type_annotation,
                init,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(VarDecl { kind, declarators })
    }

    pub(crate) fn parse_function(&mut self, start: Span, is_async: bool, require_name: bool) -> PResult<Function> {
        self.expect(TokenKind::Keyword(Keyword::Function), "`function`")?;
        let is_generator = self.eat(TokenKind::Star);
        let name = if self.at(TokenKind::Identifier) {
            Some(self.advance().lexeme)
        } else if require_name {
            return Err(self.expected("a function name"));
        } else {
            None
        };
        self.parse_function_rest(start, name, is_async, is_generator)
    }

    /// Everything after the name: type parameters, parameters, return type, body.
    pub(crate) fn parse_function_rest(
        &mut self,
        start: Span,
        name: Option<String>,
        is_async: bool,
        is_generator: bool,
    ) -> PResult<Function> {
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Function {
            name,
            type_params,
            params,
            return_type,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    fn parse_component(&mut self, start: Span) -> PResult<Function> {
        self.expect_contextual("component")?;
        let name = self.expect_ident("a component name")?.lexeme;
        self.parse_function_rest(start, Some(name), false, false)
    }

    pub(crate) fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen, "`(`")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) {
            let start = self.current().span;
            let rest = self.eat(TokenKind::DotDotDot);
            let mut pattern = self.parse_binding_pattern()?;
            let optional = self.eat(TokenKind::Question);
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            if self.eat(TokenKind::Eq) {
                let default = self.parse_assignment()?;
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
                type_annotation,
                optional,
                rest,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        self.no_in = saved;
        Ok(params)
    }

    fn parse_interface(&mut self) -> PResult<InterfaceDecl> {
        self.expect_contextual("interface")?;
        let name = self.expect_ident("an interface name")?.lexeme;
        let type_params = self.parse_type_params()?;
        let extends = if self.eat(TokenKind::Keyword(Keyword::Extends)) {
            let mut parents = vec![self.parse_type()?];
            while self.eat(TokenKind::Comma) {
                parents.push(self.parse_type()?);
            }
            Some(parents.join(", "))
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "`{`")?;
        let body = self.capture_until_close(TokenKind::LBrace, TokenKind::RBrace)?;
        Ok(InterfaceDecl {
            name,
            type_params,
            extends,
            body,
        })
    }

    fn parse_type_alias(&mut self) -> PResult<TypeAliasDecl> {
        self.expect_contextual("type")?;
        let name = self.expect_ident("a type name")?.lexeme;
        let type_params = self.parse_type_params()?;
        self.expect(TokenKind::Eq, "`=`")?;
        let value = self.parse_type()?;
        self.consume_semicolon()?;
        Ok(TypeAliasDecl {
            name,
            type_params,
            value,
        })
    }

    fn parse_enum(&mut self, is_const: bool) -> PResult<EnumDecl> {
        self.expect_contextual("enum")?;
        let name = self.expect_ident("an enum name")?.lexeme;
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let token = self.current().clone();
            let member_name = match token.kind {
                TokenKind::Identifier | TokenKind::Keyword(_) => token.lexeme.clone(),
                TokenKind::String => cook_string_literal(&token.lexeme),
                _ => return Err(self.expected("an enum member")),
            };
            self.advance();
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            members.push(EnumMember {
                name: member_name,
                init,
                span: self.span_from(token.span),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(EnumDecl {
            name,
            is_const,
            members,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MODULES
    // ═══════════════════════════════════════════════════════════════════════════

    fn parse_import(&mut self) -> PResult<ImportDecl> {
        self.expect(TokenKind::Keyword(Keyword::Import), "`import`")?;
        let mut decl = ImportDecl {
            default: None,
            namespace: None,
            named: Vec::new(),
            source: String::new(),
            type_only: false,
        };

        if self.at(TokenKind::String) {
            decl.source = cook_string_literal(&self.advance().lexeme);
            self.consume_semicolon()?;
            return Ok(decl);
        }

        if self.at_ident("type") {
            let next = self.peek();
            let is_modifier = matches!(next.kind, TokenKind::LBrace | TokenKind::Star)
                || (next.kind == TokenKind::Identifier && next.lexeme != "from");
            if is_modifier {
                self.advance();
                decl.type_only = true;
            }
        }

        let mut needs_clause = true;
        if self.at(TokenKind::Identifier) && !self.at_ident("from") {
            let token = self.advance();
            decl.default = Some(Binding {
                name: token.lexeme,
                span: token.span,
            });
            needs_clause = self.eat(TokenKind::Comma);
        }

        if needs_clause {
            if self.eat(TokenKind::Star) {
                self.expect_contextual("as")?;
                let token = self.expect_ident("a namespace name")?;
                decl.namespace = Some(Binding {
                    name: token.lexeme,
                    span: token.span,
                });
            } else if self.at(TokenKind::LBrace) {
                decl.named = self.parse_import_specifiers()?;
            } else if decl.default.is_none() {
                return Err(self.expected("an import clause"));
            }
        }

        self.expect_contextual("from")?;
        decl.source = cook_string_literal(&self.expect(TokenKind::String, "a module path")?.lexeme);
        self.skip_import_attributes()?;
        self.consume_semicolon()?;
        Ok(decl)
    }

    fn parse_import_specifiers(&mut self) -> PResult<Vec<ImportSpecifier>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let type_only = self.at_ident("type")
                && matches!(
                    self.peek().kind,
                    TokenKind::Identifier | TokenKind::Keyword(_) | TokenKind::String
                )
                && !self.peek().is_ident("as");
            if type_only {
                self.advance();
            }
            let token = self.advance();
            let imported = match token.kind {
                TokenKind::Identifier | TokenKind::Keyword(_) => token.lexeme.clone(),
                TokenKind::String => cook_string_literal(&token.lexeme),
                _ => return Err(self.expected("an import name")),
            };
            let local = if self.eat_ident("as") {
                let local = self.expect_ident("a local name")?;
                Binding {
                    name: local.lexeme,
                    span: local.span,
                }
            } else if token.kind == TokenKind::Identifier {
                Binding {
                    name: imported.clone(),
                    span: token.span,
                }
            } else {
                return Err(self.expected("`as`"));
            };
            specifiers.push(ImportSpecifier {
                imported,
                local,
                type_only,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        Ok(specifiers)
    }

    /// `with { type: "json" }` carries no meaning for the compiler.
    fn skip_import_attributes(&mut self) -> PResult<()> {
        let attrs = (self.at_ident("with") || self.at_ident("assert"))
            && self.peek().kind == TokenKind::LBrace
            && !self.current().newline_before;
        if attrs {
            self.advance();
            self.advance();
            self.capture_until_close(TokenKind::LBrace, TokenKind::RBrace)?;
        }
        Ok(())
    }

    fn parse_export(&mut self) -> PResult<ExportDecl> {
        self.expect(TokenKind::Keyword(Keyword::Export), "`export`")?;

        if self.at_keyword(Keyword::Default) {
            self.advance();
            let start = self.current().span;
            let kind = if self.at_keyword(Keyword::Function) {
                StmtKind::Function(self.parse_function(start, false, false)?)
            } else if self.at_ident("async") && self.peek().kind == TokenKind::Keyword(Keyword::Function) {
                self.advance();
                StmtKind::Function(self.parse_function(start, true, false)?)
            } else if self.at_ident("component") && self.peek().kind == TokenKind::Identifier {
                StmtKind::Component(self.parse_component(start)?)
            } else {
                let expr = self.parse_assignment()?;
                self.consume_semicolon()?;
                StmtKind::Expr(expr)
            };
            return Ok(ExportDecl::Default(Box::new(Stmt {
                kind,
                span: self.span_from(start),
            })));
        }

        if self.eat(TokenKind::Star) {
            let alias = if self.eat_ident("as") {
                let token = self.advance();
                match token.kind {
                    TokenKind::Identifier | TokenKind::Keyword(_) => Some(token.lexeme),
                    TokenKind::String => Some(cook_string_literal(&token.lexeme)),
                    _ => return Err(self.expected("a namespace name")),
                }
            } else {
                None
            };
            self.expect_contextual("from")?;
            let source = cook_string_literal(&self.expect(TokenKind::String, "a module path")?.lexeme);
            self.consume_semicolon()?;
            return Ok(ExportDecl::All { alias, source });
        }

        let type_only = self.at_ident("type") && self.peek().kind == TokenKind::LBrace;
        if type_only {
            self.advance();
        }
        if self.at(TokenKind::LBrace) {
            return self.parse_export_named(type_only);
        }

        let stmt = self.parse_statement()?;
        match stmt.kind {
            StmtKind::Var(_)
            | StmtKind::Function(_)
            | StmtKind::Component(_)
            | StmtKind::Interface(_)
            | StmtKind::TypeAlias(_)
            | StmtKind::Enum(_) => Ok(ExportDecl::Declaration(Box::new(stmt))),
            _ => Err(Box::new(Diagnostic::error(
                PARSE_UNEXPECTED_TOKEN,
                "only declarations can be exported",
                stmt.span,
                Phase::Parser,
            ))),
        }
    }

    fn parse_export_named(&mut self, type_only: bool) -> PResult<ExportDecl> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let spec_type_only = self.at_ident("type")
                && matches!(self.peek().kind, TokenKind::Identifier | TokenKind::Keyword(_))
                && !self.peek().is_ident("as");
            if spec_type_only {
                self.advance();
            }
            let token = self.advance();
            let local = export_name(&token).ok_or_else(|| self.expected("an export name"))?;
            let exported = if self.eat_ident("as") {
                let token = self.advance();
                export_name(&token).ok_or_else(|| self.expected("an export name"))?
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier {
                local,
                exported,
                type_only: type_only || spec_type_only,
                span: self.span_from(token.span),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`")?;
        let source = if self.eat_ident("from") {
            Some(cook_string_literal(&self.expect(TokenKind::String, "a module path")?.lexeme))
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ExportDecl::Named {
            specifiers,
            source,
            type_only,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BINDING PATTERNS
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_binding_pattern(&mut self) -> PResult<Pattern> {
        let start = self.current().span;
        match self.kind() {
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Pattern {
                    kind: PatternKind::Ident(token.lexeme),
                    span: token.span,
                })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                let mut rest = None;
                while !self.at(TokenKind::RBracket) {
                    if self.eat(TokenKind::Comma) {
                        elements.push(None);
                        continue;
                    }
                    if self.eat(TokenKind::DotDotDot) {
                        rest = Some(Box::new(self.parse_binding_pattern()?));
                        self.eat(TokenKind::Comma);
                        break;
                    }
                    elements.push(Some(self.parse_binding_element()?));
                    if !self.at(TokenKind::RBracket) {
                        self.expect(TokenKind::Comma, "`,`")?;
                    }
                }
                self.expect(TokenKind::RBracket, "`]`")?;
                Ok(Pattern {
                    kind: PatternKind::Array { elements, rest },
                    span: self.span_from(start),
                })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut props = Vec::new();
                let mut rest = None;
                while !self.at(TokenKind::RBrace) {
                    let prop_start = self.current().span;
                    if self.eat(TokenKind::DotDotDot) {
                        rest = Some(Box::new(self.parse_binding_pattern()?));
                        self.eat(TokenKind::Comma);
                        break;
                    }
                    let key_is_ident = self.at(TokenKind::Identifier);
                    let key = self.parse_property_key()?;
                    let (value, shorthand) = if self.eat(TokenKind::Colon) {
                        (self.parse_binding_element()?, false)
                    } else {
                        let name = match (&key, key_is_ident) {
                            (PropKey::Ident(name), true) => name.clone(),
                            _ => return Err(self.expected("`:`")),
                        };
                        let mut value = Pattern {
                            kind: PatternKind::Ident(name),
                            span: prop_start,
                        };
                        if self.eat(TokenKind::Eq) {
                            let default = self.parse_assignment()?;
                            value = Pattern {
                                span: prop_start.to(default.span),
                                kind: PatternKind::Assign {
                                    target: Box::new(value),
                                    default: Box::new(default),
                                },
                            };
                        }
                        (value, true)
                    };
                    props.push(ObjectPatternProp {
                        key,
                        value,
                        shorthand,
                        span: self.span_from(prop_start),
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "`}`")?;
                Ok(Pattern {
                    kind: PatternKind::Object { props, rest },
                    span: self.span_from(start),
                })
            }
            _ => Err(self.invalid_target(start)),
        }
    }

    fn parse_binding_element(&mut self) -> PResult<Pattern> {
        let target = self.parse_binding_pattern()?;
        if !self.eat(TokenKind::Eq) {
            return Ok(target);
        }
        let default = self.parse_assignment()?;
        Ok(Pattern {
            span: target.span.to(default.span),
            kind: PatternKind::Assign {
                target: Box::new(target),
                default: Box::new(default),
            },
        })
    }

    pub(crate) fn parse_property_key(&mut self) -> PResult<PropKey> {
        let token = self.current().clone();
        let key = match token.kind {
            TokenKind::Identifier | TokenKind::Keyword(_) => PropKey::Ident(token.lexeme),
            TokenKind::String => PropKey::String(cook_string_literal(&token.lexeme)),
            TokenKind::Number => PropKey::Number(token.lexeme),
            TokenKind::LBracket => {
                self.advance();
                let expr = self.parse_assignment()?;
                self.expect(TokenKind::RBracket, "`]`")?;
                return Ok(PropKey::Computed(Box::new(expr)));
            }
            _ => return Err(self.expected("a property name")),
        };
        self.advance();
        Ok(key)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TYPE TEXT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Captures a type annotation as opaque text. Brackets are balanced; at the
    /// outermost level the type ends at the first token that cannot continue it.
    pub(crate) fn parse_type(&mut self) -> PResult<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut prev: Option<TokenKind> = None;

        loop {
            let token = self.current();
            let kind = token.kind;
            if kind == TokenKind::Eof {
                break;
            }
            if depth == 0 {
                if let Some(p) = prev {
                    let continues_line = matches!(
                        kind,
                        TokenKind::Pipe | TokenKind::Amp | TokenKind::Dot | TokenKind::Arrow
                    );
                    if token.newline_before && !expects_type_operand(p) && !continues_line {
                        break;
                    }
                }
                let expecting = prev.map_or(true, expects_type_operand);
                let continues = match kind {
                    TokenKind::Identifier
                    | TokenKind::String
                    | TokenKind::Number
                    | TokenKind::Dot
                    | TokenKind::Pipe
                    | TokenKind::Amp
                    | TokenKind::Arrow
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::Lt => true,
                    TokenKind::Keyword(kw) => !matches!(kw, Keyword::In | Keyword::Instanceof),
                    TokenKind::LBrace | TokenKind::Minus => expecting,
                    _ => false,
                };
                if !continues {
                    break;
                }
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::Lt => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::Gt => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::GtGt | TokenKind::GtGtGt => {
                    let closes = if kind == TokenKind::GtGt { 2 } else { 3 };
                    if depth < closes {
                        break;
                    }
                    depth -= closes;
                }
                _ => {}
            }
            if !text.is_empty() && token.space_before {
                text.push(' ');
            }
            text.push_str(&token.lexeme);
            prev = Some(kind);
            self.advance();
        }

        if text.is_empty() {
            Err(self.expected("a type"))
        } else {
            Ok(text)
        }
    }

    /// `<T, U extends X>` after a declaration name.
    fn parse_type_params(&mut self) -> PResult<Option<String>> {
        if !self.at(TokenKind::Lt) {
            return Ok(None);
        }
        self.advance();
        let inner = self.capture_until_close(TokenKind::Lt, TokenKind::Gt)?;
        Ok(Some(format!("<{}>", inner)))
    }

    /// Collects token text up to the closer matching an already-consumed
    /// opener, consuming the closer.
    fn capture_until_close(&mut self, open: TokenKind, close: TokenKind) -> PResult<String> {
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            let token = self.current();
            if token.kind == TokenKind::Eof {
                return Err(self.expected(&format!("closing {}", describe_kind(close))));
            }
            if token.kind == close {
                if depth == 0 {
                    self.advance();
                    return Ok(text);
                }
                depth -= 1;
            } else if token.kind == open {
                depth += 1;
            }
            if !text.is_empty() && token.space_before {
                text.push(' ');
            }
            text.push_str(&token.lexeme);
            self.advance();
        }
    }

    pub(crate) fn invalid_target(&self, span: Span) -> Box<Diagnostic> {
        Box::new(Diagnostic::error(
            PARSE_INVALID_TARGET,
            "invalid assignment or binding target",
            span,
            Phase::Parser,
        ))
    }
}

fn expects_type_operand(prev: TokenKind) -> bool {
    matches!(
        prev,
        TokenKind::Pipe
            | TokenKind::Amp
            | TokenKind::Arrow
            | TokenKind::Lt
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::Question
            | TokenKind::Dot
    )
}

fn starts_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Keyword(kw) => matches!(
            kw,
            Keyword::Var
                | Keyword::Let
                | Keyword::Const
                | Keyword::Function
                | Keyword::If
                | Keyword::For
                | Keyword::While
                | Keyword::Do
                | Keyword::Return
                | Keyword::Switch
                | Keyword::Try
                | Keyword::Throw
                | Keyword::Break
                | Keyword::Continue
                | Keyword::Import
                | Keyword::Export
                | Keyword::Class
                | Keyword::Debugger
        ),
        TokenKind::Identifier => matches!(token.lexeme.as_str(), "component" | "interface" | "enum"),
        _ => false,
    }
}

fn export_name(token: &Token) -> Option<String> {
    match token.kind {
        TokenKind::Identifier | TokenKind::Keyword(_) => Some(token.lexeme.clone()),
        TokenKind::String => Some(cook_string_literal(&token.lexeme)),
        _ => None,
    }
}

fn describe_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::JsxText => "markup text".to_string(),
        _ => format!("`{}`", token.lexeme),
    }
}

fn describe_kind(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::RBrace => "`}`",
        TokenKind::Gt => "`>`",
        TokenKind::RParen => "`)`",
        TokenKind::RBracket => "`]`",
        _ => "delimiter",
    }
}
