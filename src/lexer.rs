//! Context-sensitive tokenizer.
//!
//! The lexer keeps an explicit stack of lexical contexts. The frame on top
//! decides what `<`, `{`, `}`, quotes and backticks mean:
//!
//! - **Code**: ordinary expression/statement text. `<` opens an element only
//!   where an operand may start; `}` closes the frame when it was opened by a
//!   markup `{`, a shorthand `@{` or a template `${`.
//! - **Tag**: between `<` and `>`/`/>`, producing names, `=`, attribute strings.
//! - **Children**: between an opening tag and its closing tag, producing raw text.
//! - **Template**: inside backticks; each `${` pushes a fresh Code frame.
//!
//! Malformed input never aborts tokenization: an `Error` token carrying its
//! diagnostic is emitted and lexing resumes. The main loop is bounded by an
//! iteration cap so the stream always ends with `Eof`.

use crate::diagnostics::{
    Diagnostic, Phase, LEX_INVALID_CHARACTER, LEX_ITERATION_CAP, LEX_UNTERMINATED_COMMENT,
    LEX_UNTERMINATED_ELEMENT, LEX_UNTERMINATED_REGEX, LEX_UNTERMINATED_STRING,
    LEX_UNTERMINATED_TEMPLATE,
};
use crate::span::Span;
use crate::token::{Keyword, Token, TokenKind, PUNCTUATORS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeRegion {
    Root,
    Markup,
    Template,
}

#[derive(Debug, Clone)]
enum Context {
    Code { region: CodeRegion, brace_depth: u32 },
    Tag { closing: bool, name: Option<String>, open: Span },
    Children { name: String, open: Span },
    Template { open: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Tag,
    Children,
    Template,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
    column: u32,
}

/// Tokenizes one compilation unit. The result always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    stack: Vec<Context>,
    tokens: Vec<Token>,
    newline_before: bool,
    space_before: bool,
    last_kind: Option<TokenKind>,
    iteration_cap: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            stack: vec![Context::Code {
                region: CodeRegion::Root,
                brace_depth: 0,
            }],
            tokens: Vec::new(),
            newline_before: false,
            space_before: false,
            last_kind: None,
            iteration_cap: src.len().saturating_mul(4) + 64,
        }
    }

    /// Overrides the iteration bound. Only useful to exercise the cap itself.
    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = cap;
        self
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut steps = 0usize;
        while !self.at_end() {
            steps += 1;
            if steps > self.iteration_cap {
                let mark = self.mark();
                while self.bump().is_some() {}
                self.push_error(
                    LEX_ITERATION_CAP,
                    "tokenization stopped after reaching its iteration cap".to_string(),
                    mark,
                );
                break;
            }
            match self.mode() {
                Mode::Code => self.lex_code(),
                Mode::Tag => self.lex_tag(),
                Mode::Children => self.lex_children(),
                Mode::Template => self.lex_template(),
            }
        }
        self.close_unterminated();
        let mark = self.mark();
        self.push_token(TokenKind::Eof, mark);
        self.tokens
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CURSOR
    // ═══════════════════════════════════════════════════════════════════════════

    fn mode(&self) -> Mode {
        match self.stack.last() {
            Some(Context::Tag { .. }) => Mode::Tag,
            Some(Context::Children { .. }) => Mode::Children,
            Some(Context::Template { .. }) => Mode::Template,
            Some(Context::Code { .. }) | None => Mode::Code,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn span_from(&self, mark: Mark) -> Span {
        Span::new(mark.pos as u32, self.pos as u32, mark.line, mark.column)
    }

    fn push_token(&mut self, kind: TokenKind, mark: Mark) {
        let span = self.span_from(mark);
        self.tokens.push(Token {
            kind,
            lexeme: self.src[mark.pos..self.pos].to_string(),
            span,
            newline_before: self.newline_before,
            space_before: self.space_before,
            diagnostic: None,
        });
        self.newline_before = false;
        self.space_before = false;
        self.last_kind = Some(kind);
    }

    fn push_error(&mut self, code: &str, message: String, mark: Mark) {
        let span = self.span_from(mark);
        self.push_error_at(code, message, mark, span);
    }

    fn push_error_at(&mut self, code: &str, message: String, mark: Mark, location: Span) {
        let span = self.span_from(mark);
        self.tokens.push(Token {
            kind: TokenKind::Error,
            lexeme: self.src[mark.pos..self.pos].to_string(),
            span,
            newline_before: self.newline_before,
            space_before: self.space_before,
            diagnostic: Some(Box::new(Diagnostic::error(code, message, location, Phase::Lexer))),
        });
        self.newline_before = false;
        self.space_before = false;
    }

    fn markup_allowed(&self) -> bool {
        let opens = matches!(self.peek_nth(1), Some(c) if c == '>' || is_ident_start(c));
        opens && !self.last_kind.is_some_and(TokenKind::ends_value)
    }

    fn regex_allowed(&self) -> bool {
        !self.last_kind.is_some_and(TokenKind::ends_value)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CODE CONTEXT
    // ═══════════════════════════════════════════════════════════════════════════

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                self.newline_before = true;
                self.space_before = true;
                self.bump();
            } else if c.is_whitespace() || c == '\u{FEFF}' {
                self.space_before = true;
                self.bump();
            } else if self.rest().starts_with("//") || (self.pos == 0 && self.rest().starts_with("#!")) {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                self.space_before = true;
            } else if self.rest().starts_with("/*") {
                let mark = self.mark();
                self.bump_n(2);
                let mut closed = false;
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        self.newline_before = true;
                    }
                    if c == '*' && self.peek() == Some('/') {
                        self.bump();
                        closed = true;
                        break;
                    }
                }
                self.space_before = true;
                if !closed {
                    self.push_error(LEX_UNTERMINATED_COMMENT, "unterminated block comment".to_string(), mark);
                }
            } else {
                break;
            }
        }
    }

    fn lex_code(&mut self) {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return;
        };
        let mark = self.mark();
        match c {
            c if is_ident_start(c) => self.lex_identifier(mark),
            '0'..='9' => self.lex_number(mark),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(mark),
            '"' | '\'' => self.lex_string(mark, c),
            '`' => {
                self.bump();
                self.push_token(TokenKind::TemplateStart, mark);
                let open = self.span_from(mark);
                self.stack.push(Context::Template { open });
            }
            '<' if self.markup_allowed() => {
                self.bump();
                self.push_token(TokenKind::TagOpen, mark);
                let open = self.span_from(mark);
                self.stack.push(Context::Tag {
                    closing: false,
                    name: None,
                    open,
                });
            }
            '/' if self.regex_allowed() => self.lex_regex(mark),
            '{' => {
                self.bump();
                if let Some(Context::Code { brace_depth, .. }) = self.stack.last_mut() {
                    *brace_depth += 1;
                }
                self.push_token(TokenKind::LBrace, mark);
            }
            '}' => {
                self.bump();
                let close_frame = match self.stack.last_mut() {
                    Some(Context::Code { brace_depth, region }) => {
                        if *brace_depth > 0 {
                            *brace_depth -= 1;
                            false
                        } else {
                            *region != CodeRegion::Root
                        }
                    }
                    _ => false,
                };
                if close_frame && self.stack.len() > 1 {
                    self.stack.pop();
                }
                self.push_token(TokenKind::RBrace, mark);
            }
            _ => self.lex_punctuator(mark, c),
        }
    }

    fn lex_identifier(&mut self, mark: Mark) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.src[mark.pos..self.pos];
        let after_dot = matches!(self.last_kind, Some(TokenKind::Dot | TokenKind::QuestionDot));
        let kind = match Keyword::from_ident(text) {
            Some(kw) if !after_dot => TokenKind::Keyword(kw),
            _ => TokenKind::Identifier,
        };
        self.push_token(kind, mark);
    }

    fn lex_number(&mut self, mark: Mark) {
        let radix_prefix = self.peek() == Some('0')
            && matches!(self.peek_nth(1), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O'));
        if radix_prefix {
            self.bump_n(2);
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.bump();
            }
        } else {
            self.eat_digits();
            if self.peek() == Some('.') {
                self.bump();
                self.eat_digits();
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let signed = matches!(self.peek_nth(1), Some('+' | '-'));
                let digit_at = if signed { 2 } else { 1 };
                if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    self.bump_n(digit_at);
                    self.eat_digits();
                }
            }
        }
        if self.peek() == Some('n') {
            self.bump();
        }
        self.push_token(TokenKind::Number, mark);
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn lex_string(&mut self, mark: Mark, quote: char) {
        self.bump();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.push_error(LEX_UNTERMINATED_STRING, "unterminated string literal".to_string(), mark);
                    return;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek() == Some('\r') {
                        self.bump();
                    }
                    self.bump();
                }
                Some(c) if c == quote => {
                    self.bump();
                    self.push_token(TokenKind::String, mark);
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn lex_regex(&mut self, mark: Mark) {
        self.bump();
        let mut in_class = false;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.push_error(
                        LEX_UNTERMINATED_REGEX,
                        "unterminated regular expression literal".to_string(),
                        mark,
                    );
                    return;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.bump();
                }
                Some(']') => {
                    in_class = false;
                    self.bump();
                }
                Some('/') if !in_class => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        self.push_token(TokenKind::Regex, mark);
    }

    fn lex_punctuator(&mut self, mark: Mark, c: char) {
        let rest = self.rest();
        let matched = PUNCTUATORS.iter().find(|(text, _)| rest.starts_with(text)).copied();
        match matched {
            Some(("?.", _)) if self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()) => {
                self.bump();
                self.push_token(TokenKind::Question, mark);
            }
            Some((text, kind)) => {
                self.bump_n(text.chars().count());
                self.push_token(kind, mark);
            }
            None => {
                self.bump();
                self.push_error(LEX_INVALID_CHARACTER, format!("invalid character '{}'", c), mark);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MARKUP CONTEXTS
    // ═══════════════════════════════════════════════════════════════════════════

    fn lex_tag(&mut self) {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return;
        };
        let mark = self.mark();
        match c {
            '>' => {
                self.bump();
                self.push_token(TokenKind::TagClose, mark);
                if let Some(Context::Tag { closing, name, open }) = self.stack.pop() {
                    if closing {
                        if matches!(self.stack.last(), Some(Context::Children { .. })) {
                            self.stack.pop();
                        }
                    } else {
                        self.stack.push(Context::Children {
                            name: name.unwrap_or_default(),
                            open,
                        });
                    }
                }
            }
            '/' if self.peek_nth(1) == Some('>') => {
                self.bump_n(2);
                self.stack.pop();
                self.push_token(TokenKind::TagSelfClose, mark);
            }
            '{' => {
                self.bump();
                self.push_token(TokenKind::LBrace, mark);
                self.stack.push(Context::Code {
                    region: CodeRegion::Markup,
                    brace_depth: 0,
                });
            }
            '@' if self.peek_nth(1) == Some('{') => self.lex_shorthand_open(mark),
            '"' | '\'' => self.lex_attribute_string(mark, c),
            '=' => {
                self.bump();
                self.push_token(TokenKind::Eq, mark);
            }
            c if is_ident_start(c) => {
                while self.peek().is_some_and(|c| is_ident_continue(c) || matches!(c, '-' | ':' | '.')) {
                    self.bump();
                }
                let text = self.src[mark.pos..self.pos].to_string();
                if let Some(Context::Tag { name, .. }) = self.stack.last_mut() {
                    if name.is_none() {
                        *name = Some(text);
                    }
                }
                self.push_token(TokenKind::JsxName, mark);
            }
            _ => {
                self.bump();
                self.push_error(LEX_INVALID_CHARACTER, format!("invalid character '{}' in tag", c), mark);
            }
        }
    }

    fn lex_shorthand_open(&mut self, mark: Mark) {
        self.bump_n(2);
        self.push_token(TokenKind::ShorthandOpen, mark);
        self.stack.push(Context::Code {
            region: CodeRegion::Markup,
            brace_depth: 0,
        });
    }

    fn lex_attribute_string(&mut self, mark: Mark, quote: char) {
        self.bump();
        loop {
            match self.bump() {
                None => {
                    self.push_error(LEX_UNTERMINATED_STRING, "unterminated attribute string".to_string(), mark);
                    return;
                }
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        self.push_token(TokenKind::JsxString, mark);
    }

    fn lex_children(&mut self) {
        let Some(c) = self.peek() else {
            return;
        };
        let mark = self.mark();
        match c {
            '<' => {
                let closing = self.peek_nth(1) == Some('/');
                if closing {
                    self.bump_n(2);
                    self.push_token(TokenKind::TagEndOpen, mark);
                } else {
                    self.bump();
                    self.push_token(TokenKind::TagOpen, mark);
                }
                let open = self.span_from(mark);
                self.stack.push(Context::Tag {
                    closing,
                    name: None,
                    open,
                });
            }
            '{' => {
                self.bump();
                self.push_token(TokenKind::LBrace, mark);
                self.stack.push(Context::Code {
                    region: CodeRegion::Markup,
                    brace_depth: 0,
                });
            }
            '@' if self.peek_nth(1) == Some('{') => self.lex_shorthand_open(mark),
            _ => {
                while let Some(c) = self.peek() {
                    if c == '<' || c == '{' || (c == '@' && self.peek_nth(1) == Some('{')) {
                        break;
                    }
                    self.bump();
                }
                self.push_token(TokenKind::JsxText, mark);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TEMPLATE CONTEXT
    // ═══════════════════════════════════════════════════════════════════════════

    fn lex_template(&mut self) {
        let Some(c) = self.peek() else {
            return;
        };
        let mark = self.mark();
        match c {
            '`' => {
                self.bump();
                self.stack.pop();
                self.push_token(TokenKind::TemplateEnd, mark);
            }
            '$' if self.peek_nth(1) == Some('{') => {
                self.bump_n(2);
                self.push_token(TokenKind::TemplateExprStart, mark);
                self.stack.push(Context::Code {
                    region: CodeRegion::Template,
                    brace_depth: 0,
                });
            }
            _ => {
                while let Some(c) = self.peek() {
                    match c {
                        '`' => break,
                        '$' if self.peek_nth(1) == Some('{') => break,
                        '\\' => {
                            self.bump();
                            self.bump();
                        }
                        _ => {
                            self.bump();
                        }
                    }
                }
                self.push_token(TokenKind::TemplateChunk, mark);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // END OF INPUT
    // ═══════════════════════════════════════════════════════════════════════════

    fn close_unterminated(&mut self) {
        while self.stack.len() > 1 {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            let mark = self.mark();
            match frame {
                Context::Template { open } => {
                    self.push_error_at(
                        LEX_UNTERMINATED_TEMPLATE,
                        "unterminated template literal".to_string(),
                        mark,
                        open,
                    );
                }
                Context::Tag { name, open, closing } => {
                    let what = if closing { "closing tag" } else { "element" };
                    self.push_error_at(
                        LEX_UNTERMINATED_ELEMENT,
                        format!("unterminated {} <{}>", what, name.unwrap_or_default()),
                        mark,
                        open,
                    );
                }
                Context::Children { name, open } => {
                    self.push_error_at(
                        LEX_UNTERMINATED_ELEMENT,
                        format!("element <{}> is never closed", name),
                        mark,
                        open,
                    );
                }
                Context::Code { .. } => {}
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '\u{200C}' || c == '\u{200D}' || (!c.is_ascii() && c.is_alphanumeric())
}
