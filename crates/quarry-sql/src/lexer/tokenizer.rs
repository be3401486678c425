//! Hand-written SQL tokenizer.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
///
/// Whitespace and comments never reach the token stream, and the stream
/// produced by [`Lexer::tokenize`] always ends with a single [`TokenKind::Eof`].
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position.
    pos: usize,
    /// Byte position of the start of the current token.
    start: usize,
    /// 1-based line of `pos`.
    line: u32,
    /// Byte offset where the current line begins.
    line_start: usize,
    /// Line and column captured at `start`.
    token_line: u32,
    token_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            line: 1,
            line_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    /// Rewinds to the start of the current token (which never spans a newline
    /// at the point this is called).
    fn rewind_to_start(&mut self) {
        self.pos = self.start;
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(self.start, self.pos),
            self.token_line,
            self.token_column,
        )
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.make_token(TokenKind::Error(message.into()))
    }

    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(String::from(text))),
        }
    }

    /// Scans `"name"`, `` `name` `` or `[name]`; doubled closing quotes escape.
    fn scan_quoted_identifier(&mut self, open: char, close: char) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek() {
                Some(c) if c == close => {
                    if open == close && self.peek_next() == Some(close) {
                        value.push(close);
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return self.error("Unterminated quoted identifier"),
            }
        }

        self.advance();
        self.make_token(TokenKind::Identifier(value))
    }

    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.error(format!("Invalid float: {e}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                // Out of i64 range; keep the value as a float so the literal
                // text still reaches the AST.
                Err(_) => match text.parse::<f64>() {
                    Ok(f) => self.make_token(TokenKind::Float(f)),
                    Err(e) => self.error(format!("Invalid integer: {e}")),
                },
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    if self.peek_next() == Some('\'') {
                        value.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return self.error("Unterminated string literal"),
            }
        }

        self.advance();
        self.make_token(TokenKind::String(value))
    }

    /// Scans `X'..'`.
    fn scan_blob(&mut self) -> Token {
        self.advance();
        self.advance();

        let mut bytes = Vec::new();
        let mut pending: Option<u32> = None;

        loop {
            match self.peek() {
                Some('\'') => break,
                Some(c) if c.is_ascii_hexdigit() => {
                    self.advance();
                    let digit = c.to_digit(16).unwrap_or(0);
                    pending = match pending {
                        None => Some(digit),
                        Some(high) => {
                            bytes.push(u8::try_from(high * 16 + digit).unwrap_or(0));
                            None
                        }
                    };
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(_) => return self.error("Invalid character in blob literal"),
                None => return self.error("Unterminated blob literal"),
            }
        }

        if pending.is_some() {
            return self.error("Odd number of hex digits in blob literal");
        }

        self.advance();
        self.make_token(TokenKind::Blob(bytes))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;
        self.token_line = self.line;
        self.token_column = column_of(self.input, self.line_start, self.start);

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '~' => self.make_token(TokenKind::BitNot),
            '^' => self.make_token(TokenKind::BitXor),
            '?' => self.make_token(TokenKind::Question),
            '@' => self.make_token(TokenKind::At),
            '.' => self.make_token(TokenKind::Dot),
            '&' => self.make_token(TokenKind::BitAnd),
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    self.make_token(TokenKind::DoubleColon)
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::EqEqEq)
                    } else {
                        self.make_token(TokenKind::EqEq)
                    }
                } else {
                    self.make_token(TokenKind::Eq)
                }
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                Some('<') => {
                    self.advance();
                    self.make_token(TokenKind::LeftShift)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::RightShift)
                }
                _ => self.make_token(TokenKind::Gt),
            },
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::NotEqEq)
                    } else {
                        self.make_token(TokenKind::NotEq)
                    }
                } else {
                    self.error("Unexpected character: !")
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    self.make_token(TokenKind::Concat)
                } else {
                    self.make_token(TokenKind::BitOr)
                }
            }
            '\'' => {
                self.rewind_to_start();
                self.scan_string()
            }
            '"' => {
                self.rewind_to_start();
                self.scan_quoted_identifier('"', '"')
            }
            '`' => {
                self.rewind_to_start();
                self.scan_quoted_identifier('`', '`')
            }
            '[' => {
                // SQLite-style `[name]`; a bare `[` stays a delimiter.
                if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
                    self.rewind_to_start();
                    self.scan_quoted_identifier('[', ']')
                } else {
                    self.make_token(TokenKind::LeftBracket)
                }
            }
            'X' | 'x' if self.peek() == Some('\'') => {
                self.rewind_to_start();
                self.scan_blob()
            }
            c if c.is_ascii_digit() => {
                self.rewind_to_start();
                self.scan_number()
            }
            c if c.is_alphabetic() || c == '_' => {
                self.rewind_to_start();
                self.scan_identifier()
            }
            _ => self.error(format!("Unexpected character: {c}")),
        }
    }

    /// Tokenizes the entire input. The returned vector always ends with
    /// exactly one EOF token.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

fn column_of(input: &str, line_start: usize, pos: usize) -> u32 {
    let chars = input.get(line_start..pos).map_or(0, |s| s.chars().count());
    u32::try_from(chars + 1).unwrap_or(u32::MAX)
}
