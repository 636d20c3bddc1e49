mod raw_token;
pub mod token;

use log::trace;
use logos::{Lexer as LogosLexer, Logos};
use raw_token::RawToken;
use std::ops::Range;
pub use token::{Literal, Token, TokenKind};

/// Lazy token source over one piece of source text.
///
/// Whitespace and `//` comments are skipped. Once the end of input has been
/// reached every further call to [`Scanner::scan_token`] keeps returning an
/// `Eof` token.
pub struct Scanner<'src> {
    source: &'src str,
    inner: LogosLexer<'src, RawToken<'src>>,
    line: usize,
    line_cursor: usize,
    reached_eof: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Scanner {
            source,
            inner: RawToken::lexer(source),
            line: 1,
            line_cursor: 0,
            reached_eof: false,
        }
    }

    /// Restart scanning from the beginning of `source`.
    pub fn reset(&mut self, source: &'src str) {
        *self = Scanner::new(source);
    }

    pub fn scan_token(&mut self) -> Token<'src> {
        if self.reached_eof {
            return self.eof_token();
        }

        let token = match self.inner.next() {
            Some(Ok(raw)) => {
                let span = self.inner.span();
                let line = self.line_at(span.start);
                self.make_token(raw, span, line)
            }
            Some(Err(())) => {
                let span = self.inner.span();
                let line = self.line_at(span.start);
                let message = self
                    .inner
                    .extras
                    .error_message
                    .take()
                    .unwrap_or("Unexpected character.");
                Token::error(message, line, span)
            }
            None => {
                self.reached_eof = true;
                self.eof_token()
            }
        };
        trace!("scanned {} on line {}", token, token.line);
        token
    }

    /// Line of the byte at `offset`. Offsets are requested in increasing
    /// order, so newlines are only counted once.
    fn line_at(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.source.len());
        if offset > self.line_cursor {
            self.line += self.source.as_bytes()[self.line_cursor..offset]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line_cursor = offset;
        }
        self.line
    }

    fn eof_token(&mut self) -> Token<'src> {
        let end = self.source.len();
        let line = self.line_at(end);
        Token {
            kind: TokenKind::Eof,
            lexeme: "",
            literal: None,
            line,
            span: end..end,
        }
    }

    fn make_token(&self, raw: RawToken<'src>, span: Range<usize>, line: usize) -> Token<'src> {
        let lexeme = &self.source[span.clone()];
        let (kind, literal) = match raw {
            RawToken::And => (TokenKind::And, None),
            RawToken::Class => (TokenKind::Class, None),
            RawToken::Else => (TokenKind::Else, None),
            RawToken::False => (TokenKind::False, None),
            RawToken::For => (TokenKind::For, None),
            RawToken::Fun => (TokenKind::Fun, None),
            RawToken::If => (TokenKind::If, None),
            RawToken::Nil => (TokenKind::Nil, None),
            RawToken::Or => (TokenKind::Or, None),
            RawToken::Print => (TokenKind::Print, None),
            RawToken::Return => (TokenKind::Return, None),
            RawToken::Super => (TokenKind::Super, None),
            RawToken::This => (TokenKind::This, None),
            RawToken::True => (TokenKind::True, None),
            RawToken::Var => (TokenKind::Var, None),
            RawToken::While => (TokenKind::While, None),

            RawToken::Identifier => (TokenKind::Identifier, None),
            RawToken::String(s) => (TokenKind::String, Some(Literal::Str(s))),
            RawToken::Number(n) => (TokenKind::Number, Some(Literal::Number(n))),

            RawToken::LeftParen => (TokenKind::LeftParen, None),
            RawToken::RightParen => (TokenKind::RightParen, None),
            RawToken::LeftBrace => (TokenKind::LeftBrace, None),
            RawToken::RightBrace => (TokenKind::RightBrace, None),
            RawToken::Comma => (TokenKind::Comma, None),
            RawToken::Dot => (TokenKind::Dot, None),
            RawToken::Minus => (TokenKind::Minus, None),
            RawToken::Plus => (TokenKind::Plus, None),
            RawToken::Semicolon => (TokenKind::Semicolon, None),
            RawToken::Slash => (TokenKind::Slash, None),
            RawToken::Star => (TokenKind::Star, None),
            RawToken::Bang => (TokenKind::Bang, None),
            RawToken::BangEqual => (TokenKind::BangEqual, None),
            RawToken::Equal => (TokenKind::Equal, None),
            RawToken::EqualEqual => (TokenKind::EqualEqual, None),
            RawToken::Greater => (TokenKind::Greater, None),
            RawToken::GreaterEqual => (TokenKind::GreaterEqual, None),
            RawToken::Less => (TokenKind::Less, None),
            RawToken::LessEqual => (TokenKind::LessEqual, None),
        };
        Token {
            kind,
            lexeme,
            literal,
            line,
            span,
        }
    }
}

/// Yields every token before end of input, error tokens included.
impl<'src> Iterator for Scanner<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.scan_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
