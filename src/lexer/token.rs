use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Range;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    // Literals
    Identifier,
    String,
    Number,
    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    // Special tokens
    Error,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'src> {
    Number(f64),
    /// String contents without the surrounding quotes.
    Str(&'src str),
}

/// One scanned token. For `TokenKind::Error` the lexeme holds the diagnostic
/// text instead of source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub literal: Option<Literal<'src>>,
    pub line: usize,
    /// Byte range in the source, used for rich diagnostics.
    pub span: Range<usize>,
}

impl<'src> Token<'src> {
    /// Placeholder used before the first token has been scanned.
    pub fn synthetic(kind: TokenKind) -> Self {
        Self {
            kind,
            lexeme: "",
            literal: None,
            line: 1,
            span: 0..0,
        }
    }

    pub fn error(message: &'static str, line: usize, span: Range<usize>) -> Self {
        Self {
            kind: TokenKind::Error,
            lexeme: message,
            literal: None,
            line,
            span,
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            TokenKind::Eof => write!(f, "{}", self.kind),
            TokenKind::Error => write!(f, "{} <{}>", self.kind, self.lexeme),
            _ => write!(f, "{} '{}'", self.kind, self.lexeme),
        }
    }
}
