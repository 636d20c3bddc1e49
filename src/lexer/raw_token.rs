use logos::Logos;

/// Side channel for callbacks that want to explain why they rejected a slice.
#[derive(Debug, Default, Clone)]
pub struct LexExtras {
    pub error_message: Option<&'static str>,
}

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexExtras)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum RawToken<'src> {
    // Keywords
    #[token("and")]
    And,
    #[token("class")]
    Class,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("fun")]
    Fun,
    #[token("if")]
    If,
    #[token("nil")]
    Nil,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // Identifiers and literals
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[token("\"", lex_string)]
    String(&'src str),
    #[regex(r"[0-9]+(\.[0-9]+)?", lex_number)]
    Number(f64),

    // Operators and punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token(";")]
    Semicolon,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
}

fn lex_number<'src>(lexer: &mut logos::Lexer<'src, RawToken<'src>>) -> Option<f64> {
    lexer.slice().parse::<f64>().ok()
}

/// Strings may span lines. Without a closing quote the rest of the input is
/// consumed so the scanner cannot loop on it.
fn lex_string<'src>(lexer: &mut logos::Lexer<'src, RawToken<'src>>) -> Option<&'src str> {
    let rest = lexer.remainder();
    match rest.find('"') {
        Some(end) => {
            lexer.bump(end + 1);
            let slice = lexer.slice();
            Some(&slice[1..slice.len() - 1])
        }
        None => {
            lexer.bump(rest.len());
            lexer.extras.error_message = Some("Unterminated string.");
            None
        }
    }
}
