//! Tokenization of Tiger source, via `logos`.

use logos::Logos;
use tigerc_core::Pos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token {
    #[token("type")]
    Type,
    #[token("var")]
    Var,
    #[token("function")]
    Function,
    #[token("break")]
    Break,
    #[token("of")]
    Of,
    #[token("end")]
    End,
    #[token("in")]
    In,
    #[token("nil")]
    Nil,
    #[token("let")]
    Let,
    #[token("array")]
    Array,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("to")]
    To,
    #[token("do")]
    Do,

    #[token(",")]
    Comma,
    #[token(":=")]
    Assign,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<>")]
    Neq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&")]
    AmpAmp,
    #[token("|")]
    PipePipe,

    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLit(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    StrLit(String),
}

/// Strips the surrounding quotes and resolves `\n`, `\t`, `\"`, `\\`, and
/// `\DDD` decimal character escapes.
fn unescape(raw: &str) -> Option<String> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            d if d.is_ascii_digit() => {
                let mut digits = String::from(d);
                for _ in 0..2 {
                    digits.push(chars.next()?);
                }
                let code: u32 = digits.parse().ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

/// A token together with the byte span it came from.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// Converts byte offsets into 1-based row/column positions.
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in src.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex { line_starts }
    }

    pub fn pos_at(&self, offset: usize) -> Pos {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.line_starts[line];
        Pos::new(line as u32 + 1, column as u32 + 1)
    }
}

/// Lexes `src` into a flat token stream. A lexical error (unterminated
/// string, stray character) reports at the offending byte offset.
pub fn lex(src: &str) -> Result<Vec<Spanned>, (usize, usize)> {
    let mut out = Vec::new();
    let mut lexer = Token::lexer(src);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => out.push(Spanned {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(()) => return Err((span.start, span.end)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_identifiers() {
        let tokens = lex("let var x := 1 in x end").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|s| s.token.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Let,
                Token::Var,
                Token::Ident("x".to_string()),
                Token::Assign,
                Token::IntLit(1),
                Token::In,
                Token::Ident("x".to_string()),
                Token::End,
            ]
        );
    }

    #[test]
    fn unescapes_string_literals() {
        let tokens = lex(r#""hello\nworld""#).unwrap();
        assert_eq!(tokens[0].token, Token::StrLit("hello\nworld".to_string()));
    }

    #[test]
    fn skips_block_comments() {
        let tokens = lex("/* a comment */ 42").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, Token::IntLit(42));
    }

    #[test]
    fn line_index_tracks_rows_and_columns() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.pos_at(0), Pos::new(1, 1));
        assert_eq!(index.pos_at(3), Pos::new(2, 1));
        assert_eq!(index.pos_at(4), Pos::new(2, 2));
    }
}
