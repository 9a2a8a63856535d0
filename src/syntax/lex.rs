//! Lexer / tokenizer

use std::fmt;

use base::span::Span;

/// Text span with token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn slice<'s>(&self, src: &'s str) -> &'s str {
        self.span.slice(src)
    }
}

/// Token classification. `Display` renders the name used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A byte the lexer does not recognize. Never fatal; the parser rejects it.
    Illegal,
    Eof,

    Ident,
    Int,
    Str,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,

    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Let,
    Function,
    If,
    Else,
    Return,
    True,
    False,
    Macro,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Str => "STRING",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Bang => "BANG",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Eq => "EQ",
            TokenKind::NotEq => "NOT_EQ",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Let => "LET",
            TokenKind::Function => "FUNCTION",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Macro => "MACRO",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifiers that are reserved keywords get their own token kinds
fn lookup_ident(ident: &str) -> TokenKind {
    match ident {
        "let" => TokenKind::Let,
        "fn" => TokenKind::Function,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "macro" => TokenKind::Macro,
        _ => TokenKind::Ident,
    }
}

fn is_ws(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

/// [a-zA-Z_]
fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Pull-based lexer. Call [`Lexer::next_token`] repeatedly; after the source
/// is exhausted it keeps returning `Eof` tokens.
///
/// We treat the UTF-8 source string as bytes. This is valid since every
/// character the language recognizes is single-byte ASCII; anything else
/// comes out as an `Illegal` token.
#[derive(Debug)]
pub struct Lexer<'s> {
    src: &'s [u8],
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_ws();

        let start = self.pos;

        let Some(&c) = self.src.get(self.pos) else {
            return self.token(TokenKind::Eof, start);
        };

        let kind = match c {
            b'=' => {
                if self.peek_is(b'=') {
                    self.pos += 1;
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.peek_is(b'=') {
                    self.pos += 1;
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Asterisk,
            b'/' => TokenKind::Slash,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'"' => return self.lex_str(),
            c if is_letter(c) => return self.lex_ident(),
            c if is_digit(c) => return self.lex_int(),
            _ => TokenKind::Illegal,
        };

        self.pos += 1;
        self.token(kind, start)
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::from(start, self.pos),
        }
    }

    fn peek_is(&self, c: u8) -> bool {
        self.src.get(self.pos + 1) == Some(&c)
    }

    fn skip_ws(&mut self) {
        self.advance_while(is_ws);
    }

    fn advance_while(&mut self, p: impl Fn(u8) -> bool) {
        while let Some(&c) = self.src.get(self.pos) {
            if !p(c) {
                return;
            }
            self.pos += 1;
        }
    }

    /// [a-zA-Z_][a-zA-Z0-9_]*, then a keyword table lookup
    fn lex_ident(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(|c| is_letter(c) || is_digit(c));

        // safe: the scanned range is ASCII
        let ident = unsafe { std::str::from_utf8_unchecked(&self.src[start..self.pos]) };

        self.token(lookup_ident(ident), start)
    }

    /// [0-9]+, unsigned; conversion happens in the parser
    fn lex_int(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(is_digit);
        self.token(TokenKind::Int, start)
    }

    /// `"[^"]*"`, no escape processing. The span excludes the quotes so that
    /// `Token::slice` yields the contents. An unterminated string ends at EOF.
    fn lex_str(&mut self) -> Token {
        self.pos += 1;
        let start = self.pos;

        self.advance_while(|c| c != b'"');
        let end = self.pos;

        // closing quote, if any
        if self.pos < self.src.len() {
            self.pos += 1;
        }

        Token {
            kind: TokenKind::Str,
            span: Span::from(start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_is_repeatable() {
        let mut lex = Lexer::new("x");
        assert_eq!(lex.next_token().kind, TokenKind::Ident);
        assert_eq!(lex.next_token().kind, TokenKind::Eof);
        assert_eq!(lex.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn illegal_byte() {
        let src = "let @";
        let mut lex = Lexer::new(src);
        assert_eq!(lex.next_token().kind, TokenKind::Let);

        let tk = lex.next_token();
        assert_eq!(tk.kind, TokenKind::Illegal);
        assert_eq!(tk.slice(src), "@");
    }

    #[test]
    fn unterminated_string_ends_at_eof() {
        let src = "\"hello";
        let mut lex = Lexer::new(src);

        let tk = lex.next_token();
        assert_eq!(tk.kind, TokenKind::Str);
        assert_eq!(tk.slice(src), "hello");
        assert_eq!(lex.next_token().kind, TokenKind::Eof);
    }
}
