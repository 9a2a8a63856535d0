//! Source position handling shared by the lexer, parser and driver

pub mod ln;
pub mod span;

impl span::Span {
    pub fn slice<'a>(&self, s: &'a str) -> &'a str {
        &s[self.start.into_usize()..self.end.into_usize()]
    }
}
