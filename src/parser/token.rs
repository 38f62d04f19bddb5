//! Token model shared by the scanner, the directive lexer and the parser.
//!
//! A [`Token`] is an immutable view into the original buffer: a [`TokenKind`], the
//! byte [`Span`] it covers and the covered text. Tokens are never built from
//! synthesized text, so every span is a valid sub-range of the input.

use std::fmt;

/// Half-open byte range into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} past end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text this span covers in `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Returns a span covering both `self` and `other`.
    pub fn join(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// All token kinds produced by the scanner and the directive lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Raw layer
    Text,         // code between comments
    CommentStart, // /*
    Comment,      // comment contents, opaque unless led by a sigil
    CommentEnd,   // */

    // Directive sigils
    Condition, // ?
    Swap,      // $

    // Keywords
    If,
    Elif,
    Else,

    // Scope markers
    OpenScope,  // {
    CloseScope, // }

    // Boolean operators
    And, // &&
    Or,  // ||
    Not, // !

    // Comparisons
    Eq,    // == or =
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    LParen, // (
    RParen, // )

    /// Quoted string, quotes included.
    Quoted,
    /// Run of characters no recognizer matched, trimmed.
    Expression,
}

impl TokenKind {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
        )
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, TokenKind::If | TokenKind::Elif | TokenKind::Else)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Text => write!(f, "text"),
            TokenKind::CommentStart => write!(f, "'/*'"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::CommentEnd => write!(f, "'*/'"),
            TokenKind::Condition => write!(f, "'?'"),
            TokenKind::Swap => write!(f, "'$'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Elif => write!(f, "'elif'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::OpenScope => write!(f, "'{{'"),
            TokenKind::CloseScope => write!(f, "'}}'"),
            TokenKind::And => write!(f, "'&&'"),
            TokenKind::Or => write!(f, "'||'"),
            TokenKind::Not => write!(f, "'!'"),
            TokenKind::Eq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Quoted => write!(f, "string"),
            TokenKind::Expression => write!(f, "expression"),
        }
    }
}

/// A typed slice of the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    pub value: &'a str,
}

impl<'a> Token<'a> {
    /// Builds a token over `span` of `source`.
    pub fn new(kind: TokenKind, span: Span, source: &'a str) -> Self {
        Self {
            kind,
            span,
            value: span.slice(source),
        }
    }

    /// Narrows this token to `start..end`, offsets relative to the token's own text.
    pub fn subtoken(&self, start: usize, end: usize, kind: TokenKind) -> Token<'a> {
        Token {
            kind,
            span: Span::new(self.span.start + start, self.span.start + end),
            value: &self.value[start..end],
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Expression | TokenKind::Quoted => write!(f, "'{}'", self.value),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Maps byte offsets to 1-based line numbers.
///
/// `\n`, `\r\n` and a lone `\r` each end a line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtoken_keeps_absolute_span() {
        let source = "ab/*? if x */";
        let token = Token::new(TokenKind::Comment, Span::new(4, 11), source);
        assert_eq!(token.value, "? if x ");

        let sub = token.subtoken(2, 4, TokenKind::If);
        assert_eq!(sub.span, Span::new(6, 8));
        assert_eq!(sub.value, "if");
        assert_eq!(sub.span.slice(source), "if");
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nb\r\nc\rd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(1), 1);
        assert_eq!(index.line(2), 2);
        assert_eq!(index.line(5), 3);
        assert_eq!(index.line(7), 4);
    }
}
