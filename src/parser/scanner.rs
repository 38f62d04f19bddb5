//! Raw scanner: splits source text into plain text and block comments.
//!
//! Only `/* ... */` comments are recognized. They do not nest and close at the
//! first `*/`; an unterminated comment runs to the end of input and produces no
//! [`TokenKind::CommentEnd`]. The produced tokens partition the input.

use super::token::{Span, Token, TokenKind};

pub const COMMENT_START: &str = "/*";
pub const COMMENT_END: &str = "*/";

/// Scanner over a single source buffer.
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Scan the entire input.
    pub fn scan(mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut text_start = 0;

        while let Some(offset) = self.input[self.position..].find(COMMENT_START) {
            let start = self.position + offset;
            if start > text_start {
                tokens.push(self.token(TokenKind::Text, text_start, start));
            }
            let body_start = start + COMMENT_START.len();
            tokens.push(self.token(TokenKind::CommentStart, start, body_start));

            match self.input[body_start..].find(COMMENT_END) {
                Some(len) => {
                    let body_end = body_start + len;
                    let end = body_end + COMMENT_END.len();
                    tokens.push(self.token(TokenKind::Comment, body_start, body_end));
                    tokens.push(self.token(TokenKind::CommentEnd, body_end, end));
                    self.position = end;
                }
                None => {
                    tokens.push(self.token(TokenKind::Comment, body_start, self.input.len()));
                    self.position = self.input.len();
                }
            }
            text_start = self.position;
        }

        if text_start < self.input.len() {
            tokens.push(self.token(TokenKind::Text, text_start, self.input.len()));
        }
        tokens
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'a> {
        Token::new(kind, Span::new(start, end), self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        Scanner::new(input)
            .scan()
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn test_plain_text_only() {
        assert_eq!(kinds("int x;"), vec![(TokenKind::Text, "int x;")]);
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_comments_split_text() {
        assert_eq!(
            kinds("a/*? if b */c/**/"),
            vec![
                (TokenKind::Text, "a"),
                (TokenKind::CommentStart, "/*"),
                (TokenKind::Comment, "? if b "),
                (TokenKind::CommentEnd, "*/"),
                (TokenKind::Text, "c"),
                (TokenKind::CommentStart, "/*"),
                (TokenKind::Comment, ""),
                (TokenKind::CommentEnd, "*/"),
            ]
        );
    }

    #[test]
    fn test_adjacent_comments() {
        let tokens = kinds("/*? if false *//*code();*//*?}*/");
        let comments: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Comment)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(comments, vec!["? if false ", "code();", "?}"]);
    }

    #[test]
    fn test_unterminated_comment() {
        assert_eq!(
            kinds("x /* open"),
            vec![
                (TokenKind::Text, "x "),
                (TokenKind::CommentStart, "/*"),
                (TokenKind::Comment, " open"),
            ]
        );
    }

    #[test]
    fn test_tokens_partition_input() {
        let input = "a /* b */ c /*? d */\n e /* f";
        let tokens = Scanner::new(input).scan();
        let mut cursor = 0;
        for token in &tokens {
            assert_eq!(token.span.start, cursor);
            cursor = token.span.end;
        }
        assert_eq!(cursor, input.len());
    }
}
