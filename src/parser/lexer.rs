//! Directive lexer.
//!
//! Refines the raw [`Scanner`] stream: a comment whose first character is a
//! condition sigil (`?`) or a swap sigil (`$`) is re-scanned with the matching
//! [`RecognizerSet`]; every other token passes through untouched.
//!
//! Inside a directive, characters no recognizer claims accumulate into an
//! [`TokenKind::Expression`] token that is flushed, trimmed, whenever a
//! recognizer matches or the comment ends. The lexer never fails; malformed
//! directives are reported by the parser.

use super::recognizers::RecognizerSet;
use super::scanner::Scanner;
use super::token::{Token, TokenKind};

pub const CONDITION_SIGIL: char = '?';
pub const SWAP_SIGIL: char = '$';

/// Lexer for directive comments.
#[derive(Debug, Clone)]
pub struct Lexer {
    condition: RecognizerSet,
    swap: RecognizerSet,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(RecognizerSet::condition(), RecognizerSet::swap())
    }
}

impl Lexer {
    pub fn new(condition: RecognizerSet, swap: RecognizerSet) -> Self {
        Self { condition, swap }
    }

    /// Scan and refine `source` in one pass.
    pub fn tokenize<'a>(&self, source: &'a str) -> Vec<Token<'a>> {
        self.refine(Scanner::new(source).scan())
    }

    /// Refine an already scanned raw token stream.
    pub fn refine<'a>(&self, raw: Vec<Token<'a>>) -> Vec<Token<'a>> {
        let mut tokens = Vec::with_capacity(raw.len());
        for token in raw {
            if token.kind != TokenKind::Comment {
                tokens.push(token);
                continue;
            }
            match token.value.chars().next() {
                Some(CONDITION_SIGIL) => {
                    tokens.push(token.subtoken(0, 1, TokenKind::Condition));
                    self.scan_contents(&token, &self.condition, &mut tokens);
                }
                Some(SWAP_SIGIL) => {
                    tokens.push(token.subtoken(0, 1, TokenKind::Swap));
                    self.scan_contents(&token, &self.swap, &mut tokens);
                }
                _ => tokens.push(token),
            }
        }
        tokens
    }

    fn scan_contents<'a>(
        &self,
        token: &Token<'a>,
        recognizers: &RecognizerSet,
        tokens: &mut Vec<Token<'a>>,
    ) {
        let text = token.value;
        let mut index = 1;
        let mut pending = index;

        while index < text.len() {
            match recognizers.recognize(text, index) {
                Some((kind, end)) => {
                    flush_expression(token, pending, index, tokens);
                    tokens.push(token.subtoken(index, end, kind));
                    index = end;
                    pending = end;
                }
                None => {
                    index += text[index..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        flush_expression(token, pending, text.len(), tokens);
    }
}

/// Emit `start..end` of `token` as a trimmed expression token, unless blank.
fn flush_expression<'a>(token: &Token<'a>, start: usize, end: usize, tokens: &mut Vec<Token<'a>>) {
    let run = &token.value[start..end];
    let trimmed = run.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = run.len() - run.trim_start().len();
    let from = start + leading;
    tokens.push(token.subtoken(from, from + trimmed.len(), TokenKind::Expression));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive_tokens(source: &str) -> Vec<(TokenKind, &str)> {
        Lexer::default()
            .tokenize(source)
            .into_iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Text | TokenKind::CommentStart | TokenKind::CommentEnd
                )
            })
            .map(|t| (t.kind, t.value))
            .collect()
    }

    #[test]
    fn test_condition_directive() {
        assert_eq!(
            directive_tokens("/*? if fabric && >=1.20 {*/"),
            vec![
                (TokenKind::Condition, "?"),
                (TokenKind::If, "if"),
                (TokenKind::Expression, "fabric"),
                (TokenKind::And, "&&"),
                (TokenKind::Ge, ">="),
                (TokenKind::Expression, "1.20"),
                (TokenKind::OpenScope, "{"),
            ]
        );
    }

    #[test]
    fn test_extension_and_closer() {
        assert_eq!(
            directive_tokens("/*?} ELSE {*//*?}*/"),
            vec![
                (TokenKind::Condition, "?"),
                (TokenKind::CloseScope, "}"),
                (TokenKind::Else, "ELSE"),
                (TokenKind::OpenScope, "{"),
                (TokenKind::Condition, "?"),
                (TokenKind::CloseScope, "}"),
            ]
        );
    }

    #[test]
    fn test_swap_directive_keeps_name_whole() {
        assert_eq!(
            directive_tokens("/*$ my_swap&&x {*/"),
            vec![
                (TokenKind::Swap, "$"),
                (TokenKind::Expression, "my_swap&&x"),
                (TokenKind::OpenScope, "{"),
            ]
        );
    }

    #[test]
    fn test_plain_comment_passes_through() {
        assert_eq!(
            directive_tokens("/* if x */"),
            vec![(TokenKind::Comment, " if x ")]
        );
    }

    #[test]
    fn test_expression_spans_point_into_source() {
        let source = "code /*?  if   'a b' == x */";
        for token in Lexer::default().tokenize(source) {
            assert_eq!(token.span.slice(source), token.value);
        }
        assert_eq!(
            directive_tokens(source),
            vec![
                (TokenKind::Condition, "?"),
                (TokenKind::If, "if"),
                (TokenKind::Quoted, "'a b'"),
                (TokenKind::Eq, "=="),
                (TokenKind::Expression, "x"),
            ]
        );
    }

    #[test]
    fn test_custom_recognizers() {
        use crate::parser::recognizers::Recognizer;

        let condition = RecognizerSet::new(vec![
            (TokenKind::If, Recognizer::Keyword("when")),
            (TokenKind::And, Recognizer::Literal("and")),
        ]);
        let lexer = Lexer::new(condition, RecognizerSet::swap());
        let tokens: Vec<_> = lexer
            .tokenize("/*? when a and b */")
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            tokens,
            vec![
                TokenKind::CommentStart,
                TokenKind::Condition,
                TokenKind::If,
                TokenKind::Expression,
                TokenKind::And,
                TokenKind::Expression,
                TokenKind::CommentEnd,
            ]
        );
    }
}
