//! Token recognizers for directive comments.
//!
//! A [`Recognizer`] looks at a position in a comment's text and optionally
//! consumes a run of characters. A [`RecognizerSet`] is an ordered list of
//! `(kind, recognizer)` pairs; the directive lexer tries them in order and the
//! first match wins, so longer operators must precede their prefixes.

use super::token::TokenKind;

/// A matcher for one token shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognizer {
    /// Exact text.
    Literal(&'static str),
    /// Case-insensitive word that is not part of a longer identifier.
    Keyword(&'static str),
    /// Text enclosed in the given quote character. Unterminated quotes don't match.
    Quoted(char),
}

impl Recognizer {
    /// Returns the end offset of the match starting at `at`, if any.
    pub fn recognize(&self, text: &str, at: usize) -> Option<usize> {
        let rest = &text[at..];
        match self {
            Recognizer::Literal(literal) => rest.starts_with(literal).then(|| at + literal.len()),
            Recognizer::Keyword(word) => {
                let candidate = rest.get(..word.len())?;
                if !candidate.eq_ignore_ascii_case(word) {
                    return None;
                }
                let before = text[..at].chars().next_back();
                let after = rest[word.len()..].chars().next();
                if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
                    return None;
                }
                Some(at + word.len())
            }
            Recognizer::Quoted(quote) => {
                let mut chars = rest.char_indices();
                match chars.next() {
                    Some((_, c)) if c == *quote => {}
                    _ => return None,
                }
                chars
                    .find(|(_, c)| c == quote)
                    .map(|(idx, c)| at + idx + c.len_utf8())
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Ordered recognizer configuration for one directive kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerSet {
    rules: Vec<(TokenKind, Recognizer)>,
}

impl RecognizerSet {
    pub fn new(rules: Vec<(TokenKind, Recognizer)>) -> Self {
        Self { rules }
    }

    /// Recognizers for `/*? ... */` condition directives.
    pub fn condition() -> Self {
        use Recognizer::*;
        Self::new(vec![
            (TokenKind::OpenScope, Literal("{")),
            (TokenKind::CloseScope, Literal("}")),
            (TokenKind::And, Literal("&&")),
            (TokenKind::Or, Literal("||")),
            (TokenKind::Eq, Literal("==")),
            (TokenKind::NotEq, Literal("!=")),
            (TokenKind::Le, Literal("<=")),
            (TokenKind::Ge, Literal(">=")),
            (TokenKind::Lt, Literal("<")),
            (TokenKind::Gt, Literal(">")),
            (TokenKind::Eq, Literal("=")),
            (TokenKind::Not, Literal("!")),
            (TokenKind::LParen, Literal("(")),
            (TokenKind::RParen, Literal(")")),
            (TokenKind::Quoted, Quoted('\'')),
            (TokenKind::Quoted, Quoted('"')),
            (TokenKind::Elif, Keyword("elif")),
            (TokenKind::Else, Keyword("else")),
            (TokenKind::If, Keyword("if")),
        ])
    }

    /// Recognizers for `/*$ ... */` swap directives.
    pub fn swap() -> Self {
        use Recognizer::*;
        Self::new(vec![
            (TokenKind::OpenScope, Literal("{")),
            (TokenKind::CloseScope, Literal("}")),
        ])
    }

    /// First rule matching at `at`, with the end offset of its match.
    pub fn recognize(&self, text: &str, at: usize) -> Option<(TokenKind, usize)> {
        self.rules
            .iter()
            .find_map(|(kind, rule)| rule.recognize(text, at).map(|end| (*kind, end)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_is_word_bounded() {
        let kw = Recognizer::Keyword("if");
        assert_eq!(kw.recognize("if x", 0), Some(2));
        assert_eq!(kw.recognize(" IF(x)", 1), Some(3));
        assert_eq!(kw.recognize("iffy", 0), None);
        assert_eq!(kw.recognize("motif", 3), None);
        assert_eq!(kw.recognize("i", 0), None);
    }

    #[test]
    fn test_quoted() {
        let q = Recognizer::Quoted('\'');
        assert_eq!(q.recognize("'a b' c", 0), Some(5));
        assert_eq!(q.recognize("x 'open", 2), None);
        assert_eq!(q.recognize("abc", 0), None);
    }

    #[test]
    fn test_longest_operator_wins() {
        let set = RecognizerSet::condition();
        assert_eq!(set.recognize(">=1.2", 0), Some((TokenKind::Ge, 2)));
        assert_eq!(set.recognize(">1.2", 0), Some((TokenKind::Gt, 1)));
        assert_eq!(set.recognize("!=", 0), Some((TokenKind::NotEq, 2)));
        assert_eq!(set.recognize("!a", 0), Some((TokenKind::Not, 1)));
        assert_eq!(set.recognize("=a", 0), Some((TokenKind::Eq, 1)));
        assert_eq!(set.recognize("elif", 0), Some((TokenKind::Elif, 4)));
        assert_eq!(set.recognize("fabric", 0), None);
    }

    #[test]
    fn test_swap_set_ignores_operators() {
        let set = RecognizerSet::swap();
        assert_eq!(set.recognize("}", 0), Some((TokenKind::CloseScope, 1)));
        assert_eq!(set.recognize("a&&b", 1), None);
    }
}
