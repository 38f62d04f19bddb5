//! Guard expression parsing
//!
//! Parses the tokens after `if`/`elif` into an [`Expr`] tree by recursive
//! descent, lowest precedence first:
//!
//! - `||`
//! - `&&`, and implicit AND between juxtaposed comparisons (`>=1.20 <1.21`)
//! - `!` and parentheses
//! - predicates: `op value` against the target version, `value [op value]`
//!
//! Expression tokens are split on whitespace, so `fabric  1.20` is two words.
//!
//! The entry point is implemented as a `pub(crate)` method on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Diagnostic, Directive, Parser};
use crate::parser::token::{Token, TokenKind};

impl<'a> Parser<'a> {
    /// Parse a guard expression from the tokens following a keyword.
    pub(crate) fn parse_guard(
        &self,
        tokens: &[Token<'a>],
        directive: &Directive<'a>,
    ) -> Result<Expr, Diagnostic> {
        GuardParser::new(tokens, directive).parse()
    }
}

/// Cursor over the word-split tokens of one guard.
struct GuardParser<'a> {
    items: Vec<(TokenKind, &'a str)>,
    position: usize,
    line: usize,
    text: &'a str,
}

impl<'a> GuardParser<'a> {
    fn new(tokens: &[Token<'a>], directive: &Directive<'a>) -> Self {
        let mut items = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token.kind {
                TokenKind::Expression => items.extend(
                    token
                        .value
                        .split_whitespace()
                        .map(|word| (TokenKind::Expression, word)),
                ),
                TokenKind::Quoted => {
                    let value = token.value;
                    let inner = value.get(1..value.len().saturating_sub(1)).unwrap_or("");
                    items.push((TokenKind::Quoted, inner));
                }
                kind => items.push((kind, token.value)),
            }
        }
        Self {
            items,
            position: 0,
            line: directive.line,
            text: directive.text,
        }
    }

    fn parse(mut self) -> Result<Expr, Diagnostic> {
        if self.items.is_empty() {
            return Err(Diagnostic::new(self.line, "Expression can't be empty"));
        }
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(TokenKind::RParen) => Err(self.unbalanced()),
            Some(kind) => Err(self.unexpected(kind)),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_and()?;
        while self.match_kind(TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_unary()?;
        loop {
            if self.match_kind(TokenKind::And) {
                let right = self.parse_unary()?;
                left = Expr::and(left, right);
            } else if self.peek().is_some_and(TokenKind::is_comparison) {
                let right = self.parse_unary()?;
                left = Expr::and(left, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        match self.peek() {
            None => Err(self.expected_value()),
            Some(TokenKind::Not) => {
                self.position += 1;
                Ok(Expr::not(self.parse_unary()?))
            }
            Some(TokenKind::LParen) => {
                self.position += 1;
                let inner = self.parse_or()?;
                if !self.match_kind(TokenKind::RParen) {
                    return Err(self.unbalanced());
                }
                Ok(inner)
            }
            Some(_) => self.parse_predicate(),
        }
    }

    fn parse_predicate(&mut self) -> Result<Expr, Diagnostic> {
        if let Some(op) = self.comparison() {
            self.position += 1;
            let right = self.operand()?;
            return Ok(Expr::Compare {
                left: None,
                op,
                right,
            });
        }

        let left = match self.peek() {
            Some(TokenKind::Expression | TokenKind::Quoted) => self.operand()?,
            Some(kind) => return Err(self.unexpected(kind)),
            None => return Err(self.expected_value()),
        };
        match self.comparison() {
            Some(op) => {
                self.position += 1;
                let right = self.operand()?;
                Ok(Expr::Compare {
                    left: Some(left),
                    op,
                    right,
                })
            }
            None => Ok(Expr::Leaf(left)),
        }
    }

    fn operand(&mut self) -> Result<Operand, Diagnostic> {
        let operand = match self.items.get(self.position) {
            Some((TokenKind::Expression, word)) => Operand::Word(word.to_string()),
            Some((TokenKind::Quoted, text)) => Operand::Quoted(text.to_string()),
            _ => return Err(self.expected_value()),
        };
        self.position += 1;
        Ok(operand)
    }

    // ===== Helper methods =====

    fn peek(&self) -> Option<TokenKind> {
        self.items.get(self.position).map(|(kind, _)| *kind)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn comparison(&self) -> Option<CmpOp> {
        match self.peek()? {
            TokenKind::Eq => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::Ne),
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::Le => Some(CmpOp::Le),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::Ge => Some(CmpOp::Ge),
            _ => None,
        }
    }

    fn expected_value(&self) -> Diagnostic {
        let after = self
            .position
            .checked_sub(1)
            .and_then(|idx| self.items.get(idx))
            .map_or(self.text, |(_, value)| *value);
        Diagnostic::new(self.line, format!("Expected a value after {}", after))
    }

    fn unexpected(&self, kind: TokenKind) -> Diagnostic {
        Diagnostic::new(
            self.line,
            format!("Unexpected {} in condition: {}", kind, self.text),
        )
    }

    fn unbalanced(&self) -> Diagnostic {
        Diagnostic::new(
            self.line,
            format!("Unbalanced parentheses in condition: {}", self.text),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(condition: &str) -> Result<Expr, Diagnostic> {
        let source = format!("/*? if {} */\nx", condition);
        let mut parser = Parser::new(&source)?;
        let document = parser.parse_document()?;
        match document.components.into_iter().next() {
            Some(Component::Chain(mut chain)) => Ok(chain.blocks.remove(0).guard.unwrap()),
            other => panic!("expected a chain, got {:?}", other),
        }
    }

    fn word(s: &str) -> Operand {
        Operand::Word(s.to_string())
    }

    fn leaf(s: &str) -> Expr {
        Expr::Leaf(word(s))
    }

    #[test]
    fn test_leaf() {
        assert_eq!(guard("fabric").unwrap(), leaf("fabric"));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            guard("a || b && !c").unwrap(),
            Expr::or(leaf("a"), Expr::and(leaf("b"), Expr::not(leaf("c"))))
        );
        assert_eq!(
            guard("(a || b) && c").unwrap(),
            Expr::and(Expr::or(leaf("a"), leaf("b")), leaf("c"))
        );
    }

    #[test]
    fn test_target_comparison_with_implicit_and() {
        assert_eq!(
            guard(">=1.20 <1.21").unwrap(),
            Expr::and(
                Expr::Compare {
                    left: None,
                    op: CmpOp::Ge,
                    right: word("1.20"),
                },
                Expr::Compare {
                    left: None,
                    op: CmpOp::Lt,
                    right: word("1.21"),
                },
            )
        );
    }

    #[test]
    fn test_binary_comparison() {
        assert_eq!(
            guard("fabric = '0.15'").unwrap(),
            Expr::Compare {
                left: Some(word("fabric")),
                op: CmpOp::Eq,
                right: Operand::Quoted("0.15".to_string()),
            }
        );
    }

    #[test]
    fn test_quoted_leaf() {
        assert_eq!(
            guard("\"has space\"").unwrap(),
            Expr::Leaf(Operand::Quoted("has space".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = guard("(a && b").unwrap_err();
        assert_eq!(err.message, "Unbalanced parentheses in condition: if (a && b");
        let err = guard("a)").unwrap_err();
        assert_eq!(err.message, "Unbalanced parentheses in condition: if a)");
    }

    #[test]
    fn test_missing_operand() {
        let err = guard("a &&").unwrap_err();
        assert_eq!(err.message, "Expected a value after &&");
        let err = guard(">=").unwrap_err();
        assert_eq!(err.message, "Expected a value after >=");
    }

    #[test]
    fn test_juxtaposed_words() {
        let err = guard("a b").unwrap_err();
        assert_eq!(err.message, "Unexpected expression in condition: if a b");
    }

    #[test]
    fn test_empty_guard() {
        let err = guard("").unwrap_err();
        assert_eq!(err.message, "Expression can't be empty");
    }
}
