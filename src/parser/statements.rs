//! Directive statement parsing
//!
//! Classifies each directive and assembles the tree:
//!
//! - `/*? if EXPR */`: bare IF, single-line or an inline block when the
//!   chain continues on the same line
//! - `/*? if EXPR {*/`: scoped IF, body runs to the next chain directive
//! - `/*?} elif EXPR {*/`, `/*?} else {*/`: extensions
//! - `/*?}*/`: chain closer
//! - `/*$ NAME */`, `/*$ NAME {*/ ... /*$}*/`: swaps
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Diagnostic, Directive, Parser, Scope};
use crate::parser::token::{Span, Token, TokenKind};

/// A classified directive.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    Open { guard: Expr, scoped: bool },
    Extend { keyword: Keyword, guard: Option<Expr> },
    Close,
    Swap { name: String, scoped: bool },
    SwapClose,
}

/// Where a bare directive's body ends.
enum BareBody {
    /// Single line ending at this offset.
    Line(usize),
    /// The chain continues on the same line; parse as a scoped block.
    Inline,
}

impl<'a> Parser<'a> {
    /// Parse components until the scope's terminator, which is left unconsumed.
    pub(crate) fn parse_sequence(&mut self, scope: Scope) -> Result<Vec<Component>, Diagnostic> {
        let mut components = Vec::new();

        loop {
            let Some(directive) = self.peek_directive().cloned() else {
                self.take_literal(self.source.len(), &mut components);
                return match scope {
                    Scope::Root => Ok(components),
                    Scope::Condition { line } => {
                        Err(self.error(line, "Conditional block is not closed"))
                    }
                    Scope::Swap { line } => Err(self.error(line, "Swap block is not closed")),
                };
            };
            self.take_literal(directive.span.start, &mut components);

            let statement = self.classify(&directive)?;
            match (statement, scope) {
                (Statement::Extend { .. } | Statement::Close, Scope::Condition { .. })
                | (Statement::SwapClose, Scope::Swap { .. }) => return Ok(components),

                (_, Scope::Swap { .. }) => {
                    return Err(self.nested(&directive));
                }

                (Statement::Open { guard, scoped }, _) => {
                    let chain = self.parse_chain(guard, scoped)?;
                    components.push(Component::Chain(chain));
                }
                (Statement::Swap { name, scoped }, _) => {
                    let swap = self.parse_swap(name, scoped)?;
                    components.push(Component::Swap(swap));
                }

                (Statement::Extend { .. }, Scope::Root) => {
                    return Err(self.error(
                        directive.line,
                        format!("Statement must follow a condition: {}", directive.text),
                    ));
                }
                (Statement::Close, Scope::Root) => {
                    return Err(self.error(directive.line, "Condition block closer without context"));
                }
                (Statement::SwapClose, _) => {
                    return Err(self.error(directive.line, "Swap block closer without context"));
                }
            }
        }
    }

    /// Parse a chain whose opening IF is the next directive.
    fn parse_chain(&mut self, guard: Expr, scoped: bool) -> Result<Chain, Diagnostic> {
        let Some(opener) = self.advance() else {
            return Err(self.error(self.lines.line(self.cursor), "Expected a condition"));
        };

        if !scoped {
            if let BareBody::Line(end) = self.bare_body(&opener)? {
                let mut body = Vec::new();
                self.take_literal(end, &mut body);
                return Ok(Chain {
                    blocks: vec![Block {
                        keyword: Keyword::If,
                        guard: Some(guard),
                        header: opener.span,
                        body,
                        form: BlockForm::SingleLine,
                        line: opener.line,
                        result: false,
                    }],
                    closer: None,
                });
            }
        }

        let body = self.parse_sequence(Scope::Condition { line: opener.line })?;
        let mut blocks = vec![Block {
            keyword: Keyword::If,
            guard: Some(guard),
            header: opener.span,
            body,
            form: BlockForm::Scoped,
            line: opener.line,
            result: false,
        }];

        loop {
            // parse_sequence only returns Ok in a condition scope at an extension or closer
            let Some(next) = self.advance() else {
                return Err(self.error(opener.line, "Conditional block is not closed"));
            };
            match self.classify(&next)? {
                Statement::Close => {
                    return Ok(Chain {
                        blocks,
                        closer: Some(next.span),
                    });
                }
                Statement::Extend { keyword, guard } => {
                    if blocks.last().is_some_and(|b| b.keyword == Keyword::Else) {
                        return Err(self.error(
                            next.line,
                            format!("ELSE must be the last statement of a condition: {}", next.text),
                        ));
                    }
                    let body = self.parse_sequence(Scope::Condition { line: next.line })?;
                    blocks.push(Block {
                        keyword,
                        guard,
                        header: next.span,
                        body,
                        form: BlockForm::Scoped,
                        line: next.line,
                        result: false,
                    });
                }
                _ => return Err(self.error(next.line, "Conditional block is not closed")),
            }
        }
    }

    /// Parse a swap whose opening directive is the next directive.
    fn parse_swap(&mut self, name: String, scoped: bool) -> Result<SwapGroup, Diagnostic> {
        let Some(opener) = self.advance() else {
            return Err(self.error(self.lines.line(self.cursor), "Expected a swap"));
        };

        if !scoped {
            if let BareBody::Line(end) = self.bare_body(&opener)? {
                let body = Span::new(self.cursor, end);
                self.cursor = end;
                return Ok(SwapGroup {
                    name,
                    header: opener.span,
                    body,
                    closer: None,
                    form: BlockForm::SingleLine,
                    line: opener.line,
                    replacement: None,
                });
            }
        }

        let body_start = self.cursor;
        // Swap scopes reject every directive except the closer, so the body is a single run
        self.parse_sequence(Scope::Swap { line: opener.line })?;
        let body = Span::new(body_start, self.cursor);
        let closer = self
            .advance()
            .ok_or_else(|| self.error(opener.line, "Swap block is not closed"))?;

        Ok(SwapGroup {
            name,
            header: opener.span,
            body,
            closer: Some(closer.span),
            form: BlockForm::Scoped,
            line: opener.line,
            replacement: None,
        })
    }

    /// Resolve the body of a bare directive that was just consumed.
    ///
    /// The body runs to the end of the first line holding non-whitespace text.
    /// A directive inside it is only allowed if it continues the same chain.
    fn bare_body(&self, opener: &Directive<'a>) -> Result<BareBody, Diagnostic> {
        let rest = &self.source[self.cursor..];
        let unclosed = if opener.sigil == TokenKind::Swap {
            "Swap block is not closed"
        } else {
            "Conditional block is not closed"
        };
        let content = rest
            .find(|c: char| !c.is_whitespace())
            .ok_or_else(|| self.error(opener.line, unclosed))?;
        let line_end = rest[content..]
            .find(['\n', '\r'])
            .map_or(rest.len(), |idx| content + idx);
        let end = self.cursor + line_end;

        match self.peek_directive() {
            Some(next) if next.span.start < end => {
                if next.sigil == opener.sigil && next.is_continuation() {
                    Ok(BareBody::Inline)
                } else if opener.sigil == TokenKind::Swap && next.sigil != TokenKind::Swap {
                    Err(self.error(
                        next.line,
                        format!(
                            "Swap body can't share a line with a condition directive: {}",
                            next.text
                        ),
                    ))
                } else {
                    Err(self.nested(next))
                }
            }
            _ => Ok(BareBody::Line(end)),
        }
    }

    fn nested(&self, directive: &Directive<'a>) -> Diagnostic {
        self.error(
            directive.line,
            format!("Statements can't be nested: {}", directive.text),
        )
    }

    /// Classify a directive into a [`Statement`].
    pub(crate) fn classify(&self, directive: &Directive<'a>) -> Result<Statement, Diagnostic> {
        let mut tokens: &[Token<'a>] = &directive.tokens;
        if tokens.is_empty() {
            return Err(self.error(directive.line, "Expression can't be empty"));
        }

        let closes = tokens.first().is_some_and(|t| t.kind == TokenKind::CloseScope);
        if closes {
            tokens = &tokens[1..];
        }
        let opens = tokens.last().is_some_and(|t| t.kind == TokenKind::OpenScope);
        if opens {
            tokens = &tokens[..tokens.len() - 1];
        }

        if directive.sigil == TokenKind::Swap {
            return self.classify_swap(directive, tokens, closes, opens);
        }

        if closes && !opens && tokens.is_empty() {
            return Ok(Statement::Close);
        }

        let line = directive.line;
        match tokens.first().map(|t| t.kind) {
            Some(TokenKind::If) => {
                if closes {
                    return Err(self.error(
                        line,
                        format!("Invalid expression {}, must be ELSE or ELIF", directive.text),
                    ));
                }
                let guard = self.parse_guard(&tokens[1..], directive)?;
                Ok(Statement::Open {
                    guard,
                    scoped: opens,
                })
            }
            Some(TokenKind::Else) => {
                let rest = &tokens[1..];
                if rest.first().is_some_and(|t| t.kind == TokenKind::If) {
                    return self.elif(&rest[1..], directive);
                }
                if !rest.is_empty() {
                    return Err(self.error(
                        line,
                        "ELSE statements can't have a condition, use ELIF instead",
                    ));
                }
                Ok(Statement::Extend {
                    keyword: Keyword::Else,
                    guard: None,
                })
            }
            Some(TokenKind::Elif) => self.elif(&tokens[1..], directive),
            _ if closes => Err(self.error(
                line,
                format!("Invalid expression {}, must be ELSE or ELIF", directive.text),
            )),
            _ if opens => Err(self.error(
                line,
                format!("Only IF statement is allowed for openers: {}", directive.text),
            )),
            _ => Err(self.error(
                line,
                format!(
                    "Only IF statement is allowed for single-line expressions: {}",
                    directive.text
                ),
            )),
        }
    }

    fn elif(&self, tokens: &[Token<'a>], directive: &Directive<'a>) -> Result<Statement, Diagnostic> {
        if tokens.is_empty() {
            return Err(self.error(
                directive.line,
                "ELIF statement without a condition, use ELSE instead",
            ));
        }
        let guard = self.parse_guard(tokens, directive)?;
        Ok(Statement::Extend {
            keyword: Keyword::Elif,
            guard: Some(guard),
        })
    }

    fn classify_swap(
        &self,
        directive: &Directive<'a>,
        tokens: &[Token<'a>],
        closes: bool,
        opens: bool,
    ) -> Result<Statement, Diagnostic> {
        if closes {
            if tokens.is_empty() && !opens {
                return Ok(Statement::SwapClose);
            }
            return Err(self.error(
                directive.line,
                format!("Swap closer can't have a name: {}", directive.text),
            ));
        }
        match tokens {
            [name] if name.kind == TokenKind::Expression
                && !name.value.contains(char::is_whitespace) =>
            {
                Ok(Statement::Swap {
                    name: name.value.to_string(),
                    scoped: opens,
                })
            }
            [] => Err(self.error(directive.line, "Expression can't be empty")),
            _ => Err(self.error(
                directive.line,
                format!("Swap directive must name a single swap: {}", directive.text),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Document, Diagnostic> {
        Parser::new(source)?.parse_document()
    }

    fn only_chain(document: &Document) -> &Chain {
        let chains: Vec<_> = document
            .components
            .iter()
            .filter_map(|c| match c {
                Component::Chain(chain) => Some(chain),
                _ => None,
            })
            .collect();
        assert_eq!(chains.len(), 1, "expected exactly one chain");
        chains[0]
    }

    fn body_text(source: &str, block: &Block) -> String {
        block
            .body
            .iter()
            .map(|c| match c {
                Component::Literal(span) => span.slice(source).to_string(),
                _ => String::from("<nested>"),
            })
            .collect()
    }

    #[test]
    fn test_single_line_if() {
        let source = "/*? if fabric */\n    call();\nafter();\n";
        let document = parse(source).unwrap();
        let chain = only_chain(&document);
        assert_eq!(chain.blocks.len(), 1);
        assert_eq!(chain.blocks[0].form, BlockForm::SingleLine);
        assert_eq!(chain.closer, None);
        assert_eq!(body_text(source, &chain.blocks[0]), "\n    call();");
    }

    #[test]
    fn test_inline_block_on_same_line() {
        let source = "/*? if false */code();/*?}*/";
        let document = parse(source).unwrap();
        let chain = only_chain(&document);
        assert_eq!(chain.blocks[0].form, BlockForm::Scoped);
        assert_eq!(body_text(source, &chain.blocks[0]), "code();");
        assert_eq!(chain.closer.map(|s| s.slice(source)), Some("/*?}*/"));
    }

    #[test]
    fn test_scoped_chain() {
        let source = "/*? if a {*/\nA\n/*?} elif b {*/\nB\n/*?} else {*/\nC\n/*?}*/\n";
        let document = parse(source).unwrap();
        let chain = only_chain(&document);
        let keywords: Vec<_> = chain.blocks.iter().map(|b| b.keyword).collect();
        assert_eq!(keywords, vec![Keyword::If, Keyword::Elif, Keyword::Else]);
        assert_eq!(body_text(source, &chain.blocks[1]), "\nB\n");
        assert!(chain.blocks[2].guard.is_none());
        assert_eq!(chain.blocks[1].line, 3);
    }

    #[test]
    fn test_else_if_is_elif() {
        let source = "/*? if a {*/A/*?} else if b {*/B/*?}*/";
        let chain_keywords: Vec<_> = only_chain(&parse(source).unwrap())
            .blocks
            .iter()
            .map(|b| b.keyword)
            .collect();
        assert_eq!(chain_keywords, vec![Keyword::If, Keyword::Elif]);
    }

    #[test]
    fn test_nested_scoped_blocks() {
        let source = "/*? if a {*/\n/*? if b {*/\nx\n/*?}*/\n/*? if c */ y();\n/*?}*/";
        let document = parse(source).unwrap();
        let outer = only_chain(&document);
        let nested = outer.blocks[0]
            .body
            .iter()
            .filter(|c| matches!(c, Component::Chain(_)))
            .count();
        assert_eq!(nested, 2);
        assert_eq!(document.directive_count(), 3);
    }

    #[test]
    fn test_literals_cover_input() {
        let source = "head\n/*? if a {*/\nA\n/*?}*/\ntail";
        let document = parse(source).unwrap();
        match (&document.components[0], &document.components[2]) {
            (Component::Literal(head), Component::Literal(tail)) => {
                assert_eq!(head.slice(source), "head\n");
                assert_eq!(tail.slice(source), "\ntail");
            }
            other => panic!("unexpected components: {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_opener() {
        let err = parse("x\n/*? if true {*/\ncode();\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "Conditional block is not closed");
    }

    #[test]
    fn test_bare_if_without_code() {
        let err = parse("/*? if true */").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.message, "Conditional block is not closed");
    }

    #[test]
    fn test_nested_single_line() {
        let err = parse("/*? if true *//*? if true */x/*?}*/").unwrap_err();
        assert_eq!(err.message, "Statements can't be nested: if true");
    }

    #[test]
    fn test_extension_without_condition() {
        let err = parse("code\n/*?} else {*/\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "Statement must follow a condition: } else {");
    }

    #[test]
    fn test_closer_without_context() {
        let err = parse("/*?}*/").unwrap_err();
        assert_eq!(err.message, "Condition block closer without context");
    }

    #[test]
    fn test_else_with_condition() {
        let err = parse("/*? if a {*/A/*?} else b {*/B/*?}*/").unwrap_err();
        assert_eq!(
            err.message,
            "ELSE statements can't have a condition, use ELIF instead"
        );
    }

    #[test]
    fn test_elif_without_condition() {
        let err = parse("/*? if a {*/A/*?} elif {*/B/*?}*/").unwrap_err();
        assert_eq!(
            err.message,
            "ELIF statement without a condition, use ELSE instead"
        );
    }

    #[test]
    fn test_branch_after_else() {
        let err = parse("/*? if a {*/A/*?} else {*/B/*?} elif c {*/C/*?}*/").unwrap_err();
        assert!(err.message.starts_with("ELSE must be the last statement"));
    }

    #[test]
    fn test_empty_expression() {
        let err = parse("/*?   */").unwrap_err();
        assert_eq!(err.message, "Expression can't be empty");
    }

    #[test]
    fn test_only_if_single_line() {
        let err = parse("/*? fabric */\nx").unwrap_err();
        assert_eq!(
            err.message,
            "Only IF statement is allowed for single-line expressions: fabric"
        );
        let err = parse("/*? fabric {*/\nx/*?}*/").unwrap_err();
        assert_eq!(err.message, "Only IF statement is allowed for openers: fabric {");
    }

    #[test]
    fn test_scoped_swap() {
        let source = "/*$ greeting {*/\"hello\"/*$}*/";
        let document = parse(source).unwrap();
        match &document.components[0] {
            Component::Swap(swap) => {
                assert_eq!(swap.name, "greeting");
                assert_eq!(swap.body.slice(source), "\"hello\"");
                assert_eq!(swap.form, BlockForm::Scoped);
            }
            other => panic!("expected swap, got {:?}", other),
        }
    }

    #[test]
    fn test_single_line_swap() {
        let source = "/*$ call */ legacy();\nnext();";
        let document = parse(source).unwrap();
        match &document.components[0] {
            Component::Swap(swap) => {
                assert_eq!(swap.body.slice(source), " legacy();");
                assert_eq!(swap.form, BlockForm::SingleLine);
            }
            other => panic!("expected swap, got {:?}", other),
        }
    }

    #[test]
    fn test_directive_inside_swap() {
        let err = parse("/*$ name {*/ a /*? if b */ c\n/*$}*/").unwrap_err();
        assert_eq!(err.message, "Statements can't be nested: if b");
    }

    #[test]
    fn test_bare_swap_before_chain_closer() {
        let err = parse("/*? if a {*/ /*$ s */ x(); /*?}*/").unwrap_err();
        assert_eq!(
            err.message,
            "Swap body can't share a line with a condition directive: }"
        );
    }

    #[test]
    fn test_swap_closer_without_context() {
        let err = parse("x /*$}*/").unwrap_err();
        assert_eq!(err.message, "Swap block closer without context");
    }

    #[test]
    fn test_swap_name_must_be_single_word() {
        let err = parse("/*$ two words */ x").unwrap_err();
        assert_eq!(err.message, "Swap directive must name a single swap: two words");
    }
}
