//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the [`Diagnostic`] error type
//! and the shared cursor helpers.
//!
//! # Parser Architecture
//!
//! Parsing happens over directives rather than over every token: the refined
//! token stream is first grouped into [`Directive`]s (one per `/*?`/`/*$`
//! comment), and the code between them is implied by the gaps. This keeps
//! literal spans exact even when a single-line body ends in the middle of a
//! text token.
//!
//! - This module: Parser struct, directive grouping, helpers
//! - `statements`: directive classification and block/chain/swap assembly
//! - `expressions`: guard expressions with precedence climbing
//!
//! Parser methods are split across files using `impl Parser` blocks, as in the
//! rest of the crate.

use crate::parser::ast::*;
use crate::parser::lexer::Lexer;
use crate::parser::scanner::COMMENT_START;
use crate::parser::token::{LineIndex, Span, Token, TokenKind};
use thiserror::Error;

/// Syntax error that stops processing of the current file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error at line {line}: {message}")]
pub struct Diagnostic {
    /// 1-based line in the original text.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One directive comment, delimiters included.
#[derive(Debug, Clone)]
pub(crate) struct Directive<'a> {
    /// [`TokenKind::Condition`] or [`TokenKind::Swap`].
    pub(crate) sigil: TokenKind,
    pub(crate) span: Span,
    /// Tokens between the sigil and the closing `*/`.
    pub(crate) tokens: Vec<Token<'a>>,
    pub(crate) line: usize,
    /// Directive text after the sigil, trimmed. Used in messages.
    pub(crate) text: &'a str,
}

impl Directive<'_> {
    /// Whether this directive extends or closes an open chain of its kind.
    pub(crate) fn is_continuation(&self) -> bool {
        match self.tokens.first().map(|t| t.kind) {
            Some(TokenKind::CloseScope) => true,
            Some(TokenKind::Elif | TokenKind::Else) => self.sigil == TokenKind::Condition,
            _ => false,
        }
    }
}

/// Parser for directive trees.
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) directives: Vec<Directive<'a>>,
    /// Index of the next unconsumed directive.
    pub(crate) position: usize,
    /// Byte offset up to which the source has been assigned to components.
    pub(crate) cursor: usize,
    pub(crate) lines: LineIndex,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, Diagnostic> {
        Self::with_lexer(source, &Lexer::default())
    }

    pub fn with_lexer(source: &'a str, lexer: &Lexer) -> Result<Self, Diagnostic> {
        Self::from_tokens(source, lexer.tokenize(source))
    }

    /// Build a parser over an already refined token stream of `source`.
    pub fn from_tokens(source: &'a str, tokens: Vec<Token<'a>>) -> Result<Self, Diagnostic> {
        let lines = LineIndex::new(source);
        let directives = group_directives(source, &lines, tokens)?;
        Ok(Self {
            source,
            directives,
            position: 0,
            cursor: 0,
            lines,
        })
    }

    /// Parse the whole input into a [`Document`].
    pub fn parse_document(&mut self) -> Result<Document, Diagnostic> {
        let mut document = Document::new();
        document.components = self.parse_sequence(Scope::Root)?;
        Ok(document)
    }

    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    // ===== Helper methods =====

    pub(crate) fn peek_directive(&self) -> Option<&Directive<'a>> {
        self.directives.get(self.position)
    }

    /// Consume the next directive, moving the cursor past it.
    pub(crate) fn advance(&mut self) -> Option<Directive<'a>> {
        let directive = self.directives.get(self.position)?.clone();
        self.position += 1;
        self.cursor = directive.span.end;
        Some(directive)
    }

    /// Push the text between the cursor and `end` as a literal.
    pub(crate) fn take_literal(&mut self, end: usize, out: &mut Vec<Component>) {
        if end > self.cursor {
            out.push(Component::Literal(Span::new(self.cursor, end)));
            self.cursor = end;
        }
    }

    pub(crate) fn error(&self, line: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(line, message)
    }
}

/// Where a run of components is being parsed, and what may end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Root,
    /// Body of a conditional block opened at `line`.
    Condition { line: usize },
    /// Body of a swap opened at `line`.
    Swap { line: usize },
}

fn group_directives<'a>(
    source: &'a str,
    lines: &LineIndex,
    tokens: Vec<Token<'a>>,
) -> Result<Vec<Directive<'a>>, Diagnostic> {
    let mut directives = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token.kind != TokenKind::CommentStart {
            continue;
        }
        let sigil = match iter.peek() {
            Some(next) if matches!(next.kind, TokenKind::Condition | TokenKind::Swap) => next.kind,
            _ => continue,
        };
        iter.next();

        let line = lines.line(token.span.start);
        let mut inner = Vec::new();
        let mut end = None;
        for next in iter.by_ref() {
            if next.kind == TokenKind::CommentEnd {
                end = Some(next.span.end);
                break;
            }
            inner.push(next);
        }

        let end = end.ok_or_else(|| Diagnostic::new(line, "Expression wasn't correctly closed"))?;
        let span = Span::new(token.span.start, end);
        let content = &source[token.span.end + 1..end - 2];
        if content.contains(COMMENT_START) {
            return Err(Diagnostic::new(line, "Expression wasn't correctly closed"));
        }

        directives.push(Directive {
            sigil,
            span,
            tokens: inner,
            line,
            text: content.trim(),
        });
    }

    Ok(directives)
}
