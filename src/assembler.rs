//! Text rewriting for evaluated directive trees.
//!
//! The [`Assembler`] regenerates the source from a [`Document`], copying
//! directive comments and top-level text verbatim and toggling the body text
//! of every block by one comment layer:
//!
//! | desired  | body currently | action            |
//! |----------|----------------|-------------------|
//! | active   | `/*...*/`      | strip one layer   |
//! | inactive | bare           | wrap in `/*...*/` |
//! | active   | bare           | none              |
//! | inactive | `/*...*/`      | none              |
//!
//! Bodies are toggled per literal segment between nested directives, and the
//! delimiters go inside the segment's leading and trailing whitespace. No line
//! break is ever added or removed, so line numbers survive every pass.

use crate::eval::Warning;
use crate::parser::ast::*;
use crate::parser::lexer::{CONDITION_SIGIL, SWAP_SIGIL};
use crate::parser::scanner::{COMMENT_END, COMMENT_START};
use crate::parser::token::{LineIndex, Span};
use tracing::warn;

/// Result of toggling one body segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle<'a> {
    /// Text unchanged: blank, or already in the desired state.
    Unchanged,
    /// New text for the segment.
    Rewritten(String),
    /// Body holds a stray `*/`; left alone.
    Malformed(&'a str),
    /// Body starts with a directive sigil and would parse as a directive once wrapped.
    Sigil(&'a str),
}

/// Split `text` into leading whitespace, core and trailing whitespace.
fn split_core(text: &str) -> (&str, &str, &str) {
    let core_start = text.len() - text.trim_start().len();
    let core_end = text.trim_end().len().max(core_start);
    (
        &text[..core_start],
        &text[core_start..core_end],
        &text[core_end..],
    )
}

/// Content of a core that is exactly one `/*...*/` comment.
///
/// Returns `Err` when the core is delimited but holds another `*/` inside.
fn unwrap_core(core: &str) -> Option<Result<&str, ()>> {
    let delimited = core.len() >= COMMENT_START.len() + COMMENT_END.len()
        && core.starts_with(COMMENT_START)
        && core.ends_with(COMMENT_END);
    if !delimited {
        return None;
    }
    let inner = &core[COMMENT_START.len()..core.len() - COMMENT_END.len()];
    Some(if inner.contains(COMMENT_END) {
        Err(())
    } else {
        Ok(inner)
    })
}

/// Bring one body segment into the desired activation state.
pub fn toggle(text: &str, active: bool) -> Toggle<'_> {
    let (lead, core, trail) = split_core(text);
    if core.is_empty() {
        return Toggle::Unchanged;
    }
    match (unwrap_core(core), active) {
        (Some(Ok(inner)), true) => Toggle::Rewritten(format!("{}{}{}", lead, inner, trail)),
        (Some(Ok(_)), false) => Toggle::Unchanged,
        (Some(Err(())), _) => Toggle::Malformed(core),
        (None, true) => Toggle::Unchanged,
        (None, false) if core.contains(COMMENT_END) => Toggle::Malformed(core),
        (None, false) if core.starts_with([CONDITION_SIGIL, SWAP_SIGIL]) => Toggle::Sigil(core),
        (None, false) => Toggle::Rewritten(format!(
            "{}{}{}{}{}",
            lead, COMMENT_START, core, COMMENT_END, trail
        )),
    }
}

fn line_breaks(text: &str) -> usize {
    text.matches('\n').count()
}

/// Whether `text` is blank or a single comment.
pub fn is_wrapped(text: &str) -> bool {
    let (_, core, _) = split_core(text);
    core.is_empty() || matches!(unwrap_core(core), Some(Ok(_)))
}

/// Rewrites a source file from its evaluated [`Document`].
pub struct Assembler<'a> {
    source: &'a str,
    lines: LineIndex,
    output: String,
    warnings: Vec<Warning>,
}

impl<'a> Assembler<'a> {
    pub fn new(source: &'a str) -> Self {
        Assembler {
            source,
            lines: LineIndex::new(source),
            output: String::with_capacity(source.len() + 16),
            warnings: Vec::new(),
        }
    }

    /// Render `document`, returning the new text and any warnings.
    pub fn render(mut self, document: &Document) -> (String, Vec<Warning>) {
        self.components(&document.components, None);
        (self.output, self.warnings)
    }

    /// `state` is `None` at top level, where text passes through.
    fn components(&mut self, components: &[Component], state: Option<bool>) {
        for component in components {
            match component {
                Component::Literal(span) => match state {
                    None => self.copy(*span),
                    Some(active) => self.body(*span, active),
                },
                Component::Chain(chain) => {
                    for block in &chain.blocks {
                        self.copy(block.header);
                        self.components(&block.body, Some(block.result));
                    }
                    if let Some(closer) = chain.closer {
                        self.copy(closer);
                    }
                }
                Component::Swap(swap) => {
                    self.copy(swap.header);
                    self.swap(swap, state.unwrap_or(true));
                    if let Some(closer) = swap.closer {
                        self.copy(closer);
                    }
                }
            }
        }
    }

    fn body(&mut self, span: Span, active: bool) {
        let text = span.slice(self.source);
        match toggle(text, active) {
            Toggle::Unchanged => self.output.push_str(text),
            Toggle::Rewritten(new) => self.output.push_str(&new),
            Toggle::Malformed(_) => {
                self.warn(span, "Malformed wrapping: body already contains a comment end");
                self.output.push_str(text);
            }
            Toggle::Sigil(core) => {
                self.warn(
                    span,
                    format!("Can't wrap body starting with '{}'; left unchanged", &core[..1]),
                );
                self.output.push_str(text);
            }
        }
    }

    /// Active swaps get their trimmed core replaced by the trimmed replacement,
    /// keeping the body's surrounding whitespace. A single-line swap never gets
    /// an empty core, since the next pass would take the following line as its body.
    fn swap(&mut self, swap: &SwapGroup, active: bool) {
        let text = swap.body.slice(self.source);
        if !active {
            self.body(swap.body, false);
            return;
        }

        let activated = match toggle(text, true) {
            Toggle::Rewritten(new) => new,
            Toggle::Unchanged | Toggle::Sigil(_) => text.to_string(),
            Toggle::Malformed(_) => {
                self.warn(swap.body, "Malformed wrapping: body already contains a comment end");
                text.to_string()
            }
        };
        let Some(replacement) = &swap.replacement else {
            self.output.push_str(&activated);
            return;
        };

        let (lead, core, trail) = split_core(&activated);
        let replacement = replacement.trim();
        if replacement.is_empty() && swap.form == BlockForm::SingleLine {
            self.warn(
                swap.body,
                format!(
                    "Swap '{}' replacement is empty on a single-line swap; left unchanged",
                    swap.name
                ),
            );
            self.output.push_str(&activated);
            return;
        }
        if line_breaks(core) != line_breaks(replacement) {
            self.warn(
                swap.body,
                format!(
                    "Swap '{}' replacement changes the line count; left unchanged",
                    swap.name
                ),
            );
            self.output.push_str(&activated);
            return;
        }
        self.output.push_str(lead);
        self.output.push_str(replacement);
        self.output.push_str(trail);
    }

    // ===== Helper methods =====

    fn copy(&mut self, span: Span) {
        self.output.push_str(span.slice(self.source));
    }

    fn warn(&mut self, span: Span, message: impl Into<String>) {
        let text = span.slice(self.source);
        let offset = span.start + (text.len() - text.trim_start().len());
        let warning = Warning::new(self.lines.line(offset), message);
        warn!(line = warning.line, "{}", warning.message);
        self.warnings.push(warning);
    }
}
