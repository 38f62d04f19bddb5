//! Source pane rendering with directive highlighting
//!
//! This module renders the processed file for the selected version.
//!
//! # Features
//!
//! - Directive comments (`/*?`, `/*$`) and plain comments in distinct colors
//! - Lines that differ from the input highlighted with a change marker
//! - The diagnostic line of a failed pass highlighted in red
//! - Line numbering and scroll clamping
//!
//! # Rendering
//!
//! Comments can span lines, so the highlighter carries the open comment kind
//! from one line to the next instead of re-scanning the whole file.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Kind of comment open at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Directive,
    Plain,
}

impl CommentKind {
    fn style(self) -> Style {
        match self {
            CommentKind::Directive => Style::default()
                .fg(DEFAULT_THEME.directive)
                .add_modifier(Modifier::BOLD),
            CommentKind::Plain => Style::default().fg(DEFAULT_THEME.comment),
        }
    }
}

/// Highlight one line, updating `open` with the comment still open at its end.
pub fn highlight_line<'a>(line: &'a str, open: &mut Option<CommentKind>) -> Line<'a> {
    let mut spans = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        match *open {
            Some(kind) => match rest.find("*/") {
                Some(idx) => {
                    spans.push(Span::styled(&rest[..idx + 2], kind.style()));
                    rest = &rest[idx + 2..];
                    *open = None;
                }
                None => {
                    spans.push(Span::styled(rest, kind.style()));
                    rest = "";
                }
            },
            None => match rest.find("/*") {
                Some(idx) => {
                    if idx > 0 {
                        spans.push(Span::styled(
                            &rest[..idx],
                            Style::default().fg(DEFAULT_THEME.fg),
                        ));
                    }
                    let after = &rest[idx + 2..];
                    let kind = match after.chars().next() {
                        Some('?' | '$') => CommentKind::Directive,
                        _ => CommentKind::Plain,
                    };
                    match after.find("*/") {
                        Some(end) => {
                            spans.push(Span::styled(&rest[idx..idx + end + 4], kind.style()));
                            rest = &after[end + 2..];
                        }
                        None => {
                            spans.push(Span::styled(&rest[idx..], kind.style()));
                            *open = Some(kind);
                            rest = "";
                        }
                    }
                }
                None => {
                    spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.fg)));
                    rest = "";
                }
            },
        }
    }

    Line::from(spans)
}

/// Data needed to render the source pane.
pub struct SourceRenderData<'a> {
    pub title: &'a str,
    pub text: &'a str,
    /// Input text the output is compared against.
    pub original: &'a str,
    /// Line of the diagnostic, if the pass failed.
    pub error_line: Option<usize>,
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: &SourceRenderData<'_>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" {} ", data.title))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = data.text.lines().collect();
    let original: Vec<&str> = data.original.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    if total_lines > visible_height {
        *scroll_offset = (*scroll_offset).min(total_lines - visible_height);
    } else {
        *scroll_offset = 0;
    }

    // Comment state has to be tracked from the top, even for hidden lines
    let mut open = None;
    let mut visible_lines = Vec::with_capacity(visible_height);
    for (idx, line) in lines.iter().enumerate() {
        let mut content = highlight_line(line, &mut open);
        if idx < *scroll_offset {
            continue;
        }
        if visible_lines.len() >= visible_height {
            break;
        }

        let line_num = idx + 1;
        let changed = original.get(idx) != Some(line);
        let is_error = data.error_line == Some(line_num);

        let (marker, num_style) = if is_error {
            (
                "!",
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            )
        } else if changed {
            ("~", Style::default().fg(DEFAULT_THEME.success))
        } else {
            (" ", Style::default().fg(DEFAULT_THEME.comment))
        };

        if is_error {
            for span in &mut content.spans {
                span.style = span.style.bg(DEFAULT_THEME.error).fg(Color::White);
            }
        } else if changed {
            for span in &mut content.spans {
                span.style = span.style.bg(DEFAULT_THEME.changed_line_bg);
            }
        }

        let mut spans = vec![Span::styled(format!("{:4}{} ", line_num, marker), num_style)];
        spans.extend(content.spans);
        visible_lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
