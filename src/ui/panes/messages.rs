//! Warnings and diagnostics pane rendering

use crate::eval::Warning;
use crate::parser::Diagnostic;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the messages pane for the selected version
pub fn render_messages_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostic: Option<&Diagnostic>,
    warnings: &[Warning],
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
        .title(" Messages ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if diagnostic.is_none() && warnings.is_empty() {
        let paragraph = Paragraph::new("(no warnings)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let mut all_items: Vec<ListItem> = Vec::with_capacity(warnings.len() + 1);
    if let Some(diagnostic) = diagnostic {
        all_items.push(
            ListItem::new(diagnostic.to_string()).style(
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }
    all_items.extend(warnings.iter().map(|warning| {
        ListItem::new(warning.to_string()).style(Style::default().fg(DEFAULT_THEME.secondary))
    }));

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}
