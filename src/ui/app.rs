//! Main TUI application state and logic

use crate::eval::Parameters;
use crate::parser::Diagnostic;
use crate::processor::{Processed, Processor};
use crate::ui::panes::{PassState, SourceRenderData, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Lines moved by PageUp/PageDown.
const PAGE: usize = 20;

/// A version the file can be previewed for.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub params: Parameters,
}

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Messages,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Messages,
            FocusedPane::Messages => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// File being previewed
    pub path: PathBuf,

    /// Current contents of the file
    pub source: String,

    /// Versions to cycle through
    pub targets: Vec<Target>,

    /// Processing result per target, same order as `targets`
    pub outputs: Vec<Result<Processed, Diagnostic>>,

    /// Index of the selected target
    pub selected: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub messages_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    processor: Processor,
}

impl App {
    /// Create a new app previewing `source` for every target
    pub fn new(path: PathBuf, source: String, targets: Vec<Target>) -> Self {
        let mut app = App {
            path,
            source,
            targets,
            outputs: Vec::new(),
            selected: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            messages_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            processor: Processor::default(),
        };
        app.reprocess();
        app
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Output of the selected target
    pub fn current(&self) -> Option<&Result<Processed, Diagnostic>> {
        self.outputs.get(self.selected)
    }

    /// Pass state of the selected target
    pub fn pass_state(&self) -> PassState {
        match self.current() {
            Some(Ok(processed)) if processed.changed(&self.source) => PassState::Changed,
            Some(Ok(_)) | None => PassState::Clean,
            Some(Err(_)) => PassState::Failed,
        }
    }

    fn reprocess(&mut self) {
        self.outputs = self
            .targets
            .iter()
            .map(|target| self.processor.process(&self.source, &target.params))
            .collect();
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Source on top, messages below, status bar at the bottom
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(7),
                Constraint::Length(1),
            ])
            .split(size);

        let label = self
            .targets
            .get(self.selected)
            .map_or("no version", |t| t.label.as_str());
        let state = self.pass_state();
        let (text, diagnostic, warnings) = match self.outputs.get(self.selected) {
            Some(Ok(processed)) => (processed.text.as_str(), None, processed.warnings.as_slice()),
            Some(Err(diagnostic)) => (self.source.as_str(), Some(diagnostic), &[][..]),
            None => (self.source.as_str(), None, &[][..]),
        };

        let title = self.path.display().to_string();
        super::panes::render_source_pane(
            frame,
            chunks[0],
            &SourceRenderData {
                title: &title,
                text,
                original: &self.source,
                error_line: diagnostic.map(|d| d.line),
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_messages_pane(
            frame,
            chunks[1],
            diagnostic,
            warnings,
            self.focused_pane == FocusedPane::Messages,
            &mut self.messages_scroll,
        );

        super::panes::render_status_bar(
            frame,
            chunks[2],
            &StatusRenderData {
                message: &self.status_message,
                version: label,
                selected: self.selected,
                total: self.targets.len(),
                state,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        self.handle_key(key.code);
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => self.select_previous(),
            KeyCode::Right => self.select_next(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(PAGE),
            KeyCode::PageDown => self.scroll_down(PAGE),
            KeyCode::Home => *self.scroll_mut() = 0,
            KeyCode::Char('w') | KeyCode::Char('W') => self.write_selected(),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        if self.targets.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.targets.len();
        self.after_select();
    }

    fn select_previous(&mut self) {
        if self.targets.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.targets.len() - 1);
        self.after_select();
    }

    fn after_select(&mut self) {
        self.messages_scroll = 0;
        self.status_message = match self.current() {
            Some(Ok(processed)) if processed.warnings.is_empty() => String::from("Processed"),
            Some(Ok(processed)) => format!("Processed with {} warning(s)", processed.warnings.len()),
            Some(Err(diagnostic)) => diagnostic.to_string(),
            None => String::new(),
        };
    }

    /// Write the selected version's output to the file
    fn write_selected(&mut self) {
        let text = match self.current() {
            Some(Ok(processed)) => processed.text.clone(),
            Some(Err(diagnostic)) => {
                self.status_message = format!("Cannot write: {}", diagnostic);
                return;
            }
            None => return,
        };
        if text == self.source {
            self.status_message = String::from("Already up to date");
            return;
        }
        match fs::write(&self.path, &text) {
            Ok(()) => {
                info!(path = %self.path.display(), "wrote selected version");
                self.source = text;
                self.reprocess();
                let label = self
                    .targets
                    .get(self.selected)
                    .map_or("", |t| t.label.as_str());
                self.status_message = format!("Wrote {} to {}", label, self.path.display());
            }
            Err(e) => {
                self.status_message = format!("Write failed: {}", e);
            }
        }
    }

    // ===== Helper methods =====

    fn scroll_mut(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Messages => &mut self.messages_scroll,
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        let scroll = self.scroll_mut();
        *scroll = scroll.saturating_sub(lines);
    }

    // Clamped to the content when the pane renders
    fn scroll_down(&mut self, lines: usize) {
        let scroll = self.scroll_mut();
        *scroll = scroll.saturating_add(lines);
    }
}
