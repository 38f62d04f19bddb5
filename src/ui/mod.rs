//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI previews one file for every configured version and is organized
//! into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, version selection, writing
//! - **[`panes`]**: stateless render functions for each visible pane (source,
//!   messages, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with the file and its
//! [`Target`]s and call [`App::run`] to start the event loop.
//!
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::{App, Target};
