//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: processed file with directive highlighting and change markers
//! - [`messages`]: diagnostic and warnings of the selected version
//! - [`status`]: status bar with keybindings and pass state
//!
//! Each pane module exports a primary `render_*` function and, where needed,
//! a `*RenderData` struct bundling its inputs.

pub mod messages;
pub mod source;
pub mod status;

// Re-export render functions for convenience
pub use messages::render_messages_pane;
pub use source::{render_source_pane, SourceRenderData};
pub use status::{render_status_bar, PassState, StatusRenderData};
