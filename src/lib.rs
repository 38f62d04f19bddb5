//! # Introduction
//!
//! Chisel rewrites source files for a target version by toggling code that is
//! guarded by directives embedded in block comments. The unprocessed file
//! stays valid code, and processing only adds or removes comment delimiters,
//! so line numbers never move.
//!
//! ```text
//! /*? if >=1.20 {*/
//! modern();
//! /*?} else {*/
//! /*legacy();*/
//! /*?}*/
//! ```
//!
//! ## Processing pipeline
//!
//! ```text
//! Source → Scanner → Lexer → Parser → Document → Evaluator → Assembler → Text
//! ```
//!
//! 1. [`parser`] splits comments from code, refines directive comments into
//!    tokens and builds the directive tree.
//! 2. [`eval`] decides which blocks are active for a [`eval::Parameters`] set
//!    and resolves swaps.
//! 3. [`assembler`] regenerates the text, wrapping or unwrapping block bodies.
//! 4. [`processor`] runs the whole pipeline for one file.
//! 5. [`config`] loads per-version parameters from a JSON project file.
//! 6. [`ui`] previews the output of every version in a terminal UI; not part of
//!    the stable library API.
//!
//! ## Guarantees
//!
//! Processing is idempotent and preserves the line count. A syntax error stops
//! the file with a [`parser::Diagnostic`]; evaluation problems only produce
//! [`eval::Warning`]s.

pub mod assembler;
pub mod config;
pub mod eval;
pub mod parser;
pub mod processor;
pub mod ui;

pub use processor::{process, Processed, Processor};
