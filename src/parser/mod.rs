//! Directive parser
//!
//! This module turns annotated source text into a directive tree:
//! - [`scanner`]: raw split into code, comment delimiters and comment bodies
//! - [`recognizers`]: configurable token matchers for directive comments
//! - [`lexer`]: refines directive comments into keyword/operator/expression tokens
//! - [`parse`]: directive grouping and the [`Parser`] entry point
//! - [`ast`]: directive tree definitions
//!
//! # Directive Syntax
//!
//! - `/*? if COND */` guards the next line of code
//! - `/*? if COND {*/ ... /*?} elif COND {*/ ... /*?} else {*/ ... /*?}*/`
//! - `/*$ NAME */` and `/*$ NAME {*/ ... /*$}*/` mark text swaps
//!
//! Every other comment is left alone.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent over directives, with guards parsed by a
//! small precedence-ordered expression parser.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod recognizers;
pub mod scanner;
mod statements;
pub mod token;

pub use parse::{Diagnostic, Parser};
