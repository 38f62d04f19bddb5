//! Guard evaluation
//!
//! This module decides which blocks are active for a parameter set:
//! - [`context`]: the [`Parameters`] a pass is evaluated against
//! - [`version`]: dotted numeric versions and operand comparison
//! - [`engine`]: the [`Evaluator`] and the [`Warning`] channel
//!
//! # Evaluation Model
//!
//! Evaluation never fails. Unknown constants, unknown swaps and comparisons
//! against a missing target version evaluate to `false` and leave a warning.
//! Within a chain the first true branch wins and every later branch is forced
//! false; everything nested in an inactive block is inactive as well.

pub mod context;
pub mod engine;
pub mod version;

pub use context::Parameters;
pub use engine::{evaluate, Evaluator, Warning};
pub use version::Version;
