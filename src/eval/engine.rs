// Guard evaluation and chain resolution

use crate::eval::context::Parameters;
use crate::eval::version::{compare, Version};
use crate::parser::ast::*;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Non-fatal problem found while processing a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// 1-based line in the original text.
    pub line: usize,
    pub message: String,
}

impl Warning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning at line {}: {}", self.line, self.message)
    }
}

/// Evaluates guards against a [`Parameters`] set and records warnings.
pub struct Evaluator<'p> {
    params: &'p Parameters,
    warnings: Vec<Warning>,
}

impl<'p> Evaluator<'p> {
    pub fn new(params: &'p Parameters) -> Self {
        Evaluator {
            params,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Evaluate one guard. `line` is only used for warnings.
    pub fn evaluate(&mut self, expr: &Expr, line: usize) -> bool {
        match expr {
            Expr::Leaf(operand) => self.leaf(operand, line),
            Expr::Compare { left, op, right } => {
                let left = match left {
                    Some(operand) => self.operand(operand).to_string(),
                    None => match self.target(line) {
                        Some(version) => version.to_string(),
                        None => return false,
                    },
                };
                compare(&left, *op, self.operand(right))
            }
            Expr::Not(inner) => !self.evaluate(inner, line),
            Expr::And(left, right) => self.evaluate(left, line) && self.evaluate(right, line),
            Expr::Or(left, right) => self.evaluate(left, line) || self.evaluate(right, line),
        }
    }

    /// Set every block result and resolve swap replacements, in place.
    pub fn evaluate_document(&mut self, document: &mut Document) {
        self.evaluate_components(&mut document.components, true);
    }

    fn evaluate_components(&mut self, components: &mut [Component], active: bool) {
        for component in components {
            match component {
                Component::Literal(_) => {}
                Component::Chain(chain) => self.evaluate_chain(chain, active),
                Component::Swap(swap) => {
                    swap.replacement = if active {
                        self.replacement(swap)
                    } else {
                        None
                    };
                }
            }
        }
    }

    /// At most one block of a chain ends up true. Guards after the first
    /// match, or under an inactive parent, are not evaluated.
    fn evaluate_chain(&mut self, chain: &mut Chain, active: bool) {
        let mut matched = false;
        for block in &mut chain.blocks {
            let result = active
                && !matched
                && match &block.guard {
                    Some(guard) => self.evaluate(guard, block.line),
                    None => true,
                };
            block.result = result;
            matched |= result;
            self.evaluate_components(&mut block.body, result);
        }
    }

    fn replacement(&mut self, swap: &SwapGroup) -> Option<String> {
        let replacement = self.params.swaps.get(&swap.name).cloned();
        if replacement.is_none() {
            self.warn(swap.line, format!("Unknown swap '{}'", swap.name));
        }
        replacement
    }

    // ===== Helper methods =====

    fn leaf(&mut self, operand: &Operand, line: usize) -> bool {
        let name = operand.text();
        if let Some(value) = self.params.constants.get(name) {
            return *value;
        }
        if let Operand::Word(word) = operand {
            match word.as_str() {
                "true" => return true,
                "false" => return false,
                _ => {}
            }
            if let Some(expected) = Version::parse(word) {
                return match self.target(line) {
                    Some(target) => target == expected,
                    None => false,
                };
            }
        }
        self.warn(line, format!("Unknown constant '{}'", name));
        false
    }

    /// Quoted operands are literal text; words naming a dependency resolve to its version.
    fn operand<'e>(&'e self, operand: &'e Operand) -> &'e str {
        match operand {
            Operand::Quoted(text) => text,
            Operand::Word(word) => self
                .params
                .dependencies
                .get(word)
                .map_or(word.as_str(), String::as_str),
        }
    }

    fn target(&mut self, line: usize) -> Option<Version> {
        let Some(raw) = self.params.version.as_deref() else {
            self.warn(line, "Version comparison without a target version");
            return None;
        };
        let version = Version::parse(raw);
        if version.is_none() {
            self.warn(line, format!("Target version '{}' is not a numeric version", raw));
        }
        version
    }

    fn warn(&mut self, line: usize, message: impl Into<String>) {
        let warning = Warning::new(line, message);
        warn!(line = warning.line, "{}", warning.message);
        self.warnings.push(warning);
    }
}

/// Evaluate a guard without collecting warnings.
pub fn evaluate(expr: &Expr, params: &Parameters) -> bool {
    Evaluator::new(params).evaluate(expr, 0)
}
