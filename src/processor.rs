//! One-call processing: scan, parse, evaluate, assemble.

use crate::assembler::Assembler;
use crate::eval::{Evaluator, Parameters, Warning};
use crate::parser::lexer::Lexer;
use crate::parser::{Diagnostic, Parser};
use tracing::debug;

/// Output of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub text: String,
    pub warnings: Vec<Warning>,
}

impl Processed {
    /// Whether the pass changed anything in `source`.
    pub fn changed(&self, source: &str) -> bool {
        self.text != source
    }
}

/// Reusable processor holding the directive lexer configuration.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    lexer: Lexer,
}

impl Processor {
    pub fn new(lexer: Lexer) -> Self {
        Self { lexer }
    }

    /// Rewrite `source` for `params`.
    ///
    /// Stops at the first syntax error; no partial text is returned.
    pub fn process(&self, source: &str, params: &Parameters) -> Result<Processed, Diagnostic> {
        let tokens = self.lexer.tokenize(source);
        debug!(tokens = tokens.len(), "scanned source");

        let mut parser = Parser::from_tokens(source, tokens)?;
        let mut document = parser.parse_document()?;
        debug!(
            directives = parser.directive_count(),
            groups = document.directive_count(),
            "parsed directives"
        );

        let mut evaluator = Evaluator::new(params);
        evaluator.evaluate_document(&mut document);
        let mut warnings = evaluator.into_warnings();

        let (text, render_warnings) = Assembler::new(source).render(&document);
        warnings.extend(render_warnings);
        debug!(
            changed = text != source,
            warnings = warnings.len(),
            "assembled output"
        );

        Ok(Processed { text, warnings })
    }
}

/// Process `source` with the default directive syntax.
pub fn process(source: &str, params: &Parameters) -> Result<Processed, Diagnostic> {
    Processor::default().process(source, params)
}
