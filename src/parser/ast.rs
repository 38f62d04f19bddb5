// Directive tree definitions

use super::token::Span;
use std::fmt;

/// Directive keyword of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Elif,
    Else,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::If => write!(f, "IF"),
            Keyword::Elif => write!(f, "ELIF"),
            Keyword::Else => write!(f, "ELSE"),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// Comparison operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Unquoted word: a dependency name, a version or plain text.
    Word(String),
    /// Quoted text, quotes stripped.
    Quoted(String),
}

impl Operand {
    pub fn text(&self) -> &str {
        match self {
            Operand::Word(s) | Operand::Quoted(s) => s,
        }
    }
}

/// Guard expression of a conditional block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Bare operand: a constant, or a version matched against the target.
    Leaf(Operand),
    /// `left op right`; a missing `left` stands for the target version.
    Compare {
        left: Option<Operand>,
        op: CmpOp,
        right: Operand,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }
}

/// How a block's body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockForm {
    /// Bare directive guarding the next line of code.
    SingleLine,
    /// Body runs to the next directive of the same chain.
    Scoped,
}

/// One branch of a conditional chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub keyword: Keyword,
    /// Absent for `ELSE`.
    pub guard: Option<Expr>,
    /// The directive comment, delimiters included.
    pub header: Span,
    pub body: Vec<Component>,
    pub form: BlockForm,
    /// Line of the directive.
    pub line: usize,
    /// Set by the evaluator; forced false once an earlier branch matched.
    pub result: bool,
}

/// `IF` followed by any `ELIF`s and an optional trailing `ELSE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub blocks: Vec<Block>,
    /// Closing directive; absent for single-line chains.
    pub closer: Option<Span>,
}

/// Named text substitution.
///
/// Swap bodies can't contain directives, so the body is a single span.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapGroup {
    pub name: String,
    pub header: Span,
    pub body: Span,
    pub closer: Option<Span>,
    pub form: BlockForm,
    pub line: usize,
    /// Resolved by the evaluator; `None` for unknown swaps.
    pub replacement: Option<String>,
}

/// Node of the directive tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Passthrough text.
    Literal(Span),
    Chain(Chain),
    Swap(SwapGroup),
}

/// Parsed file: top-level components covering the whole input in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub components: Vec<Component>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chains and swaps, nested ones included.
    pub fn directive_count(&self) -> usize {
        fn count(components: &[Component]) -> usize {
            components
                .iter()
                .map(|c| match c {
                    Component::Literal(_) => 0,
                    Component::Chain(chain) => {
                        1 + chain.blocks.iter().map(|b| count(&b.body)).sum::<usize>()
                    }
                    Component::Swap(_) => 1,
                })
                .sum()
        }
        count(&self.components)
    }
}
