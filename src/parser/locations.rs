use super::ast::{Expression, Name, Statement};
use super::tokenizer::Token;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

pub trait Locatable {
    fn span(&self) -> Span;
}

/// Source range of a token or syntax node. Lines are 1-based, columns 0-based.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub(crate) fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Location {
                line: start_line,
                column: start_col,
            },
            end: Location {
                line: end_line,
                column: end_col,
            },
        }
    }

    pub(crate) fn till<R: Locatable>(&self, other: &R) -> Self {
        Self {
            start: self.start,
            end: other.span().end,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl Locatable for Span {
    fn span(&self) -> Span {
        *self
    }
}

impl Locatable for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl<R> Locatable for Box<R>
where
    R: Locatable,
{
    fn span(&self) -> Span {
        (**self).span()
    }
}

impl Locatable for Name {
    fn span(&self) -> Span {
        self.span
    }
}

impl Locatable for Statement {
    fn span(&self) -> Span {
        match self {
            Self::Let(_, _, s) => *s,
            Self::Print(_, s) => *s,
            Self::If(_, _, _, s) => *s,
            Self::While(_, _, s) => *s,
            Self::For(_, _, _, _, s) => *s,
            Self::FunctionDef(_, s) => *s,
            Self::Return(_, s) => *s,
            Self::Expression(_, s) => *s,
        }
    }
}

impl Locatable for Expression {
    fn span(&self) -> Span {
        match self {
            Self::Assign(_, _, s) => *s,
            Self::Name(name) => name.span,
            Self::Number(_, s) => *s,
            Self::String(_, s) => *s,
            Self::BinaryOperation(_, _, s) => *s,
            Self::UnaryOperation(_, _, s) => *s,
            Self::Call(_, _, s) => *s,
        }
    }
}
