use thiserror::Error;

use crate::parser::Location;

/// Errors that abort evaluation. None of them is recoverable from inside a
/// program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("UnboundVariableError: variable '{name}' is not defined at {location}")]
    UnboundVariable { name: String, location: Location },
    #[error("UndefinedFunctionError: function '{name}' is not defined at {location}")]
    UndefinedFunction { name: String, location: Location },
    #[error(
        "ArityError: function '{name}' expected {expected}, got {found} arguments at {location}"
    )]
    Arity {
        name: String,
        expected: usize,
        found: usize,
        location: Location,
    },
    #[error("TypeError: operator '{operator}' expects numeric operands, got {found} at {location}")]
    Type {
        operator: String,
        found: String,
        location: Location,
    },
    #[error("RecursionLimitError: maximum call depth of {limit} exceeded at {location}")]
    RecursionLimit { limit: usize, location: Location },
    #[error("OutputError: {0}")]
    Output(#[from] std::io::Error),
}

pub type EvalResult<T> = Result<T, RuntimeError>;
