use thiserror::Error;

use super::locations::Location;

/// Failures raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("LexError: unexpected character '{character}' at {location}")]
    UnexpectedCharacter { character: char, location: Location },
    #[error("LexError: unterminated string literal starting at {location}")]
    UnterminatedString { location: Location },
    #[error("LexError: unmatched '{character}' at {location}")]
    UnmatchedClose { character: char, location: Location },
    #[error("LexError: malformed number '{lexeme}' at {location}")]
    MalformedNumber { lexeme: String, location: Location },
    #[error(
        "LexError: indentation of line {line} does not match any enclosing indentation level"
    )]
    InconsistentIndentation { line: usize },
}

/// Failures raised while building the syntax tree from tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("ParseError: expected {expected} but found {found} at {location}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },
    #[error("ParseError: invalid assignment target at {location}")]
    InvalidAssignmentTarget { location: Location },
    #[error("ParseError: integer literal '{lexeme}' is too large at {location}")]
    IntegerTooLarge { lexeme: String, location: Location },
}
