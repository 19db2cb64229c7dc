mod ast;
mod error;
mod grammar;
mod locations;
pub mod tokenizer;

pub use ast::*;
pub use error::{LexError, ParseError};
pub use grammar::{parse, ParseResult};
pub use locations::{Locatable, Location, Span};
pub use tokenizer::{tokenize_string, Token, Tokenizer, TokenizerState};

#[cfg(test)]
mod test;
