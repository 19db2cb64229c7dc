//! Lumen: a small indentation-sensitive scripting language.
//!
//! Source text goes through the [`Tokenizer`], the recursive-descent
//! [`parse`]r and finally the tree-walking [`Interpreter`].

use std::io::{self, Write};

use thiserror::Error;

pub mod config;
pub mod interpreter;
pub mod parser;
mod stack;

pub use config::Config;
pub use interpreter::{FlowControl, Interpreter, RuntimeError, Value};
pub use parser::tokenizer::{tokenize_string, Tokenizer, TokenizerState};
pub use parser::{parse, Block, LexError, ParseError, ParseResult};

/// Any failure on the way from source text to a result.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Tokenizes and parses a complete program.
pub fn parse_source(source: &str) -> Result<Block, Error> {
    let tokens = tokenize_string(source)?;
    Ok(parse(&tokens)?)
}

/// Runs a program, printing to stdout.
pub fn run(source: &str) -> Result<Value, Error> {
    run_with_output(source, io::stdout(), Config::default())
}

/// Runs a program with a fresh global scope, printing to `out`.
pub fn run_with_output<W: Write>(source: &str, out: W, config: Config) -> Result<Value, Error> {
    let program = parse_source(source)?;
    let mut interpreter = Interpreter::with_output(out, config);
    Ok(interpreter.execute(&program)?)
}
