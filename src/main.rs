use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lumen::config::DEFAULT_MAX_CALL_DEPTH;
use lumen::{parse, parse_source, tokenize_string, Config, Interpreter, Tokenizer, TokenizerState};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run. Starts an interactive session when neither a file nor
    /// `--eval` is given.
    file: Option<PathBuf>,

    /// Runs SOURCE instead of reading a file.
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,

    /// Nested function calls allowed before evaluation is aborted.
    #[arg(long, env = "LUMEN_MAX_CALL_DEPTH", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Prints the token stream instead of running the program.
    #[arg(long)]
    tokens: bool,

    /// Prints the syntax tree instead of running the program.
    #[arg(long, conflicts_with = "tokens")]
    ast: bool,
}

fn main() {
    init_tracing();
    let args = Args::parse();
    let config = Config::default().with_max_call_depth(args.max_call_depth);

    let source = match (args.eval, &args.file) {
        (Some(source), _) => source,
        (None, Some(path)) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read '{}': {e}", path.display());
            std::process::exit(1);
        }),
        (None, None) => return run_repl(config),
    };

    let result = if args.tokens {
        dump_tokens(&source)
    } else if args.ast {
        parse_source(&source).map(|program| println!("{program:#?}"))
    } else {
        lumen::run_with_output(&source, io::stdout(), config).map(|_| ())
    };
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber, but only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn dump_tokens(source: &str) -> Result<(), lumen::Error> {
    for token in tokenize_string(source)? {
        println!("{token}");
    }
    Ok(())
}

fn run_repl(config: Config) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let mut interpreter = Interpreter::with_output(io::stdout(), config);
    let mut tokenizer = Tokenizer::new();
    let mut pending = false;
    loop {
        let readline = rl.readline(if pending { ".. " } else { ">> " });
        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        };
        let _ = rl.add_history_entry(line.as_str());

        // An empty line closes any open indented block.
        if !(pending && line.trim().is_empty()) {
            match tokenizer.tokenize([line.as_str()]) {
                TokenizerState::ContinuationNeeded => {
                    pending = true;
                    continue;
                }
                TokenizerState::Error(e) => {
                    eprintln!("{e}");
                    tokenizer = Tokenizer::new();
                    pending = false;
                    continue;
                }
                TokenizerState::Ok => {}
            }
        }
        pending = false;
        let tokens = std::mem::take(&mut tokenizer).finalize();
        let result = parse(&tokens)
            .map_err(lumen::Error::from)
            .and_then(|program| Ok(interpreter.execute(&program)?));
        if let Err(e) = result {
            eprintln!("{e}");
        }
    }
}
