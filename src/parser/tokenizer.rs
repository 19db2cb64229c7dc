use super::error::LexError;
use super::locations::{Location, Span};
use const_format::concatcp;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) lexeme: String,
    pub(crate) span: Span,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}('{}')", self.typ, self.lexeme)
    }
}

#[allow(non_camel_case_types)]
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TokenType {
    ENDMARKER,
    NAME,
    NUMBER,
    STRING,
    KEYWORD,
    NEWLINE,
    INDENT,
    DEDENT,
    LPAR,
    RPAR,
    LBRACE,
    RBRACE,
    COLON,
    COMMA,
    SEMI,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
    GREATER,
    EQUAL,
    EXCLAMATION,
    EQEQUAL,
    NOTEQUAL,
    LESSEQUAL,
    GREATEREQUAL,
    DOUBLEAMPER,
    DOUBLEVBAR,
}

impl TokenType {
    /// How the token kind is named in parse errors.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::ENDMARKER => "end of input",
            Self::NAME => "identifier",
            Self::NUMBER => "number",
            Self::STRING => "string",
            Self::KEYWORD => "keyword",
            Self::NEWLINE => "end of line",
            Self::INDENT => "indented block",
            Self::DEDENT => "end of block",
            Self::LPAR => "'('",
            Self::RPAR => "')'",
            Self::LBRACE => "'{'",
            Self::RBRACE => "'}'",
            Self::COLON => "':'",
            Self::COMMA => "','",
            Self::SEMI => "';'",
            Self::PLUS => "'+'",
            Self::MINUS => "'-'",
            Self::STAR => "'*'",
            Self::SLASH => "'/'",
            Self::LESS => "'<'",
            Self::GREATER => "'>'",
            Self::EQUAL => "'='",
            Self::EXCLAMATION => "'!'",
            Self::EQEQUAL => "'=='",
            Self::NOTEQUAL => "'!='",
            Self::LESSEQUAL => "'<='",
            Self::GREATEREQUAL => "'>='",
            Self::DOUBLEAMPER => "'&&'",
            Self::DOUBLEVBAR => "'||'",
        }
    }
}

/// Width a tab contributes to a line's indentation.
pub const TAB_WIDTH: usize = 4;

const EQEQUAL: (&str, TokenType) = ("==", TokenType::EQEQUAL);
const NOTEQUAL: (&str, TokenType) = ("!=", TokenType::NOTEQUAL);
const LESSEQUAL: (&str, TokenType) = ("<=", TokenType::LESSEQUAL);
const GREATEREQUAL: (&str, TokenType) = (">=", TokenType::GREATEREQUAL);
const DOUBLEAMPER: (&str, TokenType) = ("&&", TokenType::DOUBLEAMPER);
const DOUBLEVBAR: (&str, TokenType) = ("||", TokenType::DOUBLEVBAR);
const LPAR: (&str, TokenType) = ("(", TokenType::LPAR);
const RPAR: (&str, TokenType) = (")", TokenType::RPAR);
const LBRACE: (&str, TokenType) = ("{", TokenType::LBRACE);
const RBRACE: (&str, TokenType) = ("}", TokenType::RBRACE);
const COLON: (&str, TokenType) = (":", TokenType::COLON);
const COMMA: (&str, TokenType) = (",", TokenType::COMMA);
const SEMI: (&str, TokenType) = (";", TokenType::SEMI);
const PLUS: (&str, TokenType) = ("+", TokenType::PLUS);
const MINUS: (&str, TokenType) = ("-", TokenType::MINUS);
const STAR: (&str, TokenType) = ("*", TokenType::STAR);
const SLASH: (&str, TokenType) = ("/", TokenType::SLASH);
const LESS: (&str, TokenType) = ("<", TokenType::LESS);
const GREATER: (&str, TokenType) = (">", TokenType::GREATER);
const EQUAL: (&str, TokenType) = ("=", TokenType::EQUAL);
const EXCLAMATION: (&str, TokenType) = ("!", TokenType::EXCLAMATION);

// Two-character operators come first so they win over their prefixes.
const SIMPLE_TOKENS: [(&str, TokenType); 21] = [
    EQEQUAL,
    NOTEQUAL,
    LESSEQUAL,
    GREATEREQUAL,
    DOUBLEAMPER,
    DOUBLEVBAR,
    LPAR,
    RPAR,
    LBRACE,
    RBRACE,
    COLON,
    COMMA,
    SEMI,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
    GREATER,
    EQUAL,
    EXCLAMATION,
];

macro_rules! alternative {
    ($t:expr) => {{
        $t
    }};
    ($t:expr, $($ts:expr),+) => {{
        concatcp!($t, "|", alternative!($($ts),+))
    }}
}

macro_rules! group {
    ($($ts:expr),+) => {{
        concatcp!(r"(", alternative!($($ts),+), ")")
    }}
}

macro_rules! maybe {
    ($($ts:expr),+) => {
        concatcp!(group!($($ts),+), r"?")
    }
}

const S_INDENTATION: &str = r"^[ \t]*";
const S_WHITESPACE: &str = r"^[ \f\t\r]+";
const S_COMMENT: &str = r"^#";
const S_NAME: &str = r"^[A-Za-z_][A-Za-z0-9_]*";
const S_DIGITS: &str = r"[0-9]+";
const S_NUMBER: &str = concatcp!("^", S_DIGITS, maybe!(concatcp!(r"\.", S_DIGITS)));
const S_KEYWORDS: &str = concatcp!(
    "^",
    group!("let", "print", "if", "else", "while", "for", "function", "return"),
    r"\b"
);
const S_STRING: &str = concatcp!("^", group!(r#""[^"]*""#, r"'[^']*'"));

static INDENTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_INDENTATION).expect("Error compiling regex."));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_WHITESPACE).expect("Error compiling regex."));
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(S_COMMENT).expect("Error compiling regex."));
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(S_NAME).expect("Error compiling regex."));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(S_NUMBER).expect("Error compiling regex."));
static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_KEYWORDS).expect("Error compiling regex."));
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(S_STRING).expect("Error compiling regex."));

/// Outcome of feeding lines to a [`Tokenizer`].
#[derive(Debug, PartialEq)]
pub enum TokenizerState {
    Ok,
    /// An open parenthesis, an open indented block or a trailing `:` means
    /// more lines are expected.
    ContinuationNeeded,
    Error(LexError),
}

/// Line-oriented tokenizer. One instance tokenizes one program; it may be
/// fed that program's lines in several chunks.
pub struct Tokenizer {
    tokens: Vec<Token>,
    start: usize,
    lineno: usize,
    paren_lvl: usize,
    indent: Vec<usize>,
    tokens_added: usize,
    block_opened: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            tokens: vec![],
            start: 0,
            lineno: 0,
            paren_lvl: 0,
            indent: vec![0],
            tokens_added: 0,
            block_opened: false,
        }
    }

    pub fn tokenize<'a>(&mut self, input: impl IntoIterator<Item = &'a str>) -> TokenizerState {
        for line in input {
            self.lineno += 1;
            if let Err(e) = self.tokenize_line(line) {
                return TokenizerState::Error(e);
            }
        }
        if self.paren_lvl > 0 || self.indent.len() > 1 || self.block_opened {
            return TokenizerState::ContinuationNeeded;
        }
        TokenizerState::Ok
    }

    /// Closes every open indentation level and appends the end marker.
    pub fn finalize(mut self) -> Vec<Token> {
        let span = Span::new(self.lineno + 1, 0, self.lineno + 1, 0);
        for _ in 1..self.indent.len() {
            self.tokens.push(Token {
                typ: TokenType::DEDENT,
                lexeme: String::new(),
                span,
            });
        }
        self.tokens.push(Token {
            typ: TokenType::ENDMARKER,
            lexeme: String::new(),
            span,
        });
        debug!(count = self.tokens.len(), "tokenized source");
        self.tokens
    }

    fn tokenize_line(&mut self, line: &str) -> Result<(), LexError> {
        self.start = 0;
        self.tokens_added = 0;

        let content = line.trim_start();
        if content.is_empty() || COMMENT.is_match(content) {
            return Ok(());
        }

        if self.paren_lvl == 0 {
            if let Some(m) = INDENTATION.find(line) {
                let width = m
                    .as_str()
                    .chars()
                    .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
                    .sum();
                self.indent_to(width)?;
                self.start = m.end();
            }
        }

        while self.start < line.len() {
            let rest = &line[self.start..];
            if let Some(m) = WHITESPACE.find(rest) {
                self.start += m.end();
                continue;
            }
            if COMMENT.is_match(rest) {
                break;
            }
            if self.find_by_regex(&KEYWORD, TokenType::KEYWORD, line) {
                continue;
            }
            if let Some(m) = NUMBER.find(rest) {
                let end = self.start + m.end();
                if line[end..].starts_with('.') {
                    return Err(LexError::MalformedNumber {
                        lexeme: line[self.start..=end].to_string(),
                        location: self.location(),
                    });
                }
                self.push(TokenType::NUMBER, m.as_str().to_string(), end);
                continue;
            }
            if self.find_by_regex(&NAME, TokenType::NAME, line) {
                continue;
            }
            if rest.starts_with(['"', '\'']) {
                let Some(m) = STRING.find(rest) else {
                    return Err(LexError::UnterminatedString {
                        location: self.location(),
                    });
                };
                let quoted = m.as_str();
                let end = self.start + m.end();
                self.push(TokenType::STRING, quoted[1..quoted.len() - 1].to_string(), end);
                continue;
            }
            if let Some((lexeme, tok_type)) = SIMPLE_TOKENS
                .iter()
                .find(|(lexeme, _)| rest.starts_with(lexeme))
            {
                match tok_type {
                    TokenType::LPAR | TokenType::LBRACE => self.paren_lvl += 1,
                    TokenType::RPAR | TokenType::RBRACE if self.paren_lvl == 0 => {
                        return Err(LexError::UnmatchedClose {
                            character: rest.chars().next().unwrap_or_default(),
                            location: self.location(),
                        });
                    }
                    TokenType::RPAR | TokenType::RBRACE => self.paren_lvl -= 1,
                    _ => {}
                }
                let end = self.start + lexeme.len();
                self.push(*tok_type, lexeme.to_string(), end);
                continue;
            }
            let character = rest.chars().next().unwrap_or_default();
            return Err(LexError::UnexpectedCharacter {
                character,
                location: self.location(),
            });
        }

        if self.tokens_added > 0 && self.paren_lvl == 0 {
            self.block_opened = self
                .tokens
                .last()
                .is_some_and(|t| t.typ == TokenType::COLON);
            let span = Span::new(self.lineno, line.len(), self.lineno, line.len());
            self.tokens.push(Token {
                typ: TokenType::NEWLINE,
                lexeme: String::new(),
                span,
            });
        }
        Ok(())
    }

    fn indent_to(&mut self, width: usize) -> Result<(), LexError> {
        let span = Span::new(self.lineno, 0, self.lineno, width);
        if width > self.current_indent() {
            trace!(line = self.lineno, width, "indent");
            self.indent.push(width);
            self.tokens.push(Token {
                typ: TokenType::INDENT,
                lexeme: String::new(),
                span,
            });
            return Ok(());
        }
        while width < self.current_indent() {
            trace!(line = self.lineno, width, "dedent");
            self.indent.pop();
            self.tokens.push(Token {
                typ: TokenType::DEDENT,
                lexeme: String::new(),
                span,
            });
        }
        if width != self.current_indent() {
            return Err(LexError::InconsistentIndentation { line: self.lineno });
        }
        Ok(())
    }

    fn current_indent(&self) -> usize {
        self.indent.last().copied().unwrap_or(0)
    }

    fn location(&self) -> Location {
        Location {
            line: self.lineno,
            column: self.start,
        }
    }

    fn push(&mut self, typ: TokenType, lexeme: String, end: usize) {
        self.tokens.push(Token {
            typ,
            lexeme,
            span: Span::new(self.lineno, self.start, self.lineno, end),
        });
        self.start = end;
        self.tokens_added += 1;
    }

    fn find_by_regex(&mut self, regex: &Regex, token_type: TokenType, line: &str) -> bool {
        if let Some(m) = regex.find(&line[self.start..]) {
            let end = self.start + m.end();
            self.push(token_type, m.as_str().to_string(), end);
            return true;
        }
        false
    }
}

/// Tokenizes a complete program.
pub fn tokenize_string(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokenizer = Tokenizer::new();
    match tokenizer.tokenize(source.lines()) {
        TokenizerState::Error(e) => Err(e),
        TokenizerState::Ok | TokenizerState::ContinuationNeeded => Ok(tokenizer.finalize()),
    }
}
