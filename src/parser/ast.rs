use std::rc::Rc;

use derivative::Derivative;

use super::locations::Span;
use super::tokenizer::{Token, TokenType as TT};

/// A sequence of statements; the root of every program and the body of
/// every compound statement.
#[derive(Debug, Clone, Default)]
pub struct Block(pub Vec<Statement>);

impl Block {
    pub fn statements(&self) -> &[Statement] {
        &self.0
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum Statement {
    Let(Name, Expression, #[derivative(Debug = "ignore")] Span),
    Print(Expression, #[derivative(Debug = "ignore")] Span),
    If(
        Expression,
        Block,
        Option<Block>,
        #[derivative(Debug = "ignore")] Span,
    ),
    While(Expression, Block, #[derivative(Debug = "ignore")] Span),
    For(
        Option<Box<Statement>>, // init
        Option<Expression>,     // condition
        Option<Expression>,     // update
        Block,
        #[derivative(Debug = "ignore")] Span,
    ),
    FunctionDef(Rc<FunctionDeclaration>, #[derivative(Debug = "ignore")] Span),
    Return(Option<Expression>, #[derivative(Debug = "ignore")] Span),
    Expression(Expression, #[derivative(Debug = "ignore")] Span),
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum Expression {
    Assign(Name, Box<Expression>, #[derivative(Debug = "ignore")] Span),
    Name(Name),
    Number(Number, #[derivative(Debug = "ignore")] Span),
    String(String, #[derivative(Debug = "ignore")] Span),
    BinaryOperation(
        Operator,
        Box<(Expression, Expression)>,
        #[derivative(Debug = "ignore")] Span,
    ),
    UnaryOperation(Operator, Box<Expression>, #[derivative(Debug = "ignore")] Span),
    Call(Name, Vec<Expression>, #[derivative(Debug = "ignore")] Span),
}

#[derive(Clone)]
pub struct Name {
    pub(crate) name: String,
    pub(crate) span: Span,
}

impl Name {
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name(\"{}\")", self.name)
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<Token> for Name {
    fn from(value: Token) -> Self {
        Self {
            name: value.lexeme,
            span: value.span,
        }
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self {
            name: value.to_string(),
            span: Span::default(),
        }
    }
}

#[derive(Debug)]
pub struct FunctionDeclaration {
    pub(crate) name: Name,
    pub(crate) parameters: Vec<Name>,
    pub(crate) body: Block,
}

impl FunctionDeclaration {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Or,
    And,
    Not,
    Plus,
    Minus,
    Times,
    Divide,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Not => "!",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// Operator tables, one per precedence level, lowest first.
pub(super) const DISJUNCTION: [(TT, Operator); 1] = [(TT::DOUBLEVBAR, Operator::Or)];
pub(super) const CONJUNCTION: [(TT, Operator); 1] = [(TT::DOUBLEAMPER, Operator::And)];
pub(super) const EQUALITY: [(TT, Operator); 2] = [
    (TT::EQEQUAL, Operator::Equal),
    (TT::NOTEQUAL, Operator::NotEqual),
];
pub(super) const COMPARISON: [(TT, Operator); 4] = [
    (TT::LESS, Operator::LessThan),
    (TT::LESSEQUAL, Operator::LessThanEqual),
    (TT::GREATER, Operator::GreaterThan),
    (TT::GREATEREQUAL, Operator::GreaterThanEqual),
];
pub(super) const SUM: [(TT, Operator); 2] = [
    (TT::PLUS, Operator::Plus),
    (TT::MINUS, Operator::Minus),
];
pub(super) const TERM: [(TT, Operator); 2] = [
    (TT::STAR, Operator::Times),
    (TT::SLASH, Operator::Divide),
];
pub(super) const UNARY: [(TT, Operator); 2] = [
    (TT::EXCLAMATION, Operator::Not),
    (TT::MINUS, Operator::Minus),
];
