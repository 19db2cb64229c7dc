//! Tree-walking evaluator.

mod environment;
mod error;
mod operators;
mod value;

pub use environment::{Environment, Function};
pub use error::{EvalResult, RuntimeError};
pub use value::Value;

use std::io::{self, Write};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::Config;
use crate::parser::{Block, Expression, Locatable, Name, Operator, Span, Statement};
use crate::stack::ensure_sufficient_stack;
use operators::Operand;

/// Outcome of executing a statement. `Return` unwinds every enclosing block
/// up to the nearest function call, or the program itself at top level.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowControl {
    NextStatement(Value),
    Return(Value),
}

impl FlowControl {
    pub fn into_value(self) -> Value {
        match self {
            Self::NextStatement(value) | Self::Return(value) => value,
        }
    }
}

/// Executes programs against a persistent global scope, writing `print`
/// output to `W`.
pub struct Interpreter<W: Write = io::Stdout> {
    globals: Environment,
    out: W,
    config: Config,
    depth: usize,
}

impl Interpreter<io::Stdout> {
    pub fn new(config: Config) -> Self {
        Self::with_output(io::stdout(), config)
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W, config: Config) -> Self {
        Self {
            globals: Environment::new(),
            out,
            config,
            depth: 0,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs `program` in the global scope and returns the value of the last
    /// statement executed. Bindings persist across calls.
    pub fn execute(&mut self, program: &Block) -> EvalResult<Value> {
        debug!(statements = program.statements().len(), "executing program");
        let globals = self.globals.clone();
        self.depth = 0;
        let result = self.evaluate_block(program, &globals);
        self.out.flush()?;
        Ok(result?.into_value())
    }

    fn evaluate_block(&mut self, block: &Block, env: &Environment) -> EvalResult<FlowControl> {
        ensure_sufficient_stack(|| self.evaluate_statements(block, env))
    }

    fn evaluate_statements(&mut self, block: &Block, env: &Environment) -> EvalResult<FlowControl> {
        let mut last = Value::Null;
        for statement in block.statements() {
            match self.evaluate(statement, env)? {
                FlowControl::NextStatement(value) => last = value,
                flow @ FlowControl::Return(_) => return Ok(flow),
            }
        }
        Ok(FlowControl::NextStatement(last))
    }

    pub fn evaluate(&mut self, statement: &Statement, env: &Environment) -> EvalResult<FlowControl> {
        match statement {
            Statement::Let(name, expr, _) => {
                let value = self.evaluate_expr(expr, env)?;
                env.define(name.as_str(), value.clone());
                Ok(FlowControl::NextStatement(value))
            }
            Statement::Print(expr, _) => {
                let value = self.evaluate_expr(expr, env)?;
                writeln!(self.out, "{value}")?;
                Ok(FlowControl::NextStatement(value))
            }
            // Branch and loop bodies share the enclosing scope, so a `let`
            // inside them stays visible afterwards.
            Statement::If(condition, then_block, else_block, _) => {
                if self.evaluate_expr(condition, env)?.is_truthy() {
                    self.evaluate_block(then_block, env)
                } else if let Some(else_block) = else_block {
                    self.evaluate_block(else_block, env)
                } else {
                    Ok(FlowControl::NextStatement(Value::Null))
                }
            }
            Statement::While(condition, body, _) => {
                let mut last = Value::Null;
                while self.evaluate_expr(condition, env)?.is_truthy() {
                    match self.evaluate_block(body, env)? {
                        FlowControl::NextStatement(value) => last = value,
                        flow @ FlowControl::Return(_) => return Ok(flow),
                    }
                }
                Ok(FlowControl::NextStatement(last))
            }
            Statement::For(init, condition, update, body, _) => {
                let scope = env.child();
                trace!("entering for-loop scope");
                if let Some(init) = init {
                    self.evaluate(init, &scope)?;
                }
                let mut last = Value::Null;
                loop {
                    if let Some(condition) = condition {
                        if !self.evaluate_expr(condition, &scope)?.is_truthy() {
                            break;
                        }
                    }
                    match self.evaluate_block(body, &scope)? {
                        FlowControl::NextStatement(value) => last = value,
                        flow @ FlowControl::Return(_) => return Ok(flow),
                    }
                    if let Some(update) = update {
                        self.evaluate_expr(update, &scope)?;
                    }
                }
                Ok(FlowControl::NextStatement(last))
            }
            Statement::FunctionDef(declaration, _) => {
                debug!(function = %declaration.name(), arity = declaration.arity(), "defining function");
                let function = Function {
                    declaration: Rc::clone(declaration),
                    closure: env.clone(),
                };
                env.define_function(declaration.name().as_str(), function);
                Ok(FlowControl::NextStatement(Value::Null))
            }
            Statement::Return(expr, _) => {
                let value = match expr {
                    Some(expr) => self.evaluate_expr(expr, env)?,
                    None => Value::Null,
                };
                Ok(FlowControl::Return(value))
            }
            Statement::Expression(expr, _) => {
                Ok(FlowControl::NextStatement(self.evaluate_expr(expr, env)?))
            }
        }
    }

    /// Evaluates an expression, growing the stack first when it runs low.
    pub fn evaluate_expr(&mut self, expression: &Expression, env: &Environment) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.evaluate_expr_inner(expression, env))
    }

    fn evaluate_expr_inner(&mut self, expression: &Expression, env: &Environment) -> EvalResult<Value> {
        match expression {
            Expression::Assign(name, value, _) => {
                let value = self.evaluate_expr(value, env)?;
                env.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Name(name) => env.lookup(name),
            Expression::Number(number, _) => Ok((*number).into()),
            Expression::String(string, _) => Ok(Value::String(string.clone())),
            Expression::BinaryOperation(op, operands, _) => {
                let (lhs, rhs) = operands.as_ref();
                // Both operands are always evaluated, `&&` and `||` included.
                let left = self.evaluate_expr(lhs, env)?;
                let right = self.evaluate_expr(rhs, env)?;
                operators::binary(*op, &left, &right).map_err(|operand| match operand {
                    Operand::Left => type_error(*op, &left, lhs),
                    Operand::Right => type_error(*op, &right, rhs),
                })
            }
            Expression::UnaryOperation(op, operand, _) => {
                let value = self.evaluate_expr(operand, env)?;
                operators::unary(*op, &value).ok_or_else(|| type_error(*op, &value, operand))
            }
            Expression::Call(name, arguments, span) => self.call(name, arguments, *span, env),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(function = %name, depth = self.depth))]
    fn call(
        &mut self,
        name: &Name,
        arguments: &[Expression],
        span: Span,
        env: &Environment,
    ) -> EvalResult<Value> {
        let function = env.lookup_function(name.as_str()).ok_or_else(|| {
            RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location: span.start,
            }
        })?;
        let expected = function.parameters().len();
        if arguments.len() != expected {
            return Err(RuntimeError::Arity {
                name: name.to_string(),
                expected,
                found: arguments.len(),
                location: span.start,
            });
        }
        if self.depth >= self.config.max_call_depth {
            return Err(RuntimeError::RecursionLimit {
                limit: self.config.max_call_depth,
                location: span.start,
            });
        }

        let values = arguments
            .iter()
            .map(|argument| self.evaluate_expr(argument, env))
            .collect::<EvalResult<Vec<_>>>()?;
        let scope = function.closure.child();
        for (parameter, value) in function.parameters().iter().zip(values) {
            scope.define(parameter.as_str(), value);
        }

        self.depth += 1;
        let result = self.evaluate_block(function.body(), &scope);
        self.depth -= 1;
        let value = result?.into_value();
        trace!(result = %value, "returned");
        Ok(value)
    }
}

fn type_error(op: Operator, value: &Value, operand: &Expression) -> RuntimeError {
    let found = match value {
        Value::String(s) => format!("string \"{s}\""),
        Value::Null => "null".to_string(),
        other => format!("{} {other}", other.type_name()),
    };
    RuntimeError::Type {
        operator: op.to_string(),
        found,
        location: operand.span().start,
    }
}
