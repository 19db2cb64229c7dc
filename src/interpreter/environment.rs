//! Chained lexical scopes.
//!
//! An [`Environment`] is a cheap handle onto a shared scope frame. Frames
//! are reference counted: a frame lives as long as the scope that created it
//! or any [`Function`] that captured it as its closure, whichever is longer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use derivative::Derivative;

use super::error::{EvalResult, RuntimeError};
use super::value::Value;
use crate::parser::{Block, FunctionDeclaration, Name};

/// A user-defined function paired with the scope it was defined in.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Function {
    pub(crate) declaration: Rc<FunctionDeclaration>,
    #[derivative(Debug = "ignore")]
    pub(crate) closure: Environment,
}

impl Function {
    pub fn parameters(&self) -> &[Name] {
        &self.declaration.parameters
    }

    pub fn body(&self) -> &Block {
        &self.declaration.body
    }
}

#[derive(Default)]
struct Frame {
    variables: HashMap<String, Value>,
    functions: HashMap<String, Rc<Function>>,
    parent: Option<Environment>,
}

#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    /// Creates a root scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope nested inside `self`.
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            parent: Some(self.clone()),
            ..Frame::default()
        })))
    }

    /// Binds `name` in this scope only, replacing any existing binding here.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().variables.insert(name.to_string(), value);
    }

    /// Updates the innermost scope that already binds `name`.
    pub fn assign(&self, name: &Name, value: Value) -> EvalResult<()> {
        let mut scope = self.clone();
        loop {
            let mut frame = scope.0.borrow_mut();
            if let Some(slot) = frame.variables.get_mut(name.as_str()) {
                *slot = value;
                return Ok(());
            }
            let Some(parent) = frame.parent.clone() else {
                return Err(unbound(name));
            };
            drop(frame);
            scope = parent;
        }
    }

    pub fn lookup(&self, name: &Name) -> EvalResult<Value> {
        self.find(|frame| frame.variables.get(name.as_str()).cloned())
            .ok_or_else(|| unbound(name))
    }

    pub fn define_function(&self, name: &str, function: Function) {
        self.0
            .borrow_mut()
            .functions
            .insert(name.to_string(), Rc::new(function));
    }

    /// Function lookup misses are not errors here; the caller decides.
    pub fn lookup_function(&self, name: &str) -> Option<Rc<Function>> {
        self.find(|frame| frame.functions.get(name).cloned())
    }

    fn find<T>(&self, get: impl Fn(&Frame) -> Option<T>) -> Option<T> {
        let mut scope = self.clone();
        loop {
            let frame = scope.0.borrow();
            if let Some(found) = get(&frame) {
                return Some(found);
            }
            let parent = frame.parent.clone()?;
            drop(frame);
            scope = parent;
        }
    }
}

fn unbound(name: &Name) -> RuntimeError {
    RuntimeError::UnboundVariable {
        name: name.to_string(),
        location: name.span.start,
    }
}
