use super::core::{Pipe, Stack};
use crate::error::PipelineError;
use std::fmt;

/// Closure stage: receives the payload and the stack
pub type StageFn<T, R, E> = Box<dyn Fn(T, Stack<'_, T, R, E>) -> Result<R, E>>;

/// One entry of a pipeline's ordered stage list
///
/// The kind is decided when the stage is configured and dispatched on once per
/// invocation. Identifiers are parsed and resolved lazily, so a malformed or
/// unknown identifier only surfaces when the chain reaches it.
pub enum Stage<T, R = T, E = PipelineError> {
    /// Closure invoked as `stage(payload, stack)`
    Callable(StageFn<T, R, E>),

    /// `name` or `name:param1,param2`, resolved through the pipeline's container
    Identifier(String),

    /// Already constructed pipe
    Instance(Box<dyn Pipe<T, R, E>>),
}

impl<T, R, E> Stage<T, R, E> {
    /// Create a callable stage
    pub fn callable<F>(func: F) -> Self
    where
        F: Fn(T, Stack<'_, T, R, E>) -> Result<R, E> + 'static,
    {
        Stage::Callable(Box::new(func))
    }

    /// Create an identifier stage
    pub fn identifier(identifier: impl Into<String>) -> Self {
        Stage::Identifier(identifier.into())
    }

    /// Create an instance stage
    pub fn instance<P>(pipe: P) -> Self
    where
        P: Pipe<T, R, E> + 'static,
    {
        Stage::Instance(Box::new(pipe))
    }

    /// Short description of the stage for logs
    pub fn label(&self) -> &str {
        match self {
            Stage::Callable(_) => "<callable>",
            Stage::Identifier(identifier) => identifier,
            Stage::Instance(pipe) => pipe.name(),
        }
    }
}

impl<T, R, E> From<&str> for Stage<T, R, E> {
    fn from(identifier: &str) -> Self {
        Stage::Identifier(identifier.to_string())
    }
}

impl<T, R, E> From<String> for Stage<T, R, E> {
    fn from(identifier: String) -> Self {
        Stage::Identifier(identifier)
    }
}

impl<T, R, E> From<Box<dyn Pipe<T, R, E>>> for Stage<T, R, E> {
    fn from(pipe: Box<dyn Pipe<T, R, E>>) -> Self {
        Stage::Instance(pipe)
    }
}

impl<T, R, E> fmt::Debug for Stage<T, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Callable(_) => f.write_str("Callable"),
            Stage::Identifier(identifier) => f.debug_tuple("Identifier").field(identifier).finish(),
            Stage::Instance(pipe) => f.debug_tuple("Instance").field(&pipe.name()).finish(),
        }
    }
}

/// A parsed identifier stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeIdentifier {
    pub name: String,
    pub params: Vec<String>,
}

/// Split an identifier into its name and parameter list
///
/// Only the first `:` separates the name from the parameters; the remainder is
/// split on `,` without trimming or unescaping. `"limit:"` therefore yields a
/// single empty parameter.
pub fn parse_pipe_string(identifier: &str) -> PipeIdentifier {
    match identifier.split_once(':') {
        Some((name, params)) => PipeIdentifier {
            name: name.to_string(),
            params: params.split(',').map(str::to_string).collect(),
        },
        None => PipeIdentifier {
            name: identifier.to_string(),
            params: Vec::new(),
        },
    }
}
