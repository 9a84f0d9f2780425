use crate::error::PipelineError;
use std::fmt;

/// Method invoked on pipes unless the pipeline is configured otherwise via `Pipeline::via`
pub const DEFAULT_METHOD: &str = "handle";

/// Handle over the remainder of the chain, destination included
///
/// Every stage receives a stack. Calling it hands the payload to the next stage
/// (or to the destination after the last stage) and returns whatever the rest
/// of the chain produced. A stage that never calls its stack ends the run early.
pub struct Stack<'a, T, R = T, E = PipelineError> {
    next: &'a dyn Fn(T) -> Result<R, E>,
}

impl<'a, T, R, E> Stack<'a, T, R, E> {
    pub(crate) fn new(next: &'a dyn Fn(T) -> Result<R, E>) -> Self {
        Self { next }
    }

    /// Pass the payload on to the rest of the chain
    pub fn call(&self, payload: T) -> Result<R, E> {
        (self.next)(payload)
    }
}

impl<T, R, E> Clone for Stack<'_, T, R, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, R, E> Copy for Stack<'_, T, R, E> {}

impl<T, R, E> fmt::Debug for Stack<'_, T, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack").finish_non_exhaustive()
    }
}

/// A pre-built or container-resolved stage
///
/// `handle` is the pipe's default method. Pipes that answer to other method
/// names (selected with `Pipeline::via`) override `responds_to` and
/// `call_method`. Pipes that should still run when they lack the configured
/// method opt into direct invocation through `is_invokable`.
///
/// # Example
/// ```
/// use pipewright::pipeline::{Pipe, Stack};
/// use pipewright::error::PipelineError;
///
/// struct Limit;
///
/// impl Pipe<String> for Limit {
///     fn handle(
///         &self,
///         payload: String,
///         stack: Stack<'_, String>,
///         params: &[String],
///     ) -> Result<String, PipelineError> {
///         let max: usize = params
///             .first()
///             .and_then(|p| p.parse().ok())
///             .unwrap_or(usize::MAX);
///         stack.call(payload.chars().take(max).collect())
///     }
/// }
/// ```
pub trait Pipe<T, R = T, E = PipelineError> {
    /// Run the pipe's default method
    ///
    /// `params` holds the parameters parsed from an identifier such as
    /// `"limit:10"`; it is empty for pipes configured as instances.
    fn handle(&self, payload: T, stack: Stack<'_, T, R, E>, params: &[String]) -> Result<R, E>;

    /// Get pipe name for logging and error reporting
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this pipe exposes a method called `method`
    fn responds_to(&self, method: &str) -> bool {
        method == DEFAULT_METHOD
    }

    /// Invoke the named method
    ///
    /// Only called after `responds_to(method)` returned true.
    fn call_method(
        &self,
        method: &str,
        payload: T,
        stack: Stack<'_, T, R, E>,
        params: &[String],
    ) -> Result<R, E> {
        let _ = method;
        self.handle(payload, stack, params)
    }

    /// Whether the pipe can be called directly when it lacks the configured method
    fn is_invokable(&self) -> bool {
        false
    }

    /// Call the pipe directly
    fn invoke(&self, payload: T, stack: Stack<'_, T, R, E>, params: &[String]) -> Result<R, E> {
        self.handle(payload, stack, params)
    }
}

/// Pipe backed by a closure that also receives identifier parameters
///
/// Answers to every method name, which makes it convenient to register in a
/// container.
pub struct FnPipe<F> {
    name: String,
    func: F,
}

impl<F> FnPipe<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<T, R, E, F> Pipe<T, R, E> for FnPipe<F>
where
    F: Fn(T, Stack<'_, T, R, E>, &[String]) -> Result<R, E>,
{
    fn handle(&self, payload: T, stack: Stack<'_, T, R, E>, params: &[String]) -> Result<R, E> {
        (self.func)(payload, stack, params)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn responds_to(&self, _method: &str) -> bool {
        true
    }

    fn is_invokable(&self) -> bool {
        true
    }
}

/// Convenience constructor for [`FnPipe`]
pub fn pipe_fn<T, R, E, F>(name: impl Into<String>, func: F) -> FnPipe<F>
where
    F: Fn(T, Stack<'_, T, R, E>, &[String]) -> Result<R, E>,
{
    FnPipe::new(name, func)
}
