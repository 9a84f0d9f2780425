//! Name-to-pipe resolution for identifier stages
//!
//! The pipeline only depends on the [`Container`] contract. [`PipeRegistry`]
//! is a plain map of factories for callers that have no container of their own.

use super::core::{Pipe, Stack, DEFAULT_METHOD};
use crate::error::{PipelineError, ResolveError};
use std::collections::HashMap;

/// Resolves the name portion of an identifier stage into a pipe instance
pub trait Container<T, R = T, E = PipelineError>: Send + Sync {
    /// Produce a fresh pipe for `name`
    fn resolve(&self, name: &str) -> Result<Box<dyn Pipe<T, R, E>>, ResolveError>;
}

type PipeFactory<T, R, E> =
    Box<dyn Fn() -> Result<Box<dyn Pipe<T, R, E>>, String> + Send + Sync>;

/// Container backed by a map of named factories
///
/// # Example
/// ```
/// use pipewright::pipeline::{pipe_fn, Container, PipeRegistry, Stack};
///
/// let mut registry: PipeRegistry<i32> = PipeRegistry::new();
/// registry.register("double", || {
///     pipe_fn("double", |n: i32, stack: Stack<'_, i32>, _params: &[String]| stack.call(n * 2))
/// });
///
/// assert!(registry.contains("double"));
/// assert!(registry.resolve("double").is_ok());
/// ```
pub struct PipeRegistry<T, R = T, E = PipelineError> {
    factories: HashMap<String, PipeFactory<T, R, E>>,
}

impl<T, R, E> PipeRegistry<T, R, E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<P, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        P: Pipe<T, R, E> + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.factories.insert(
            name.into(),
            Box::new(move || Ok::<_, String>(Box::new(factory()) as Box<dyn Pipe<T, R, E>>)),
        );
        self
    }

    /// Register a factory that may fail to construct its pipe
    pub fn register_fallible<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn Pipe<T, R, E>>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Check if a factory is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Get all registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T, R, E> Default for PipeRegistry<T, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R, E> Container<T, R, E> for PipeRegistry<T, R, E> {
    fn resolve(&self, name: &str) -> Result<Box<dyn Pipe<T, R, E>>, ResolveError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ResolveError::NotRegistered(name.to_string()))?;

        factory().map_err(|reason| ResolveError::ConstructionFailed {
            name: name.to_string(),
            reason,
        })
    }
}

/// Stand-in for an identifier that could not be resolved
///
/// It exposes no methods and cannot be invoked, so reaching it in the chain
/// fails with [`PipelineError::NotInvokable`] naming the identifier.
pub(crate) struct UnresolvedPipe {
    identifier: String,
}

impl UnresolvedPipe {
    pub(crate) fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

impl<T, R, E> Pipe<T, R, E> for UnresolvedPipe
where
    E: From<PipelineError>,
{
    fn handle(&self, _payload: T, _stack: Stack<'_, T, R, E>, _params: &[String]) -> Result<R, E> {
        Err(PipelineError::NotInvokable {
            pipe: self.identifier.clone(),
            method: DEFAULT_METHOD.to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        &self.identifier
    }

    fn responds_to(&self, _method: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::core::pipe_fn;

    fn add_pipe() -> impl Pipe<i32> {
        pipe_fn("add", |n: i32, stack: Stack<'_, i32>, params: &[String]| {
            let amount: i32 = params.first().and_then(|p| p.parse().ok()).unwrap_or(1);
            stack.call(n + amount)
        })
    }

    fn identity(payload: i32) -> Result<i32, PipelineError> {
        Ok(payload)
    }

    #[test]
    fn test_registry_resolves_registered_pipe() {
        let mut registry: PipeRegistry<i32> = PipeRegistry::new();
        registry.register("add", add_pipe);

        let pipe = registry.resolve("add").unwrap();
        let stack: Stack<'_, i32> = Stack::new(&identity);
        assert_eq!(pipe.handle(1, stack, &["4".to_string()]).unwrap(), 5);
    }

    #[test]
    fn test_registry_missing_name() {
        let registry: PipeRegistry<i32> = PipeRegistry::new();
        let result = registry.resolve("missing");
        assert!(matches!(result, Err(ResolveError::NotRegistered(ref n)) if n == "missing"));
    }

    #[test]
    fn test_registry_construction_failure() {
        let mut registry: PipeRegistry<i32> = PipeRegistry::new();
        registry.register_fallible("broken", || Err("missing dependency".to_string()));

        match registry.resolve("broken") {
            Err(ResolveError::ConstructionFailed { name, reason }) => {
                assert_eq!(name, "broken");
                assert_eq!(reason, "missing dependency");
            }
            _ => panic!("expected construction failure"),
        }
    }

    #[test]
    fn test_registry_names() {
        let mut registry: PipeRegistry<i32> = PipeRegistry::new();
        registry.register("trim", add_pipe).register("auth", add_pipe);

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(registry.contains("auth"));
        assert_eq!(registry.names(), vec!["auth", "trim"]);
    }

    #[test]
    fn test_unresolved_pipe_is_not_invokable() {
        let pipe = UnresolvedPipe::new("ghost");
        assert_eq!(Pipe::<i32>::name(&pipe), "ghost");
        assert!(!Pipe::<i32>::responds_to(&pipe, DEFAULT_METHOD));
        assert!(!Pipe::<i32>::is_invokable(&pipe));

        let stack: Stack<'_, i32> = Stack::new(&identity);
        let result = pipe.handle(1, stack, &[]);
        assert!(matches!(
            result,
            Err(PipelineError::NotInvokable { ref pipe, .. }) if pipe == "ghost"
        ));
    }
}
