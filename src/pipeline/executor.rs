use super::container::{Container, UnresolvedPipe};
use super::core::{Pipe, Stack, DEFAULT_METHOD};
use super::stage::{parse_pipe_string, PipeIdentifier, Stage};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, ResolveError};
use crate::logger::{LogLevel, LOGGER};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

type Chain<'a, T, R, E> = Box<dyn Fn(T) -> Result<R, E> + 'a>;
type CarryHook<R> = Box<dyn Fn(R) -> R>;

/// Finalizer plus the means to snapshot the payload it will receive
struct Finalizer<T> {
    snapshot: fn(&T) -> T,
    callback: Box<dyn FnOnce(T)>,
}

/// Runs the finalizer when dropped, so it also fires while a panic unwinds
struct FinallyGuard<T> {
    payload: Option<T>,
    callback: Option<Box<dyn FnOnce(T)>>,
}

impl<T> FinallyGuard<T> {
    fn arm(finalizer: Finalizer<T>, payload: &T) -> Self {
        Self {
            payload: Some((finalizer.snapshot)(payload)),
            callback: Some(finalizer.callback),
        }
    }
}

impl<T> Drop for FinallyGuard<T> {
    fn drop(&mut self) {
        if let (Some(callback), Some(payload)) = (self.callback.take(), self.payload.take()) {
            callback(payload);
        }
    }
}

/// Sends a payload through an ordered list of stages
///
/// Each stage receives the payload and a [`Stack`] for the rest of the chain.
/// It may transform the payload before calling the stack, inspect or replace
/// what the stack returns, or return without calling it to end the run early.
///
/// A pipeline is configured once and consumed by [`Pipeline::then`].
///
/// # Example
/// ```
/// use pipewright::pipeline::{Pipeline, Stack, Stage};
///
/// let pipeline: Pipeline<i32> = Pipeline::new().send(5).through([
///     Stage::callable(|n: i32, stack: Stack<'_, i32>| stack.call(n * 2)),
///     Stage::callable(|n: i32, stack: Stack<'_, i32>| stack.call(n + 1)),
/// ]);
///
/// assert_eq!(pipeline.then_return().unwrap(), 11);
/// ```
pub struct Pipeline<T, R = T, E = PipelineError> {
    payload: Option<T>,
    pipes: Vec<Stage<T, R, E>>,
    method: String,
    finalizer: Option<Finalizer<T>>,
    carry_hook: Option<CarryHook<R>>,
    container: Option<Arc<dyn Container<T, R, E>>>,
}

impl<T, R, E> Pipeline<T, R, E> {
    /// Create an empty pipeline without a container
    pub fn new() -> Self {
        Self {
            payload: None,
            pipes: Vec::new(),
            method: DEFAULT_METHOD.to_string(),
            finalizer: None,
            carry_hook: None,
            container: None,
        }
    }

    /// Create an empty pipeline resolving identifier stages through `container`
    pub fn with_container(container: Arc<dyn Container<T, R, E>>) -> Self {
        Self::new().set_container(container)
    }

    /// Create a pipeline from a declarative configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new()
            .via(config.method.as_str())
            .through(config.pipes.iter().map(String::as_str))
    }

    /// Set the payload being sent through the pipeline
    pub fn send(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Replace the stage list
    pub fn through<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Stage<T, R, E>>,
    {
        self.pipes = stages.into_iter().map(Into::into).collect();
        self
    }

    /// Append stages after the existing ones
    pub fn pipe<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Stage<T, R, E>>,
    {
        self.pipes.extend(stages.into_iter().map(Into::into));
        self
    }

    /// Set the method invoked on instance and identifier stages
    pub fn via(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the callback run with the original payload once the run ends
    ///
    /// Replaces any previously configured finalizer.
    pub fn finally<F>(mut self, callback: F) -> Self
    where
        T: Clone,
        F: FnOnce(T) + 'static,
    {
        self.finalizer = Some(Finalizer {
            snapshot: T::clone,
            callback: Box::new(callback),
        });
        self
    }

    /// Set the hook applied to every successful stage result
    pub fn on_carry<F>(mut self, hook: F) -> Self
    where
        F: Fn(R) -> R + 'static,
    {
        self.carry_hook = Some(Box::new(hook));
        self
    }

    /// Set the container used to resolve identifier stages
    pub fn set_container(mut self, container: Arc<dyn Container<T, R, E>>) -> Self {
        self.container = Some(container);
        self
    }

    /// Apply `configure` only when `condition` holds
    pub fn when<F>(self, condition: bool, configure: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition {
            configure(self)
        } else {
            self
        }
    }

    /// Get the configured container
    pub fn container(&self) -> Option<&Arc<dyn Container<T, R, E>>> {
        self.container.as_ref()
    }

    /// Get the configured stages in execution order
    pub fn pipes(&self) -> &[Stage<T, R, E>] {
        &self.pipes
    }

    /// Get the method invoked on instance and identifier stages
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl<T, R, E> Pipeline<T, R, E>
where
    E: From<PipelineError>,
{
    /// Run the pipeline with a final destination
    ///
    /// Failures from stages or the destination are returned unchanged. The
    /// finalizer, if any, runs exactly once after the chain finishes, whether
    /// it returned `Ok`, returned `Err` or panicked.
    pub fn then<D>(self, destination: D) -> Result<R, E>
    where
        D: Fn(T) -> Result<R, E>,
    {
        let Pipeline {
            payload,
            pipes,
            method,
            finalizer,
            carry_hook,
            container,
        } = self;

        let payload = payload.ok_or(PipelineError::PayloadNotSent)?;
        let run_id = Uuid::new_v4();

        LOGGER.log(
            LogLevel::Debug,
            &format!(
                "Starting pipeline run with {} stages via '{}' (run: {})",
                pipes.len(),
                method,
                run_id
            ),
            "pipeline",
        );

        // Declared before the chain so it is dropped after it
        let _finally = finalizer.map(|finalizer| FinallyGuard::arm(finalizer, &payload));

        let carrier = Carrier {
            method: &method,
            carry_hook: carry_hook.as_deref(),
            container: container.as_deref(),
            run_id,
        };
        let chain = carrier.build_chain(&pipes, &destination);

        let started = Instant::now();
        let result = chain(payload);

        LOGGER.log(
            LogLevel::Debug,
            &format!(
                "Pipeline run {} in {:.3}ms (run: {})",
                if result.is_ok() { "completed" } else { "failed" },
                started.elapsed().as_secs_f64() * 1000.0,
                run_id
            ),
            "pipeline",
        );

        result
    }
}

impl<T, E> Pipeline<T, T, E>
where
    E: From<PipelineError>,
{
    /// Run the pipeline and return the payload as the last stage passed it on
    pub fn then_return(self) -> Result<T, E> {
        self.then(Ok)
    }
}

impl<T, R, E> Default for Pipeline<T, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R, E> fmt::Debug for Pipeline<T, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("pipes", &self.pipes)
            .field("method", &self.method)
            .field("has_payload", &self.payload.is_some())
            .field("has_finalizer", &self.finalizer.is_some())
            .field("has_container", &self.container.is_some())
            .finish()
    }
}

/// Per-run view of the configuration that resolves and invokes stages
struct Carrier<'a, T, R, E> {
    method: &'a str,
    carry_hook: Option<&'a dyn Fn(R) -> R>,
    container: Option<&'a dyn Container<T, R, E>>,
    run_id: Uuid,
}

impl<'a, T, R, E> Carrier<'a, T, R, E>
where
    E: From<PipelineError>,
{
    /// Fold the stages, last to first, around the destination
    fn build_chain<D>(
        &'a self,
        pipes: &'a [Stage<T, R, E>],
        destination: &'a D,
    ) -> Chain<'a, T, R, E>
    where
        D: Fn(T) -> Result<R, E>,
    {
        let mut chain: Chain<'a, T, R, E> = Box::new(move |payload| destination(payload));

        for stage in pipes.iter().rev() {
            let next = chain;
            chain = Box::new(move |payload| self.carry(stage, payload, Stack::new(&*next)));
        }

        chain
    }

    /// Resolve and invoke one stage
    fn carry(&self, stage: &Stage<T, R, E>, payload: T, stack: Stack<'_, T, R, E>) -> Result<R, E> {
        let carry = match stage {
            Stage::Callable(func) => func(payload, stack)?,
            Stage::Identifier(identifier) => {
                let PipeIdentifier { name, params } = parse_pipe_string(identifier);
                let pipe = self.resolve(&name);
                self.invoke(&*pipe, payload, stack, &params)?
            }
            Stage::Instance(pipe) => self.invoke(&**pipe, payload, stack, &[])?,
        };

        Ok(self.handle_carry(carry))
    }

    /// Resolve a pipe name, degrading to a placeholder pipe on failure
    fn resolve(&self, name: &str) -> Box<dyn Pipe<T, R, E>> {
        let resolved = match self.container {
            Some(container) => container.resolve(name),
            None => Err(ResolveError::NoContainer),
        };

        match resolved {
            Ok(pipe) => pipe,
            Err(e) => {
                LOGGER.log(
                    LogLevel::Warn,
                    &format!(
                        "Could not resolve pipe '{}', using identifier as-is: {} (run: {})",
                        name, e, self.run_id
                    ),
                    "pipeline::carry",
                );
                Box::new(UnresolvedPipe::new(name))
            }
        }
    }

    fn invoke(
        &self,
        pipe: &dyn Pipe<T, R, E>,
        payload: T,
        stack: Stack<'_, T, R, E>,
        params: &[String],
    ) -> Result<R, E> {
        if pipe.responds_to(self.method) {
            pipe.call_method(self.method, payload, stack, params)
        } else if pipe.is_invokable() {
            pipe.invoke(payload, stack, params)
        } else {
            Err(PipelineError::NotInvokable {
                pipe: pipe.name().to_string(),
                method: self.method.to_string(),
            }
            .into())
        }
    }

    fn handle_carry(&self, carry: R) -> R {
        match self.carry_hook {
            Some(hook) => hook(carry),
            None => carry,
        }
    }
}
