//! Pipe composition engine
//!
//! A [`Pipeline`] sends a payload through an ordered list of stages and into a
//! final destination. Each stage receives the payload together with a [`Stack`]
//! standing for the rest of the chain, and decides whether to call it:
//!
//! ```text
//! payload -> stage 1 -> stage 2 -> ... -> destination
//!   result <-        <-         <- ... <-
//! ```
//!
//! Stages come in three kinds (see [`Stage`]): closures, pre-built [`Pipe`]
//! instances, and string identifiers such as `"throttle:60,1"` that are resolved
//! through a [`Container`] when the chain reaches them.
//!
//! # Example
//! ```
//! use pipewright::error::PipelineError;
//! use pipewright::pipeline::{Pipeline, Stack, Stage};
//!
//! let guard = Stage::callable(|s: String, stack: Stack<'_, String>| {
//!     if s.is_empty() {
//!         return Ok("blocked".to_string());
//!     }
//!     stack.call(s)
//! });
//! let upper = Stage::callable(|s: String, stack: Stack<'_, String>| stack.call(s.to_uppercase()));
//!
//! let pipeline: Pipeline<String> = Pipeline::new()
//!     .send("hello".to_string())
//!     .through([guard, upper]);
//!
//! let result = pipeline.then(|s| Ok::<_, PipelineError>(format!("{}!", s)))?;
//! assert_eq!(result, "HELLO!");
//! # Ok::<(), PipelineError>(())
//! ```

pub mod container;
pub mod core;
pub mod executor;
pub mod stage;

// Re-export main types
pub use self::container::{Container, PipeRegistry};
pub use self::core::{pipe_fn, FnPipe, Pipe, Stack, DEFAULT_METHOD};
pub use self::executor::Pipeline;
pub use self::stage::{parse_pipe_string, PipeIdentifier, Stage, StageFn};
