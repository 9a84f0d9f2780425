//! Synchronous pipe/middleware composition.
//!
//! See [`pipeline`] for the engine itself, [`config`] for declarative pipeline
//! configuration and [`logger`] for the in-memory log buffer the engine writes to.

pub mod config;
pub mod error;
pub mod logger;
pub mod pipeline;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, PipelineResult, ResolveError};
pub use pipeline::{Container, Pipe, PipeRegistry, Pipeline, Stack, Stage};
