use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::DEFAULT_METHOD;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declarative pipeline configuration
///
/// Lists identifier stages in execution order together with the method name
/// used to invoke them, e.g.
///
/// ```json
/// { "method": "handle", "pipes": ["trim", "limit:10"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Method invoked on resolved pipes
    #[serde(default = "default_method")]
    pub method: String,

    /// Identifier stages, first runs first
    #[serde(default)]
    pub pipes: Vec<String>,
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            pipes: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the method name and every identifier
    pub fn validate(&self) -> PipelineResult<()> {
        if self.method.trim().is_empty() {
            return Err(PipelineError::ConfigError(
                "Method name cannot be empty".to_string(),
            ));
        }

        for (index, pipe) in self.pipes.iter().enumerate() {
            let name = pipe.split(':').next().unwrap_or_default();
            if name.trim().is_empty() {
                return Err(PipelineError::ConfigError(format!(
                    "Pipe {} has an empty name: '{}'",
                    index + 1,
                    pipe
                )));
            }
        }

        Ok(())
    }
}

/// Builder for constructing PipelineConfig instances with a fluent API
///
/// # Example
/// ```
/// use pipewright::config::PipelineConfigBuilder;
///
/// let config = PipelineConfigBuilder::new()
///     .method("process")
///     .pipe("trim")
///     .pipe("limit:10")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.pipes, vec!["trim", "limit:10"]);
/// ```
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    method: Option<String>,
    pipes: Vec<String>,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method invoked on resolved pipes
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Append one identifier stage
    pub fn pipe(mut self, pipe: impl Into<String>) -> Self {
        self.pipes.push(pipe.into());
        self
    }

    /// Append several identifier stages
    pub fn pipes<I, S>(mut self, pipes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pipes.extend(pipes.into_iter().map(Into::into));
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> PipelineResult<PipelineConfig> {
        let config = PipelineConfig {
            method: self.method.unwrap_or_else(default_method),
            pipes: self.pipes,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.method, "handle");
        assert!(config.pipes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let config = PipelineConfig::from_json(r#"{ "pipes": ["trim", "limit:10"] }"#).unwrap();
        assert_eq!(config.method, "handle");
        assert_eq!(config.pipes, vec!["trim", "limit:10"]);
    }

    #[test]
    fn test_from_json_rejects_empty_method() {
        let result = PipelineConfig::from_json(r#"{ "method": " ", "pipes": [] }"#);
        assert!(matches!(result, Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_rejects_empty_pipe_name() {
        let result = PipelineConfig::from_json(r#"{ "pipes": ["trim", ":1,2"] }"#);
        match result {
            Err(PipelineError::ConfigError(msg)) => assert!(msg.contains("Pipe 2")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_malformed() {
        let result = PipelineConfig::from_json("{ not json");
        assert!(matches!(result, Err(PipelineError::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pipeline.json");

        let config = PipelineConfigBuilder::new()
            .method("process")
            .pipes(["auth", "throttle:60,1"])
            .build()
            .unwrap();
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = PipelineConfig::load(temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_builder_defaults_method() {
        let config = PipelineConfigBuilder::new().pipe("trim").build().unwrap();
        assert_eq!(config.method, DEFAULT_METHOD);
        assert_eq!(config.pipes, vec!["trim"]);
    }

    #[test]
    fn test_builder_validates() {
        let result = PipelineConfigBuilder::new().pipe("").build();
        assert!(result.is_err());
    }
}
