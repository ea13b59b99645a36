use thiserror::Error;

/// The audio output could not be acquired or started. Playback does not begin and the caller is
/// expected to take corrective action (e.g. releasing the engine) before retrying.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}: {details}")]
pub struct EngineError {
    pub message: String,
    pub details: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>, details: impl ToString) -> Self {
        Self {
            message: message.into(),
            details: details.to_string(),
        }
    }
}

/// Failure reply of a method call.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MethodError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Method `{0}` is not implemented")]
    NotImplemented(String),
}

impl MethodError {
    /// Stable error code handed to the caller next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Engine(_) => "engine_error",
            Self::NotImplemented(_) => "not_implemented",
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Malformed YAML: {0}")]
    Yaml(#[from] yaml_rust::ScanError),
    #[error("Configuration document is empty")]
    Empty,
    #[error("Unsupported configuration version {found} (expected {expected})")]
    Version { found: f64, expected: f64 },
    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}
