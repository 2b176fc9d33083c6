// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::{ProcessorError, RegistryError};

/// Errors from the property store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("no property named '{0}' exists")]
    NoSuchProperty(String),

    #[error("property '{name}' expects a {expected} value, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("property '{0}' has no value")]
    NoValue(String),

    #[error("property '{name}' value {value} does not fit in a 32-bit integer")]
    OutOfRange { name: String, value: i64 },

    #[error("unsupported property value for '{name}': {reason}")]
    Unsupported { name: String, reason: String },
}

/// Problems found in a pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("processor #{index} has an empty name")]
    EmptyProcessorName { index: usize },

    #[error("processor name '{name}' is used more than once")]
    DuplicateProcessorName { name: String },

    #[error("processor '{processor}' uses unknown handler '{handler}'")]
    UnknownHandler { processor: String, handler: String },

    /// Not fatal: payloads may be published by something outside the pipeline
    #[error("processor '{processor}' subscribes to '{topic}' which no processor publishes to")]
    TopicWithoutPublisher { processor: String, topic: String },
}

impl ConfigError {
    pub fn is_warning(&self) -> bool {
        matches!(self, ConfigError::TopicWithoutPublisher { .. })
    }
}

/// Errors raised while loading, building or starting a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read pipeline definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse pipeline definition: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("pipeline definition is invalid:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ConfigError>),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("processor '{processor}': {source}")]
    Property {
        processor: String,
        #[source]
        source: PropertyError,
    },

    #[error(transparent)]
    Processor(#[from] ProcessorError),
}
