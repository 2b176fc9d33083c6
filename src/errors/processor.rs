// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::MetricError;

/// Errors returned synchronously by the processor lifecycle operations.
///
/// None of these are fatal: the processor stays in its previous state and the
/// call can be retried once the cause is fixed.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("processor '{0}' has no handler applied")]
    NoHandlerApplied(String),

    #[error("processor '{0}' was started without an execution context")]
    NilContext(String),

    #[error("processor '{0}' is already running")]
    AlreadyRunning(String),

    #[error("processor '{processor}' has required properties that are not fulfilled: {}", .missing.join(", "))]
    RequiredPropertiesNotFulfilled {
        processor: String,
        missing: Vec<String>,
    },

    #[error("processor '{processor}' could not wire metrics: {source}")]
    Metrics {
        processor: String,
        #[source]
        source: MetricError,
    },
}
