// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline definitions and wiring.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline definition loaded and wired.
///
/// # Log Level
/// `info!`
pub struct PipelineBuilt {
    pub processor_count: usize,
    pub topic_count: usize,
}

impl Display for PipelineBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline built: {} processors wired across {} topics",
            self.processor_count, self.topic_count
        )
    }
}

impl StructuredLog for PipelineBuilt {
    fn log(&self) {
        tracing::info!(
            processor_count = self.processor_count,
            topic_count = self.topic_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_built",
            span_name = name,
            processor_count = self.processor_count,
        )
    }
}

/// Non-fatal finding in a pipeline definition.
///
/// # Log Level
/// `warn!`
pub struct ConfigurationWarning<'a> {
    pub warning: &'a dyn std::error::Error,
}

impl Display for ConfigurationWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline definition warning: {}", self.warning)
    }
}

impl StructuredLog for ConfigurationWarning<'_> {
    fn log(&self) {
        tracing::warn!(warning = %self.warning, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("configuration_warning", span_name = name)
    }
}

/// Every processor of a pipeline has been started.
///
/// # Log Level
/// `info!`
pub struct PipelineStarted {
    pub processor_count: usize,
    pub drain_buffers: bool,
}

impl Display for PipelineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline started with {} processors", self.processor_count)?;
        if self.drain_buffers {
            write!(f, ", draining topic buffers")?;
        }
        Ok(())
    }
}

impl StructuredLog for PipelineStarted {
    fn log(&self) {
        tracing::info!(
            processor_count = self.processor_count,
            drain_buffers = self.drain_buffers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_started",
            span_name = name,
            processor_count = self.processor_count,
        )
    }
}

/// A processor failed to start so the processors already started were
/// stopped again.
///
/// # Log Level
/// `error!`
pub struct PipelineStartAborted<'a> {
    pub processor: &'a str,
    pub stopped: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for PipelineStartAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline start aborted at processor '{}' ({} already started processors stopped): {}",
            self.processor, self.stopped, self.error
        )
    }
}

impl StructuredLog for PipelineStartAborted<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            stopped = self.stopped,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "pipeline_start_aborted",
            span_name = name,
            processor = self.processor,
        )
    }
}

/// Stop was signalled to every processor of a pipeline.
///
/// # Log Level
/// `info!`
pub struct PipelineStopped {
    pub processor_count: usize,
}

impl Display for PipelineStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline stopped, {} processors signalled", self.processor_count)
    }
}

impl StructuredLog for PipelineStopped {
    fn log(&self) {
        tracing::info!(processor_count = self.processor_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_stopped",
            span_name = name,
            processor_count = self.processor_count,
        )
    }
}
