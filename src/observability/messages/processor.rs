// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor lifecycle and handler failures.
//!
//! This module contains message types for logging events related to:
//! * Processor start, stop and rejected starts
//! * Execution loop exit
//! * Handler errors, both returned and reported on the error channel

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Processor entered the running state.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use flowbus::observability::messages::processor::ProcessorStarted;
///
/// let msg = ProcessorStarted {
///     processor: "listdir",
///     processor_id: 1,
///     handler: "ListDirectory",
///     subscriptionless: true,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ProcessorStarted<'a> {
    pub processor: &'a str,
    pub processor_id: u64,
    pub handler: &'a str,
    pub subscriptionless: bool,
}

impl Display for ProcessorStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mode = if self.subscriptionless {
            "self-driving"
        } else {
            "reactive"
        };
        write!(
            f,
            "Processor '{}' ({}) started with {} handler '{}'",
            self.processor, self.processor_id, mode, self.handler
        )
    }
}

impl StructuredLog for ProcessorStarted<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.processor,
            processor_id = self.processor_id,
            handler = self.handler,
            subscriptionless = self.subscriptionless,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor",
            span_name = name,
            processor = self.processor,
            processor_id = self.processor_id,
            handler = self.handler,
        )
    }
}

/// Processor was asked to stop.
///
/// # Log Level
/// `info!`
pub struct ProcessorStopped<'a> {
    pub processor: &'a str,
    pub processor_id: u64,
}

impl Display for ProcessorStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' ({}) stopped",
            self.processor, self.processor_id
        )
    }
}

impl StructuredLog for ProcessorStopped<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.processor,
            processor_id = self.processor_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor_stopped",
            span_name = name,
            processor = self.processor,
            processor_id = self.processor_id,
        )
    }
}

/// Start was refused; the processor keeps its previous state.
///
/// # Log Level
/// `warn!`
pub struct ProcessorStartRejected<'a> {
    pub processor: &'a str,
    pub processor_id: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessorStartRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' ({}) could not start: {}",
            self.processor, self.processor_id, self.error
        )
    }
}

impl StructuredLog for ProcessorStartRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            processor = self.processor,
            processor_id = self.processor_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "processor_start_rejected",
            span_name = name,
            processor = self.processor,
            processor_id = self.processor_id,
        )
    }
}

/// The execution loop observed cancellation and returned.
///
/// # Log Level
/// `debug!`
pub struct ExecutionLoopExited<'a> {
    pub processor: &'a str,
    pub processor_id: u64,
    pub payloads_handled: u64,
}

impl Display for ExecutionLoopExited<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' ({}) execution loop exited after {} units of work",
            self.processor, self.processor_id, self.payloads_handled
        )
    }
}

impl StructuredLog for ExecutionLoopExited<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            processor_id = self.processor_id,
            payloads_handled = self.payloads_handled,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "execution_loop_exited",
            span_name = name,
            processor = self.processor,
            processor_id = self.processor_id,
        )
    }
}

/// A handler failed, either from `handle` or through its error channel.
///
/// # Log Level
/// `error!` - Failure requiring attention; the processor keeps running
///
/// # Example
/// ```
/// use flowbus::observability::messages::processor::HandlerFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
/// let msg = HandlerFailed {
///     processor: "readfile",
///     processor_id: 2,
///     handler: "ReadFile",
///     background: false,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct HandlerFailed<'a> {
    pub processor: &'a str,
    pub processor_id: u64,
    pub handler: &'a str,
    /// True when the error came from the handler's error channel
    pub background: bool,
    pub error: &'a dyn std::error::Error,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let origin = if self.background { "reported" } else { "returned" };
        write!(
            f,
            "Handler '{}' of processor '{}' ({}) {} an error: {}",
            self.handler, self.processor, self.processor_id, origin, self.error
        )
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            processor_id = self.processor_id,
            handler = self.handler,
            background = self.background,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "handler_failed",
            span_name = name,
            processor = self.processor,
            handler = self.handler,
        )
    }
}

/// A failure record could not be forwarded because the sink is full or closed.
///
/// # Log Level
/// `warn!`
pub struct FailureNotForwarded<'a> {
    pub processor: &'a str,
    pub reason: &'a str,
}

impl Display for FailureNotForwarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' could not forward a failure record: {}",
            self.processor, self.reason
        )
    }
}

impl StructuredLog for FailureNotForwarded<'_> {
    fn log(&self) {
        tracing::warn!(processor = self.processor, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "failure_not_forwarded",
            span_name = name,
            processor = self.processor,
        )
    }
}

/// A handler's error channel was full, so the error is logged here instead.
///
/// # Log Level
/// `error!`
pub struct ErrorChannelFull<'a> {
    pub handler: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ErrorChannelFull<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Error channel of handler '{}' is full: {}",
            self.handler, self.error
        )
    }
}

impl StructuredLog for ErrorChannelFull<'_> {
    fn log(&self) {
        tracing::error!(handler = self.handler, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("error_channel_full", span_name = name, handler = self.handler)
    }
}
