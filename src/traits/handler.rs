// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Configuration;
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError};
use crate::handlers::ErrorChannel;
use crate::payload::Payload;
use crate::traits::MetricProvider;

/// The pluggable unit of work a processor drives.
///
/// Handlers keep their mutable state behind interior locks because one
/// instance is shared between the processor that owns it and the task running
/// its execution loop.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable identifier, matching the name the handler is registered under
    fn name(&self) -> &'static str;

    /// Perform one unit of work.
    ///
    /// `payload` is `None` for subscriptionless handlers. Results are published
    /// through `ctx` to `topics`. Only errors fatal to this call are returned;
    /// background problems go to [`Handler::error_channel`].
    async fn handle(
        &self,
        ctx: &ExecutionContext,
        payload: Option<Payload>,
        topics: &[String],
    ) -> Result<(), HandlerError>;

    /// Check required properties and load property values into the handler.
    ///
    /// Returns the names of the properties that are missing or unusable.
    fn validate_configuration(&self) -> Result<(), Vec<String>>;

    fn configuration(&self) -> &Configuration;

    /// True when the handler produces payloads on its own instead of reacting
    /// to inbound ones
    fn subscriptionless(&self) -> bool;

    fn error_channel(&self) -> &ErrorChannel;

    /// Register `<prefix>_payloads_in` and `<prefix>_payloads_out` with
    /// `provider` and report into them from now on.
    fn set_metric_provider(
        &self,
        provider: Arc<dyn MetricProvider>,
        prefix: &str,
    ) -> Result<(), MetricError>;
}
