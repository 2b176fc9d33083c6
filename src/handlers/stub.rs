// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Handlers and helpers for exercising processors in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Configuration;
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Reactive handler that remembers every payload it was given.
pub struct RecordingHandler {
    core: HandlerCore,
    received: Mutex<Vec<Payload>>,
    forward: bool,
    fail_on: Option<Vec<u8>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new("Recording"),
            received: Mutex::new(Vec::new()),
            forward: false,
            fail_on: None,
        }
    }

    /// Also republish every payload to the egress topics
    pub fn forwarding() -> Self {
        Self {
            forward: true,
            ..Self::new()
        }
    }

    /// Return an error for payloads whose content equals `content`
    pub fn failing_on(content: &str) -> Self {
        Self {
            fail_on: Some(content.as_bytes().to_vec()),
            ..Self::new()
        }
    }

    pub fn received(&self) -> Vec<Payload> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    fn name(&self) -> &'static str {
        "Recording"
    }

    async fn handle(
        &self,
        ctx: &ExecutionContext,
        payload: Option<Payload>,
        topics: &[String],
    ) -> Result<(), HandlerError> {
        let payload = payload.ok_or(HandlerError::MissingPayload("Recording"))?;
        self.received.lock().push(payload.clone());

        if self.fail_on.as_deref() == Some(payload.bytes().as_ref()) {
            return Err(HandlerError::UnexpectedBody { expected: "good" });
        }
        if self.forward {
            self.core.emit(ctx, topics, vec![payload]).await;
        }
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Vec<String>> {
        self.core.configuration.validate_properties()
    }

    fn configuration(&self) -> &Configuration {
        &self.core.configuration
    }

    fn subscriptionless(&self) -> bool {
        false
    }

    fn error_channel(&self) -> &ErrorChannel {
        &self.core.errors
    }

    fn set_metric_provider(
        &self,
        provider: Arc<dyn MetricProvider>,
        prefix: &str,
    ) -> Result<(), MetricError> {
        self.core.metrics.register(provider, prefix)
    }
}

/// Subscriptionless handler that publishes one "tick" per unit of work.
pub struct TickingHandler {
    core: HandlerCore,
    ticks: AtomicU64,
}

impl TickingHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new("Ticking"),
            ticks: AtomicU64::new(0),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for TickingHandler {
    fn name(&self) -> &'static str {
        "Ticking"
    }

    async fn handle(
        &self,
        ctx: &ExecutionContext,
        _payload: Option<Payload>,
        topics: &[String],
    ) -> Result<(), HandlerError> {
        tokio::select! {
            _ = ctx.cancelled() => return Ok(()),
            _ = tokio::time::sleep(Duration::from_millis(2)) => {}
        }
        self.core.emit(ctx, topics, vec![Payload::new("tick", "Ticking")]).await;
        self.ticks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Vec<String>> {
        self.core.configuration.validate_properties()
    }

    fn configuration(&self) -> &Configuration {
        &self.core.configuration
    }

    fn subscriptionless(&self) -> bool {
        true
    }

    fn error_channel(&self) -> &ErrorChannel {
        &self.core.errors
    }

    fn set_metric_provider(
        &self,
        provider: Arc<dyn MetricProvider>,
        prefix: &str,
    ) -> Result<(), MetricError> {
        self.core.metrics.register(provider, prefix)
    }
}
