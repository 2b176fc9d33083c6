// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plumbing shared by every handler: its configuration, its error channel and
//! its payload counters.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::config::Configuration;
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError};
use crate::metrics::Metric;
use crate::observability::messages::processor::ErrorChannelFull;
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;
use crate::traits::MetricProvider;

/// Errors a handler's error channel holds before reports spill into the log.
pub const ERROR_CHANNEL_CAPACITY: usize = 1000;

/// Bounded channel a handler reports background errors on.
///
/// Reporting never blocks the handler. The owning processor drains the
/// channel from its execution loop.
#[derive(Debug)]
pub struct ErrorChannel {
    handler: &'static str,
    sender: mpsc::Sender<HandlerError>,
    receiver: Mutex<mpsc::Receiver<HandlerError>>,
}

impl ErrorChannel {
    pub fn new(handler: &'static str) -> Self {
        Self::with_capacity(handler, ERROR_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(handler: &'static str, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            handler,
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Queue a background error. When the channel is full the error is
    /// logged rather than queued.
    pub fn report(&self, error: HandlerError) {
        if let Err(e) = self.sender.try_send(error) {
            let error = match e {
                mpsc::error::TrySendError::Full(error) | mpsc::error::TrySendError::Closed(error) => error,
            };
            ErrorChannelFull {
                handler: self.handler,
                error: &error,
            }
            .log();
        }
    }

    /// Wait for the next reported error
    pub async fn recv(&self) -> Option<HandlerError> {
        self.receiver.lock().await.recv().await
    }

    /// Take every error that is queued right now without waiting.
    ///
    /// Returns nothing if another task is currently receiving.
    pub fn drain(&self) -> Vec<HandlerError> {
        let mut errors = Vec::new();
        if let Ok(mut receiver) = self.receiver.try_lock() {
            while let Ok(error) = receiver.try_recv() {
                errors.push(error);
            }
        }
        errors
    }
}

struct MetricNames {
    provider: Arc<dyn MetricProvider>,
    payloads_in: String,
    payloads_out: String,
}

/// Payload counters a handler reports into once a provider is attached.
#[derive(Default)]
pub struct HandlerMetrics {
    names: RwLock<Option<MetricNames>>,
}

impl HandlerMetrics {
    /// Register `<prefix>_payloads_out` and `<prefix>_payloads_in` with
    /// `provider`.
    ///
    /// Counters that already exist under the same names are reused, so a
    /// processor can swap handlers without losing its counts.
    pub fn register(&self, provider: Arc<dyn MetricProvider>, prefix: &str) -> Result<(), MetricError> {
        let payloads_in = format!("{}_payloads_in", prefix);
        let payloads_out = format!("{}_payloads_out", prefix);

        add_or_reuse(
            provider.as_ref(),
            Metric::new(
                payloads_out.as_str(),
                "keeps track of how many payloads the handler has outputted",
            ),
        )?;
        add_or_reuse(
            provider.as_ref(),
            Metric::new(
                payloads_in.as_str(),
                "keeps track of how many payloads the handler has ingested",
            ),
        )?;

        *self.names.write() = Some(MetricNames {
            provider,
            payloads_in,
            payloads_out,
        });
        Ok(())
    }

    pub fn payloads_out(&self, count: usize) {
        if let Some(names) = self.names.read().as_ref() {
            names.provider.increment_metric(&names.payloads_out, count as f64);
        }
    }

    pub fn payloads_in_name(&self) -> Option<String> {
        self.names.read().as_ref().map(|n| n.payloads_in.clone())
    }

    pub fn payloads_out_name(&self) -> Option<String> {
        self.names.read().as_ref().map(|n| n.payloads_out.clone())
    }
}

fn add_or_reuse(provider: &dyn MetricProvider, metric: Metric) -> Result<(), MetricError> {
    match provider.add_metric(metric) {
        Ok(()) | Err(MetricError::Duplicate(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// The state every handler carries besides its own settings.
pub struct HandlerCore {
    pub configuration: Configuration,
    pub errors: ErrorChannel,
    pub metrics: HandlerMetrics,
}

impl HandlerCore {
    pub fn new(handler: &'static str) -> Self {
        Self {
            configuration: Configuration::new(),
            errors: ErrorChannel::new(handler),
            metrics: HandlerMetrics::default(),
        }
    }

    /// Publish results, count them as output and report failed deliveries
    /// on the error channel.
    pub async fn emit(&self, ctx: &ExecutionContext, topics: &[String], payloads: Vec<Payload>) {
        self.metrics.payloads_out(payloads.len());
        if payloads.is_empty() {
            return;
        }
        for error in ctx.publish(topics, &payloads).await {
            self.errors.report(error.into());
        }
    }
}
