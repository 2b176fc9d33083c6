// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A processor binds one handler to its topic wiring, its metrics and its own
//! execution task.
//!
//! # Lifecycle
//!
//! ```text
//! created --set_handler--> configured --start--> running --stop--> stopped
//!                                                   ^                  |
//!                                                   +------start-------+
//! ```
//!
//! A failed `start` leaves the processor where it was, so it can be retried
//! after the cause is fixed. `stop` only signals cancellation; the execution
//! loop notices it at its next suspension point.
//!
//! # Execution loops
//!
//! - **Subscriptionless** handlers are invoked again and again with no input
//!   until cancelled. The handler paces itself; the processor never sleeps.
//! - **Reactive** handlers are invoked once per payload arriving on the
//!   processor's intake queue.
//!
//! Both loops surface handler errors (returned or reported on the handler's
//! error channel) as logs, a `<prefix>_failures` counter and, when a failure
//! channel is set, a [`Failure`] record. A failing payload never stops the loop.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use flowbus::engine::{Processor, TopicBus};
//! use flowbus::handlers::Stdout;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = Arc::new(TopicBus::new());
//! let mut printer = Processor::with_bus("printer", Vec::<String>::new(), bus.clone());
//! printer.set_handler(Arc::new(Stdout::new()))?;
//! printer.subscribe(&["lines"]);
//!
//! let root = CancellationToken::new();
//! printer.start(Some(&root))?;
//! assert!(printer.is_running());
//!
//! printer.stop();
//! assert!(!printer.is_running());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::Configuration;
use crate::engine::bus::{TopicBus, DEFAULT_QUEUE_CAPACITY};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, ProcessorError};
use crate::metrics::CounterProvider;
use crate::observability::messages::processor::{
    ExecutionLoopExited, FailureNotForwarded, HandlerFailed, ProcessorStartRejected,
    ProcessorStarted, ProcessorStopped,
};
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

static NEXT_PROCESSOR_ID: AtomicU64 = AtomicU64::new(1);

fn next_processor_id() -> u64 {
    NEXT_PROCESSOR_ID.fetch_add(1, Ordering::Relaxed)
}

/// A handler error surfaced by a processor.
#[derive(Debug)]
pub struct Failure {
    pub processor: String,
    pub processor_id: u64,
    pub handler: &'static str,
    /// The payload being handled, when the error came from `handle`
    pub payload: Option<Payload>,
    pub error: HandlerError,
}

pub struct Processor {
    pub id: u64,
    pub name: String,
    topics: Vec<String>,
    subscriptions: Vec<String>,
    handler: Option<Arc<dyn Handler>>,
    metrics: Arc<dyn MetricProvider>,
    bus: Arc<TopicBus>,
    ingress_tx: mpsc::Sender<Payload>,
    ingress_rx: Arc<Mutex<mpsc::Receiver<Payload>>>,
    failures: Option<mpsc::Sender<Failure>>,
    running: bool,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl Processor {
    /// Create a processor wired to the process-wide bus.
    ///
    /// `topics` are the egress topics handler output is published to.
    pub fn new<S: Into<String>>(name: impl Into<String>, topics: impl IntoIterator<Item = S>) -> Self {
        Self::with_bus(name, topics, TopicBus::global())
    }

    pub fn with_bus<S: Into<String>>(
        name: impl Into<String>,
        topics: impl IntoIterator<Item = S>,
        bus: Arc<TopicBus>,
    ) -> Self {
        let (ingress_tx, ingress_rx) = mpsc::channel(DEFAULT_QUEUE_CAPACITY);
        Self {
            id: next_processor_id(),
            name: name.into(),
            topics: topics.into_iter().map(Into::into).collect(),
            subscriptions: Vec::new(),
            handler: None,
            metrics: Arc::new(CounterProvider::new()),
            bus,
            ingress_tx,
            ingress_rx: Arc::new(Mutex::new(ingress_rx)),
            failures: None,
            running: false,
            cancel: None,
            task: None,
        }
    }

    /// Report into `provider` instead of the processor's private counters.
    ///
    /// Only affects handlers attached after this call.
    pub fn with_metric_provider(mut self, provider: Arc<dyn MetricProvider>) -> Self {
        self.metrics = provider;
        self
    }

    /// Prefix of every metric this processor owns: `<name>_<id>`
    pub fn metric_prefix(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }

    pub fn payloads_in_metric(&self) -> String {
        format!("{}_payloads_in", self.metric_prefix())
    }

    pub fn payloads_out_metric(&self) -> String {
        format!("{}_payloads_out", self.metric_prefix())
    }

    pub fn failures_metric(&self) -> String {
        format!("{}_failures", self.metric_prefix())
    }

    /// Attach a handler, replacing any previous one, and wire its metrics.
    ///
    /// Takes effect on the next `start`.
    pub fn set_handler(&mut self, handler: Arc<dyn Handler>) -> Result<(), ProcessorError> {
        handler
            .set_metric_provider(Arc::clone(&self.metrics), &self.metric_prefix())
            .map_err(|source| ProcessorError::Metrics {
                processor: self.name.clone(),
                source,
            })?;
        self.handler = Some(handler);
        Ok(())
    }

    pub fn handler(&self) -> Option<&Arc<dyn Handler>> {
        self.handler.as_ref()
    }

    /// The attached handler's configuration
    pub fn configuration(&self) -> Option<&Configuration> {
        self.handler.as_deref().map(|h| h.configuration())
    }

    /// Register this processor's intake queue under each topic.
    ///
    /// Payloads published before a subscription exists are only delivered by
    /// a later [`TopicBus::drain_topics_buffer`].
    pub fn subscribe<S: AsRef<str>>(&mut self, topics: &[S]) {
        for topic in topics {
            let topic = topic.as_ref();
            self.bus.subscribe(topic, self.ingress_tx.clone());
            self.subscriptions.push(topic.to_string());
        }
    }

    /// Forward every surfaced handler error as a [`Failure`] record.
    pub fn set_failure_channel(&mut self, failures: mpsc::Sender<Failure>) {
        self.failures = Some(failures);
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    pub fn metrics(&self) -> &Arc<dyn MetricProvider> {
        &self.metrics
    }

    pub fn bus(&self) -> &Arc<TopicBus> {
        &self.bus
    }

    /// Reflects the running flag, not whether the loop has exited yet
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Validate the processor and launch its execution loop under a child of
    /// `parent`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, parent: Option<&CancellationToken>) -> Result<(), ProcessorError> {
        let result = self.try_start(parent);
        if let Err(error) = &result {
            ProcessorStartRejected {
                processor: &self.name,
                processor_id: self.id,
                error,
            }
            .log();
        }
        result
    }

    fn try_start(&mut self, parent: Option<&CancellationToken>) -> Result<(), ProcessorError> {
        let handler = self
            .handler
            .clone()
            .ok_or_else(|| ProcessorError::NoHandlerApplied(self.name.clone()))?;
        let parent = parent.ok_or_else(|| ProcessorError::NilContext(self.name.clone()))?;
        if self.running {
            return Err(ProcessorError::AlreadyRunning(self.name.clone()));
        }
        handler
            .validate_configuration()
            .map_err(|missing| ProcessorError::RequiredPropertiesNotFulfilled {
                processor: self.name.clone(),
                missing,
            })?;

        let token = parent.child_token();
        let execution = Execution {
            processor: self.name.clone(),
            processor_id: self.id,
            ctx: ExecutionContext::new(token.clone(), Arc::clone(&self.bus)),
            handler: Arc::clone(&handler),
            topics: self.topics.clone(),
            metrics: Arc::clone(&self.metrics),
            payloads_in_metric: self.payloads_in_metric(),
            failures_metric: self.failures_metric(),
            failures: self.failures.clone(),
        };

        let started = ProcessorStarted {
            processor: &self.name,
            processor_id: self.id,
            handler: handler.name(),
            subscriptionless: handler.subscriptionless(),
        };
        let span = started.span("execution_loop");
        started.log();

        let task = if handler.subscriptionless() {
            tokio::spawn(execution.run_subscriptionless().instrument(span))
        } else {
            let ingress = Arc::clone(&self.ingress_rx);
            tokio::spawn(execution.run_reactive(ingress).instrument(span))
        };

        self.cancel = Some(token);
        self.task = Some(task);
        self.running = true;
        Ok(())
    }

    /// Signal the execution loop to exit. Does not wait for it.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.running = false;
        ProcessorStopped {
            processor: &self.name,
            processor_id: self.id,
        }
        .log();
    }

    /// Stop and wait until the execution loop has returned.
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("handler", &self.handler.as_ref().map(|h| h.name()))
            .field("topics", &self.topics)
            .field("subscriptions", &self.subscriptions)
            .field("running", &self.running)
            .finish()
    }
}

/// Everything the execution loop needs, moved into its task.
struct Execution {
    processor: String,
    processor_id: u64,
    ctx: ExecutionContext,
    handler: Arc<dyn Handler>,
    topics: Vec<String>,
    metrics: Arc<dyn MetricProvider>,
    payloads_in_metric: String,
    failures_metric: String,
    failures: Option<mpsc::Sender<Failure>>,
}

impl Execution {
    async fn run_subscriptionless(self) {
        let mut iterations = 0u64;
        while !self.ctx.is_cancelled() {
            if let Err(error) = self.handler.handle(&self.ctx, None, &self.topics).await {
                self.surface(error, None, false);
            }
            iterations += 1;
            self.drain_handler_errors();
            // Handlers that never suspend must not starve the runtime
            tokio::task::yield_now().await;
        }
        self.drain_handler_errors();
        self.exited(iterations);
    }

    async fn run_reactive(self, ingress: Arc<Mutex<mpsc::Receiver<Payload>>>) {
        // A previous loop of this processor may still hold the queue until it
        // notices its own cancellation.
        let mut ingress = tokio::select! {
            _ = self.ctx.cancelled() => {
                self.exited(0);
                return;
            }
            guard = ingress.lock_owned() => guard,
        };

        let mut handled = 0u64;
        let errors = self.handler.error_channel();
        loop {
            if self.ctx.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                _ = self.ctx.cancelled() => break,
                Some(error) = errors.recv() => self.surface(error, None, true),
                received = ingress.recv() => {
                    let Some(payload) = received else { break };
                    self.metrics.increment_metric(&self.payloads_in_metric, 1.0);
                    if let Err(error) = self
                        .handler
                        .handle(&self.ctx, Some(payload.clone()), &self.topics)
                        .await
                    {
                        self.surface(error, Some(payload), false);
                    }
                    handled += 1;
                }
            }
        }
        self.drain_handler_errors();
        self.exited(handled);
    }

    fn drain_handler_errors(&self) {
        for error in self.handler.error_channel().drain() {
            self.surface(error, None, true);
        }
    }

    fn surface(&self, error: HandlerError, payload: Option<Payload>, background: bool) {
        HandlerFailed {
            processor: &self.processor,
            processor_id: self.processor_id,
            handler: self.handler.name(),
            background,
            error: &error,
        }
        .log();
        self.metrics.increment_metric(&self.failures_metric, 1.0);

        if let Some(failures) = &self.failures {
            let record = Failure {
                processor: self.processor.clone(),
                processor_id: self.processor_id,
                handler: self.handler.name(),
                payload,
                error,
            };
            if let Err(e) = failures.try_send(record) {
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "failure channel is full",
                    mpsc::error::TrySendError::Closed(_) => "failure channel is closed",
                };
                FailureNotForwarded {
                    processor: &self.processor,
                    reason,
                }
                .log();
            }
        }
    }

    fn exited(&self, payloads_handled: u64) {
        ExecutionLoopExited {
            processor: &self.processor,
            processor_id: self.processor_id,
            payloads_handled,
        }
        .log();
    }
}
