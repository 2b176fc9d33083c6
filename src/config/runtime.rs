// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{PipelineConfig, PropertyValue};
use crate::engine::{Processor, TopicBus};
use crate::errors::{BusError, PipelineError};
use crate::handlers::HandlerRegistry;
use crate::observability::messages::pipeline::{
    PipelineBuilt, PipelineStartAborted, PipelineStarted, PipelineStopped,
};
use crate::observability::messages::StructuredLog;

/// Pipeline builder - turns a pipeline definition into wired processors.
///
/// Every processor gets a fresh handler from the registry with the
/// definition's properties applied, its egress topics and its subscriptions
/// on `bus`. Nothing is started.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flowbus::config::{PipelineBuilder, PipelineConfig};
/// use flowbus::engine::TopicBus;
/// use flowbus::handlers::HandlerRegistry;
///
/// let cfg: PipelineConfig = serde_yaml::from_str(r#"
/// processors:
///   - name: printer
///     handler: Stdout
///     subscriptions: [lines]
/// "#).unwrap();
///
/// let pipeline = PipelineBuilder::from_config(
///     &cfg,
///     &HandlerRegistry::with_builtin_handlers(),
///     Arc::new(TopicBus::new()),
/// ).unwrap();
///
/// assert_eq!(pipeline.processors().len(), 1);
/// assert_eq!(pipeline.bus().subscriber_count("lines"), 1);
/// ```
pub struct PipelineBuilder;

impl PipelineBuilder {
    pub fn from_config(
        cfg: &PipelineConfig,
        registry: &HandlerRegistry,
        bus: Arc<TopicBus>,
    ) -> Result<Pipeline, PipelineError> {
        let mut processors = Vec::with_capacity(cfg.processors.len());
        let mut topics = BTreeSet::new();

        for definition in &cfg.processors {
            let handler = registry.create(&definition.handler)?;
            for (name, value) in &definition.properties {
                let property_error = |source| PipelineError::Property {
                    processor: definition.name.clone(),
                    source,
                };
                let value = PropertyValue::from_yaml(name, value).map_err(property_error)?;
                handler
                    .configuration()
                    .set_property(name, value)
                    .map_err(property_error)?;
            }

            let mut processor =
                Processor::with_bus(definition.name.as_str(), definition.topics.iter().cloned(), Arc::clone(&bus));
            processor.set_handler(handler)?;
            processor.subscribe(&definition.subscriptions);

            topics.extend(definition.topics.iter().cloned());
            topics.extend(definition.subscriptions.iter().cloned());
            processors.push(processor);
        }

        PipelineBuilt {
            processor_count: processors.len(),
            topic_count: topics.len(),
        }
        .log();

        Ok(Pipeline {
            processors,
            bus,
            drain_buffers: cfg.drain_buffers,
        })
    }
}

/// A set of wired processors sharing one bus.
#[derive(Debug)]
pub struct Pipeline {
    processors: Vec<Processor>,
    bus: Arc<TopicBus>,
    drain_buffers: bool,
}

impl Pipeline {
    /// Start every processor in definition order under `token`.
    ///
    /// If one fails to start, the ones already started are stopped again and
    /// its error is returned.
    pub fn start(&mut self, token: &CancellationToken) -> Result<(), PipelineError> {
        for index in 0..self.processors.len() {
            if let Err(error) = self.processors[index].start(Some(token)) {
                for started in &mut self.processors[..index] {
                    started.stop();
                }
                PipelineStartAborted {
                    processor: &self.processors[index].name,
                    stopped: index,
                    error: &error,
                }
                .log();
                return Err(error.into());
            }
        }

        PipelineStarted {
            processor_count: self.processors.len(),
            drain_buffers: self.drain_buffers,
        }
        .log();
        Ok(())
    }

    /// True when the definition asked for buffers to be drained after start
    pub fn drains_buffers(&self) -> bool {
        self.drain_buffers
    }

    /// Deliver everything published before its topic had subscribers.
    ///
    /// A pipeline built by [`PipelineBuilder::from_config`] subscribes every
    /// processor before any of them starts, so its own output is never
    /// buffered. Only payloads published onto the bus by someone else before
    /// `start` are found here.
    pub async fn drain_buffers(&self) -> Vec<BusError> {
        self.bus.drain_topics_buffer().await
    }

    /// Signal every processor to stop. Does not wait for them.
    pub fn stop(&mut self) {
        for processor in &mut self.processors {
            processor.stop();
        }
        PipelineStopped {
            processor_count: self.processors.len(),
        }
        .log();
    }

    /// Stop every processor and wait for their execution loops to return.
    pub async fn shutdown(&mut self) {
        for processor in &mut self.processors {
            processor.shutdown().await;
        }
        PipelineStopped {
            processor_count: self.processors.len(),
        }
        .log();
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processor(&self, name: &str) -> Option<&Processor> {
        self.processors.iter().find(|p| p.name == name)
    }

    pub fn processor_mut(&mut self, name: &str) -> Option<&mut Processor> {
        self.processors.iter_mut().find(|p| p.name == name)
    }

    pub fn bus(&self) -> &Arc<TopicBus> {
        &self.bus
    }
}
