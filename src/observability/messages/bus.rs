// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the topic bus.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Payloads were kept in a topic buffer because nobody was subscribed.
///
/// # Log Level
/// `debug!` - Normal while a pipeline is still being wired
pub struct PayloadsBuffered<'a> {
    pub topic: &'a str,
    pub count: usize,
    pub buffered_total: usize,
}

impl Display for PayloadsBuffered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Topic '{}' has no subscribers, buffered {} payloads ({} waiting)",
            self.topic, self.count, self.buffered_total
        )
    }
}

impl StructuredLog for PayloadsBuffered<'_> {
    fn log(&self) {
        tracing::debug!(
            topic = self.topic,
            count = self.count,
            buffered_total = self.buffered_total,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "payloads_buffered",
            span_name = name,
            topic = self.topic,
            count = self.count,
        )
    }
}

/// A delivery to one subscriber failed.
///
/// # Log Level
/// `warn!` - The remaining subscribers still received the payloads
pub struct DeliveryFailed<'a> {
    pub topic: &'a str,
    pub subscriber: usize,
}

impl Display for DeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Delivery to subscriber {} of topic '{}' failed: queue closed",
            self.subscriber, self.topic
        )
    }
}

impl StructuredLog for DeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, subscriber = self.subscriber, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "delivery_failed",
            span_name = name,
            topic = self.topic,
            subscriber = self.subscriber,
        )
    }
}

/// A buffered topic was flushed to its subscribers.
///
/// # Log Level
/// `info!`
pub struct TopicDrained<'a> {
    pub topic: &'a str,
    pub payload_count: usize,
    pub subscriber_count: usize,
}

impl Display for TopicDrained<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Drained {} buffered payloads from topic '{}' to {} subscribers",
            self.payload_count, self.topic, self.subscriber_count
        )
    }
}

impl StructuredLog for TopicDrained<'_> {
    fn log(&self) {
        tracing::info!(
            topic = self.topic,
            payload_count = self.payload_count,
            subscriber_count = self.subscriber_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "topic_drained",
            span_name = name,
            topic = self.topic,
            payload_count = self.payload_count,
        )
    }
}
