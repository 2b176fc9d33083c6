// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Topic-based pub/sub routing between processors.
//!
//! The bus owns every topic by name. A topic holds the intake queues of the
//! processors subscribed to it and a buffer of payloads that were published
//! while nobody was listening.
//!
//! # Delivery rules
//!
//! - **Fan-out**: every subscriber of a topic receives every payload published
//!   to it.
//! - **Buffering**: a publish to a topic with no subscribers appends to that
//!   topic's buffer. Subscribing later does not flush the buffer; only
//!   [`TopicBus::drain_topics_buffer`] does.
//! - **Ordering**: payloads from one publisher to one topic reach each
//!   subscriber in publish order. Nothing is promised across topics. Two
//!   publishers racing on a topic with several subscribers may interleave
//!   differently at each subscriber; there is no single order per topic.
//! - **Backpressure**: subscriber queues are bounded; publishing into a full
//!   queue waits until the subscriber catches up.
//! - **Partial failure**: a closed subscriber queue produces a [`BusError`]
//!   for that delivery while the rest still go out.
//!
//! The topic registry lock is only held to read or update the table. Queue
//! sends happen after it is released, so a slow subscriber never blocks
//! publishers on other topics from reaching the registry.
//!
//! # Example
//! ```
//! use flowbus::engine::TopicBus;
//! use flowbus::payload::Payload;
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = TopicBus::new();
//! let (tx, mut rx) = mpsc::channel(8);
//! bus.subscribe("greetings", tx);
//!
//! let errors = bus.publish(&["greetings"], &[Payload::new("hello", "docs")]).await;
//! assert!(errors.is_empty());
//! assert_eq!(rx.recv().await.unwrap().bytes().as_ref(), b"hello");
//! # }
//! ```

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::errors::BusError;
use crate::observability::messages::bus::{DeliveryFailed, PayloadsBuffered, TopicDrained};
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;

/// Pending payloads a subscriber queue holds before publishers wait.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Sending half of a subscriber's intake queue.
pub type SubscriberQueue = mpsc::Sender<Payload>;

static GLOBAL_BUS: Lazy<Arc<TopicBus>> = Lazy::new(|| Arc::new(TopicBus::new()));

#[derive(Debug, Default)]
struct Topic {
    subscribers: Vec<SubscriberQueue>,
    buffer: Vec<Payload>,
}

/// One unit of delivery work captured under the lock and performed after it.
struct Delivery {
    topic: String,
    subscribers: Vec<SubscriberQueue>,
    payloads: Vec<Payload>,
}

#[derive(Debug, Default)]
pub struct TopicBus {
    topics: Mutex<HashMap<String, Topic>>,
}

impl TopicBus {
    /// Create an isolated bus with no topics
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus used by processors that are not given one.
    pub fn global() -> Arc<TopicBus> {
        Arc::clone(&GLOBAL_BUS)
    }

    /// Register `queue` as a delivery destination for `topic`.
    ///
    /// The topic is created if it does not exist yet. Payloads already
    /// buffered under the topic stay buffered until the next drain.
    pub fn subscribe(&self, topic: &str, queue: SubscriberQueue) {
        let mut topics = self.topics.lock();
        topics.entry(topic.to_string()).or_default().subscribers.push(queue);
    }

    /// Publish `payloads` to each of `topics` independently.
    ///
    /// Returns one error per failed delivery; an empty list means every
    /// subscriber received every payload (or the payloads were buffered).
    pub async fn publish<S: AsRef<str>>(&self, topics: &[S], payloads: &[Payload]) -> Vec<BusError> {
        let mut errors = Vec::new();
        for topic in topics {
            errors.extend(self.publish_topic(topic.as_ref(), payloads).await);
        }
        errors
    }

    /// Publish `payloads` to a single topic.
    pub async fn publish_topic(&self, topic: &str, payloads: &[Payload]) -> Vec<BusError> {
        if payloads.is_empty() {
            return Vec::new();
        }

        let subscribers = {
            let mut topics = self.topics.lock();
            let entry = topics.entry(topic.to_string()).or_default();
            if entry.subscribers.is_empty() {
                entry.buffer.extend_from_slice(payloads);
                PayloadsBuffered {
                    topic,
                    count: payloads.len(),
                    buffered_total: entry.buffer.len(),
                }
                .log();
                return Vec::new();
            }
            entry.subscribers.clone()
        };

        deliver(Delivery {
            topic: topic.to_string(),
            subscribers,
            payloads: payloads.to_vec(),
        })
        .await
    }

    /// Flush every buffered topic that has at least one subscriber.
    ///
    /// Each subscriber receives the whole buffered batch in original publish
    /// order and the buffer is cleared. Topics without subscribers keep their
    /// buffer. Publishes racing with a drain may or may not be included.
    pub async fn drain_topics_buffer(&self) -> Vec<BusError> {
        let deliveries: Vec<Delivery> = {
            let mut topics = self.topics.lock();
            topics
                .iter_mut()
                .filter(|(_, t)| !t.buffer.is_empty() && !t.subscribers.is_empty())
                .map(|(name, t)| Delivery {
                    topic: name.clone(),
                    subscribers: t.subscribers.clone(),
                    payloads: std::mem::take(&mut t.buffer),
                })
                .collect()
        };

        let mut errors = Vec::new();
        for delivery in deliveries {
            TopicDrained {
                topic: &delivery.topic,
                payload_count: delivery.payloads.len(),
                subscriber_count: delivery.subscribers.len(),
            }
            .log();
            errors.extend(deliver(delivery).await);
        }
        errors
    }

    /// Snapshot of the payloads waiting in a topic's buffer
    pub fn buffered(&self, topic: &str) -> Vec<Payload> {
        self.topics
            .lock()
            .get(topic)
            .map(|t| t.buffer.clone())
            .unwrap_or_default()
    }

    pub fn buffer_len(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, |t| t.buffer.len())
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, |t| t.subscribers.len())
    }

    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Send every payload to every subscriber, in order, collecting failures.
///
/// A subscriber whose queue closes stops receiving the rest of the batch; the
/// failure is reported once per payload it missed.
async fn deliver(delivery: Delivery) -> Vec<BusError> {
    let mut errors = Vec::new();
    for (index, subscriber) in delivery.subscribers.iter().enumerate() {
        for payload in &delivery.payloads {
            if subscriber.send(payload.clone()).await.is_err() {
                DeliveryFailed {
                    topic: &delivery.topic,
                    subscriber: index,
                }
                .log();
                errors.push(BusError::SubscriberClosed {
                    topic: delivery.topic.clone(),
                    subscriber: index,
                });
            }
        }
    }
    errors
}
