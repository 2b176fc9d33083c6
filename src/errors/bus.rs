// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while delivering payloads through the topic bus.

use thiserror::Error;

/// A single failed delivery. Publish and drain collect these per call and keep
/// delivering to the remaining subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The subscriber's intake queue has been dropped
    #[error("subscriber {subscriber} of topic '{topic}' has closed its queue")]
    SubscriberClosed { topic: String, subscriber: usize },
}

impl BusError {
    /// Name of the topic the failed delivery targeted
    pub fn topic(&self) -> &str {
        match self {
            BusError::SubscriberClosed { topic, .. } => topic,
        }
    }
}
