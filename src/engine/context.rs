// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::bus::TopicBus;
use crate::errors::BusError;
use crate::payload::Payload;

/// What a handler gets for one unit of work: the processor's cancellation
/// scope and the bus its output goes to.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    token: CancellationToken,
    bus: Arc<TopicBus>,
}

impl ExecutionContext {
    pub fn new(token: CancellationToken, bus: Arc<TopicBus>) -> Self {
        Self { token, bus }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the owning processor is stopped
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn bus(&self) -> &Arc<TopicBus> {
        &self.bus
    }

    pub async fn publish<S: AsRef<str>>(&self, topics: &[S], payloads: &[Payload]) -> Vec<BusError> {
        self.bus.publish(topics, payloads).await
    }
}
