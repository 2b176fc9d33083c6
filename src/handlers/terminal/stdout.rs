// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::config::{Configuration, PropertyKind};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

/// Prints every payload it receives on its own line.
///
/// Records are printed as JSON objects. With `forward` set the payload is
/// passed on unchanged, which makes the handler usable as a tap in the middle
/// of a pipeline.
pub struct Stdout {
    core: HandlerCore,
}

impl Stdout {
    pub const NAME: &'static str = "Stdout";

    pub fn new() -> Self {
        let core = HandlerCore::new(Self::NAME);
        core.configuration.add_typed_property(
            "forward",
            "publish the printed payload to the egress topics",
            false,
            PropertyKind::Bool,
        );
        Self { core }
    }

    fn forward(&self) -> Result<bool, HandlerError> {
        match self.core.configuration.get_property("forward") {
            Some(property) if property.has_value() => Ok(property.bool()?),
            _ => Ok(false),
        }
    }
}

impl Default for Stdout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for Stdout {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(
        &self,
        ctx: &ExecutionContext,
        payload: Option<Payload>,
        topics: &[String],
    ) -> Result<(), HandlerError> {
        let payload = payload.ok_or(HandlerError::MissingPayload(Self::NAME))?;

        let mut line = payload.bytes().into_owned();
        line.push(b'\n');
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(&line)
            .await
            .map_err(|e| HandlerError::io("<stdout>", e))?;
        stdout.flush().await.map_err(|e| HandlerError::io("<stdout>", e))?;

        if self.forward()? {
            self.core.emit(ctx, topics, vec![payload]).await;
        }
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Vec<String>> {
        self.core.configuration.validate_properties()?;
        self.forward().map_err(|_| vec!["forward".to_string()])?;
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TopicBus;
    use crate::errors::PropertyError;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn context(bus: &Arc<TopicBus>) -> ExecutionContext {
        ExecutionContext::new(CancellationToken::new(), Arc::clone(bus))
    }

    #[tokio::test]
    async fn test_stdout_requires_a_payload() {
        let bus = Arc::new(TopicBus::new());
        let result = Stdout::new().handle(&context(&bus), None, &[]).await;
        assert!(matches!(result, Err(HandlerError::MissingPayload("Stdout"))));
    }

    #[tokio::test]
    async fn test_stdout_forwards_only_when_asked() {
        let bus = Arc::new(TopicBus::new());
        let (tx, mut rx) = mpsc::channel(10);
        bus.subscribe("printed", tx);
        let topics = vec!["printed".to_string()];
        let handler = Stdout::new();

        handler
            .handle(&context(&bus), Some(Payload::new("quiet", "Test")), &topics)
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());

        handler.configuration().set_property("forward", true).unwrap();
        handler
            .handle(&context(&bus), Some(Payload::new("loud", "Test")), &topics)
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().bytes().as_ref(), b"loud");
    }

    #[test]
    fn test_stdout_forward_only_accepts_bool() {
        let handler = Stdout::new();
        assert!(matches!(
            handler.configuration().set_property("forward", "yes"),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(handler.validate_configuration().is_ok());
    }
}
