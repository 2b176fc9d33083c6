// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Configuration, PropertyKind};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

/// Reads the file named by each inbound payload and publishes its content.
///
/// The published payload carries the file it came from under the `path`
/// metadata key.
pub struct ReadFile {
    core: HandlerCore,
}

impl ReadFile {
    pub const NAME: &'static str = "ReadFile";

    pub fn new() -> Self {
        let core = HandlerCore::new(Self::NAME);
        core.configuration.add_typed_property(
            "remove_after",
            "delete the file once its content has been read",
            false,
            PropertyKind::Bool,
        );
        Self { core }
    }

    fn remove_after(&self) -> Result<bool, HandlerError> {
        match self.core.configuration.get_property("remove_after") {
            Some(property) if property.has_value() => Ok(property.bool()?),
            _ => Ok(false),
        }
    }
}

impl Default for ReadFile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for ReadFile {
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
        let path = PathBuf::from(String::from_utf8(payload.bytes().into_owned())?);

        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| HandlerError::io(&path, e))?;
        if self.remove_after()? {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| HandlerError::io(&path, e))?;
        }

        let output = Payload::new(content, Self::NAME).with_metadata("path", path.to_string_lossy());
        self.core.emit(ctx, topics, vec![output]).await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TopicBus;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    async fn read(handler: &ReadFile, path: &std::path::Path) -> Result<Option<Payload>, HandlerError> {
        let bus = Arc::new(TopicBus::new());
        let (tx, mut rx) = mpsc::channel(10);
        bus.subscribe("content", tx);
        let ctx = ExecutionContext::new(CancellationToken::new(), bus);
        let input = Payload::new(path.to_string_lossy().into_owned(), "Test");

        handler
            .handle(&ctx, Some(input), &["content".to_string()])
            .await?;
        Ok(rx.try_recv().ok())
    }

    #[tokio::test]
    async fn test_reads_content_and_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("people.csv");
        std::fs::write(&file, "name,age\npercy,30\n").unwrap();

        let output = read(&ReadFile::new(), &file).await.unwrap().unwrap();

        assert_eq!(output.bytes().as_ref(), b"name,age\npercy,30\n");
        assert_eq!(output.source(), "ReadFile");
        assert_eq!(output.metadata()["path"], file.to_string_lossy());
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_remove_after_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("once.txt");
        std::fs::write(&file, "gone soon").unwrap();
        let handler = ReadFile::new();
        handler.configuration().set_property("remove_after", true).unwrap();

        let output = read(&handler, &file).await.unwrap().unwrap();

        assert_eq!(output.bytes().as_ref(), b"gone soon");
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read(&ReadFile::new(), &dir.path().join("nope")).await;
        assert!(matches!(result, Err(HandlerError::Io { .. })));
    }
}
