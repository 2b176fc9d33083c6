// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::config::{Configuration, PropertyKind};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError, PropertyError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

struct WriteSettings {
    directory: PathBuf,
    filename: Option<String>,
    append: bool,
    forward: bool,
}

/// Writes each inbound payload to a file inside the `path` directory.
///
/// The file is named after, in order of preference, the `filename` property,
/// the file the payload was read from (its `path` metadata) or a generated
/// `payload_<n>` name. In `append` mode every payload is added to the end of
/// the file followed by a newline; otherwise the file is replaced.
pub struct WriteFile {
    core: HandlerCore,
    written: AtomicU64,
}

impl WriteFile {
    pub const NAME: &'static str = "WriteFile";

    pub fn new() -> Self {
        let core = HandlerCore::new(Self::NAME);
        let cfg = &core.configuration;
        cfg.add_typed_property("path", "the directory to write files into", true, PropertyKind::String);
        cfg.add_typed_property(
            "filename",
            "write every payload to this file instead of deriving a name",
            false,
            PropertyKind::String,
        );
        cfg.add_typed_property(
            "append",
            "append to the file instead of replacing it",
            false,
            PropertyKind::Bool,
        );
        cfg.add_typed_property(
            "forward",
            "publish the written payload to the egress topics",
            false,
            PropertyKind::Bool,
        );
        Self {
            core,
            written: AtomicU64::new(0),
        }
    }

    fn settings(&self) -> Result<WriteSettings, PropertyError> {
        let cfg = &self.core.configuration;
        let optional = |name: &str| cfg.get_property(name).filter(|p| p.has_value());

        let directory = cfg
            .get_property("path")
            .ok_or_else(|| PropertyError::NoSuchProperty("path".to_string()))?
            .string()?;
        Ok(WriteSettings {
            directory: PathBuf::from(directory),
            filename: optional("filename").map(|p| p.string()).transpose()?,
            append: optional("append").map(|p| p.bool()).transpose()?.unwrap_or(false),
            forward: optional("forward").map(|p| p.bool()).transpose()?.unwrap_or(false),
        })
    }

    fn target(&self, settings: &WriteSettings, payload: &Payload) -> PathBuf {
        let name = settings
            .filename
            .clone()
            .or_else(|| {
                payload
                    .metadata()
                    .get("path")
                    .and_then(|p| Path::new(p).file_name())
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| format!("payload_{}", self.written.load(Ordering::Relaxed)));
        settings.directory.join(name)
    }
}

impl Default for WriteFile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for WriteFile {
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
        let settings = self.settings()?;

        tokio::fs::create_dir_all(&settings.directory)
            .await
            .map_err(|e| HandlerError::io(&settings.directory, e))?;

        let target = self.target(&settings, &payload);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(settings.append)
            .truncate(!settings.append)
            .open(&target)
            .await
            .map_err(|e| HandlerError::io(&target, e))?;

        let mut content = payload.bytes().into_owned();
        if settings.append {
            content.push(b'\n');
        }
        file.write_all(&content)
            .await
            .map_err(|e| HandlerError::io(&target, e))?;
        file.flush().await.map_err(|e| HandlerError::io(&target, e))?;
        self.written.fetch_add(1, Ordering::Relaxed);

        if settings.forward {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TopicBus;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn writer(dir: &Path) -> WriteFile {
        let handler = WriteFile::new();
        handler
            .configuration()
            .set_property("path", dir.to_string_lossy().as_ref())
            .unwrap();
        handler
    }

    fn context() -> (ExecutionContext, Arc<TopicBus>) {
        let bus = Arc::new(TopicBus::new());
        (ExecutionContext::new(CancellationToken::new(), bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_names_file_after_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let handler = writer(dir.path());
        let (ctx, _) = context();
        let payload = Payload::new("hello", "ReadFile").with_metadata("path", "/incoming/greeting.txt");

        handler.handle(&ctx, Some(payload), &[]).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("greeting.txt")).unwrap();
        assert_eq!(written, "hello");
    }

    #[tokio::test]
    async fn test_append_mode_collects_payloads_in_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let handler = writer(dir.path());
        handler.configuration().set_property("filename", "rows.jsonl").unwrap();
        handler.configuration().set_property("append", true).unwrap();
        let (ctx, _) = context();

        for row in ["first", "second"] {
            handler
                .handle(&ctx, Some(Payload::new(row, "Test")), &[])
                .await
                .unwrap();
        }

        let written = std::fs::read_to_string(dir.path().join("rows.jsonl")).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_forward_publishes_after_writing() {
        let dir = tempfile::tempdir().unwrap();
        let handler = writer(&dir.path().join("created"));
        handler.configuration().set_property("forward", true).unwrap();
        let (ctx, bus) = context();
        let (tx, mut rx) = mpsc::channel(10);
        bus.subscribe("written", tx);

        handler
            .handle(&ctx, Some(Payload::new("data", "Test")), &["written".to_string()])
            .await
            .unwrap();

        assert_eq!(rx.try_recv().unwrap().bytes().as_ref(), b"data");
        assert!(dir.path().join("created").join("payload_0").exists());
    }

    #[test]
    fn test_path_is_required() {
        assert_eq!(
            WriteFile::new().validate_configuration(),
            Err(vec!["path".to_string()])
        );
    }
}
