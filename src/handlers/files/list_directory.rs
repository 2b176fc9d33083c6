// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Configuration, PropertyKind};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError, PropertyError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

/// Seconds a listed file is remembered before it may be published again
pub const DEFAULT_BUFFER_TIME_SECS: i64 = 3600;
/// Milliseconds between two listings
pub const DEFAULT_LIST_INTERVAL_MS: i64 = 1000;

struct ListSettings {
    path: PathBuf,
    buffer_time: Duration,
    interval: Duration,
}

/// Watches a directory and publishes the path of every entry that is not a
/// directory.
///
/// A path is published once and then remembered for `buffertime` seconds so
/// that later listings skip it. Subdirectories are ignored; symlinks, FIFOs
/// and sockets are published like regular files. Listing errors are
/// reported on the error channel and the next listing is attempted after the
/// usual interval.
pub struct ListDirectory {
    core: HandlerCore,
    found: Mutex<HashMap<PathBuf, Instant>>,
}

impl ListDirectory {
    pub const NAME: &'static str = "ListDirectory";

    pub fn new() -> Self {
        let core = HandlerCore::new(Self::NAME);
        core.configuration
            .add_typed_property("path", "the directory to list", true, PropertyKind::String);
        core.configuration.add_typed_property(
            "buffertime",
            "seconds a found file is remembered and not listed again",
            false,
            PropertyKind::Int,
        );
        core.configuration.add_typed_property(
            "interval",
            "milliseconds to wait between two listings",
            false,
            PropertyKind::Int,
        );
        Self {
            core,
            found: Mutex::new(HashMap::new()),
        }
    }

    fn settings(&self) -> Result<ListSettings, PropertyError> {
        let cfg = &self.core.configuration;
        let path = cfg
            .get_property("path")
            .ok_or_else(|| PropertyError::NoSuchProperty("path".to_string()))?
            .string()?;
        let buffer_time = non_negative(cfg, "buffertime", DEFAULT_BUFFER_TIME_SECS)?;
        let interval = non_negative(cfg, "interval", DEFAULT_LIST_INTERVAL_MS)?;

        Ok(ListSettings {
            path: PathBuf::from(path),
            buffer_time: Duration::from_secs(buffer_time),
            interval: Duration::from_millis(interval),
        })
    }

    /// Paths of regular files in the directory not seen within the buffer time.
    async fn list_new_files(&self, settings: &ListSettings) -> Result<Vec<PathBuf>, HandlerError> {
        let mut entries = tokio::fs::read_dir(&settings.path)
            .await
            .map_err(|e| HandlerError::io(&settings.path, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HandlerError::io(&settings.path, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| HandlerError::io(entry.path(), e))?;
            if !file_type.is_dir() {
                files.push(entry.path());
            }
        }
        files.sort();

        let now = Instant::now();
        let mut found = self.found.lock();
        found.retain(|_, seen| now.duration_since(*seen) <= settings.buffer_time);
        files.retain(|file| !found.contains_key(file));
        for file in &files {
            found.insert(file.clone(), now);
        }
        Ok(files)
    }
}

fn non_negative(cfg: &Configuration, name: &str, default: i64) -> Result<u64, PropertyError> {
    let value = match cfg.get_property(name) {
        Some(property) if property.has_value() => property.int64()?,
        _ => default,
    };
    u64::try_from(value).map_err(|_| PropertyError::Unsupported {
        name: name.to_string(),
        reason: "must not be negative".to_string(),
    })
}

impl Default for ListDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for ListDirectory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn handle(
        &self,
        ctx: &ExecutionContext,
        _payload: Option<Payload>,
        topics: &[String],
    ) -> Result<(), HandlerError> {
        let settings = self.settings()?;

        match self.list_new_files(&settings).await {
            Ok(files) => {
                let payloads = files
                    .iter()
                    .map(|file| Payload::new(file.to_string_lossy().into_owned(), Self::NAME))
                    .collect();
                self.core.emit(ctx, topics, payloads).await;
            }
            Err(error) => self.core.errors.report(error),
        }

        tokio::select! {
            _ = ctx.cancelled() => {}
            _ = tokio::time::sleep(settings.interval) => {}
        }
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Vec<String>> {
        self.core.configuration.validate_properties()?;
        let mut unusable = Vec::new();
        for name in ["buffertime", "interval"] {
            if non_negative(&self.core.configuration, name, 0).is_err() {
                unusable.push(name.to_string());
            }
        }
        if unusable.is_empty() {
            Ok(())
        } else {
            Err(unusable)
        }
    }

    fn configuration(&self) -> &Configuration {
        &self.core.configuration
    }

    fn subscriptionless(&self) -> bool {
        true
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
