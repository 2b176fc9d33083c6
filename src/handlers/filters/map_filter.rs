// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::{Configuration, PropertyKind};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError, PropertyError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

/// Lets through the records whose fields match the configured filters.
///
/// `filters` maps field names to the exact value a field must hold. In
/// `strict` mode a record must match every filter, otherwise one match is
/// enough. Records that do not pass are dropped silently.
pub struct MapFilter {
    core: HandlerCore,
}

impl MapFilter {
    pub const NAME: &'static str = "MapFilter";

    pub fn new() -> Self {
        let core = HandlerCore::new(Self::NAME);
        core.configuration.add_typed_property(
            "filters",
            "field name to required value",
            true,
            PropertyKind::Map,
        );
        core.configuration.add_typed_property(
            "strict",
            "require every filter to match instead of any",
            false,
            PropertyKind::Bool,
        );
        Self { core }
    }

    fn settings(&self) -> Result<(HashMap<String, String>, bool), PropertyError> {
        let cfg = &self.core.configuration;
        let filters = cfg
            .get_property("filters")
            .ok_or_else(|| PropertyError::NoSuchProperty("filters".to_string()))?
            .map()?;
        if filters.is_empty() {
            return Err(PropertyError::Unsupported {
                name: "filters".to_string(),
                reason: "at least one filter is needed".to_string(),
            });
        }
        let strict = match cfg.get_property("strict").filter(|p| p.has_value()) {
            Some(property) => property.bool()?,
            None => false,
        };
        Ok((filters, strict))
    }
}

fn passes(record: &BTreeMap<String, String>, filters: &HashMap<String, String>, strict: bool) -> bool {
    let mut hits = filters
        .iter()
        .map(|(field, wanted)| record.get(field) == Some(wanted));
    if strict {
        hits.all(|hit| hit)
    } else {
        hits.any(|hit| hit)
    }
}

impl Default for MapFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for MapFilter {
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
        let (filters, strict) = self.settings()?;
        let record = payload
            .as_record()
            .ok_or(HandlerError::UnexpectedBody { expected: "record" })?;

        if passes(record, &filters, strict) {
            self.core.emit(ctx, topics, vec![payload]).await;
        }
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Vec<String>> {
        self.core.configuration.validate_properties()?;
        self.settings()
            .map(|_| ())
            .map_err(|_| vec!["filters".to_string()])
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

    fn person(name: &str, city: &str) -> Payload {
        let fields = BTreeMap::from([
            ("name".to_string(), name.to_string()),
            ("city".to_string(), city.to_string()),
        ]);
        Payload::record(fields, "ParseCSV")
    }

    async fn passed(handler: &MapFilter, inputs: Vec<Payload>) -> Vec<String> {
        let bus = Arc::new(TopicBus::new());
        let (tx, mut rx) = mpsc::channel(10);
        bus.subscribe("kept", tx);
        let ctx = ExecutionContext::new(CancellationToken::new(), bus);

        for input in inputs {
            handler
                .handle(&ctx, Some(input), &["kept".to_string()])
                .await
                .unwrap();
        }
        let mut names = Vec::new();
        while let Ok(payload) = rx.try_recv() {
            names.push(payload.as_record().unwrap()["name"].clone());
        }
        names
    }

    fn people() -> Vec<Payload> {
        vec![
            person("percy", "Oslo"),
            person("anna", "Bergen"),
            person("percy", "Bergen"),
        ]
    }

    #[tokio::test]
    async fn test_any_filter_is_enough_by_default() {
        let handler = MapFilter::new();
        handler
            .configuration()
            .set_property("filters", [("name", "percy"), ("city", "Bergen")])
            .unwrap();

        assert_eq!(passed(&handler, people()).await, vec!["percy", "anna", "percy"]);
    }

    #[tokio::test]
    async fn test_strict_requires_every_filter() {
        let handler = MapFilter::new();
        handler
            .configuration()
            .set_property("filters", [("name", "percy"), ("city", "Bergen")])
            .unwrap();
        handler.configuration().set_property("strict", true).unwrap();

        assert_eq!(passed(&handler, people()).await, vec!["percy"]);
    }

    #[tokio::test]
    async fn test_raw_bytes_are_rejected() {
        let handler = MapFilter::new();
        handler.configuration().set_property("filters", [("name", "percy")]).unwrap();
        let ctx = ExecutionContext::new(CancellationToken::new(), Arc::new(TopicBus::new()));

        let result = handler.handle(&ctx, Some(Payload::new("name=percy", "Test")), &[]).await;
        assert!(matches!(result, Err(HandlerError::UnexpectedBody { expected: "record" })));
    }

    #[test]
    fn test_filters_are_required_and_non_empty() {
        let handler = MapFilter::new();
        assert_eq!(handler.validate_configuration(), Err(vec!["filters".to_string()]));

        handler
            .configuration()
            .set_property("filters", HashMap::<String, String>::new())
            .unwrap();
        assert_eq!(handler.validate_configuration(), Err(vec!["filters".to_string()]));
    }
}
