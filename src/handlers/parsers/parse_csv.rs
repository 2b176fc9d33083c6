// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{Configuration, PropertyKind};
use crate::engine::ExecutionContext;
use crate::errors::{HandlerError, MetricError, PropertyError};
use crate::handlers::{ErrorChannel, HandlerCore};
use crate::payload::Payload;
use crate::traits::{Handler, MetricProvider};

pub const DEFAULT_DELIMITER: &str = ",";
pub const DEFAULT_HEADER_LENGTH: usize = 1;
pub const DEFAULT_SKIP_ROWS: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CsvSettings {
    delimiter: String,
    header_length: usize,
    skip_rows: usize,
}

/// Splits a whole CSV document into one record payload per data row.
///
/// The first `skiprows` lines are ignored, the next `headerlength` lines are
/// concatenated into the header and every following line becomes a record
/// keyed by header column. Blank lines are skipped. A document is rejected as
/// a whole, with nothing published, when a line has a single column or a row
/// is not as wide as the header.
pub struct ParseCsv {
    core: HandlerCore,
}

impl ParseCsv {
    pub const NAME: &'static str = "ParseCSV";

    pub fn new() -> Self {
        let core = HandlerCore::new(Self::NAME);
        let cfg = &core.configuration;
        cfg.add_typed_property(
            "delimiter",
            "the character or string separating columns",
            false,
            PropertyKind::String,
        );
        cfg.add_typed_property("headerlength", "how many lines the header spans", false, PropertyKind::Int);
        cfg.add_typed_property(
            "skiprows",
            "how many lines to skip at the start of each document",
            false,
            PropertyKind::Int,
        );
        Self { core }
    }

    fn settings(&self) -> Result<CsvSettings, PropertyError> {
        let cfg = &self.core.configuration;
        let delimiter = match cfg.get_property("delimiter").filter(|p| p.has_value()) {
            Some(property) => property.string()?,
            None => DEFAULT_DELIMITER.to_string(),
        };
        if delimiter.is_empty() {
            return Err(PropertyError::Unsupported {
                name: "delimiter".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(CsvSettings {
            delimiter,
            header_length: count(cfg, "headerlength", DEFAULT_HEADER_LENGTH)?,
            skip_rows: count(cfg, "skiprows", DEFAULT_SKIP_ROWS)?,
        })
    }
}

fn count(cfg: &Configuration, name: &str, default: usize) -> Result<usize, PropertyError> {
    match cfg.get_property(name).filter(|p| p.has_value()) {
        Some(property) => {
            let value = property.int64()?;
            usize::try_from(value).map_err(|_| PropertyError::Unsupported {
                name: name.to_string(),
                reason: format!("{} is negative", value),
            })
        }
        None => Ok(default),
    }
}

fn parse(document: &str, settings: &CsvSettings) -> Result<Vec<BTreeMap<String, String>>, HandlerError> {
    let mut header: Vec<&str> = Vec::new();
    let mut rows = Vec::new();

    let lines = document
        .lines()
        .skip(settings.skip_rows)
        .filter(|line| !line.is_empty());
    for (index, line) in lines.enumerate() {
        let values: Vec<&str> = line.split(settings.delimiter.as_str()).collect();
        if values.len() <= 1 {
            return Err(HandlerError::NotCsv);
        }

        if index < settings.header_length {
            header.extend(values);
            continue;
        }
        if header.len() != values.len() {
            return Err(HandlerError::HeaderMismatch {
                header: header.len(),
                row: values.len(),
            });
        }
        rows.push(
            header
                .iter()
                .zip(values)
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

impl Default for ParseCsv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for ParseCsv {
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
        let document = String::from_utf8(payload.bytes().into_owned())?;

        let records = parse(&document, &settings)?
            .into_iter()
            .map(|row| {
                let record = Payload::record(row, Self::NAME);
                match payload.metadata().get("path") {
                    Some(path) => record.with_metadata("path", path.as_str()),
                    None => record,
                }
            })
            .collect();
        self.core.emit(ctx, topics, records).await;
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Vec<String>> {
        self.core.configuration.validate_properties()?;
        match self.settings() {
            Ok(_) => Ok(()),
            Err(PropertyError::Unsupported { name, .. }) => Err(vec![name]),
            Err(_) => Err(vec![
                "delimiter".to_string(),
                "headerlength".to_string(),
                "skiprows".to_string(),
            ]),
        }
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
