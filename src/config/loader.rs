// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::validation::validate_pipeline;
use crate::errors::PipelineError;
use crate::handlers::HandlerRegistry;
use crate::observability::messages::pipeline::ConfigurationWarning;
use crate::observability::messages::StructuredLog;

/// A pipeline definition: the processors to create and how they are wired.
///
/// # Fields
/// * `drain_buffers` - Deliver payloads published before their subscribers
///   existed once every processor has started (optional, defaults to false).
///   Every subscription in the definition is wired before anything starts, so
///   this only matters when the embedding application publishes onto the
///   shared bus before the pipeline is started
/// * `processors` - The processors, started in the order they are listed
///
/// # Example
/// ```yaml
/// drain_buffers: true
/// processors:
///   - name: listdir
///     handler: ListDirectory
///     topics: [found_files]
///     properties:
///       path: ./incoming
///   - name: printer
///     handler: Stdout
///     subscriptions: [found_files]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub drain_buffers: bool,
    pub processors: Vec<ProcessorConfig>,
}

/// One processor of a pipeline.
///
/// # Fields
/// * `name` - Unique name, also the first half of the processor's metric prefix
/// * `handler` - Registered handler name, e.g. `ParseCSV`
/// * `topics` - Egress topics the handler's output is published to
/// * `subscriptions` - Ingress topics the processor consumes
/// * `properties` - Handler properties; scalars, booleans, integers or a
///   mapping of strings
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    pub name: String,
    pub handler: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub subscriptions: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_yaml::Value>,
}

/// Load a pipeline definition from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, PipelineError> {
    let content = fs::read_to_string(path)?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a pipeline definition and check it against the global handler
/// registry.
///
/// Warnings are logged; errors are returned together.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, PipelineError> {
    let cfg = load_config(path)?;

    let warnings = validate_pipeline(&cfg, HandlerRegistry::global()).map_err(PipelineError::Invalid)?;
    for warning in &warnings {
        ConfigurationWarning { warning }.log();
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    fn write_temp(yaml: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), yaml).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
drain_buffers: true
processors:
  - name: listdir
    handler: ListDirectory
    topics: [found_files]
    properties:
      path: /tmp/incoming
      buffertime: 60
  - name: filter
    handler: MapFilter
    subscriptions: [rows]
    properties:
      filters:
        name: percy
      strict: true
"#;

        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.drain_buffers);
        assert_eq!(cfg.processors.len(), 2);
        assert_eq!(cfg.processors[0].topics, vec!["found_files"]);
        assert!(cfg.processors[0].subscriptions.is_empty());
        assert_eq!(cfg.processors[0].properties["buffertime"], serde_yaml::Value::from(60));
        assert_eq!(cfg.processors[1].subscriptions, vec!["rows"]);
        assert!(cfg.processors[1].properties["filters"].is_mapping());
    }

    #[test]
    fn test_drain_buffers_defaults_to_false() {
        let cfg: PipelineConfig = serde_yaml::from_str("processors: []").unwrap();
        assert!(!cfg.drain_buffers);
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let file = write_temp(
            r#"
processors:
  - name: listdir
    handler: ListDirectory
    topics: [found_files]
    properties:
      path: /tmp
  - name: printer
    handler: Stdout
    subscriptions: [found_files, from_outside]
"#,
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.processors[1].name, "printer");
    }

    #[test]
    fn test_load_and_validate_reports_every_error() {
        let file = write_temp(
            r#"
processors:
  - name: ""
    handler: Stdout
  - name: reader
    handler: ReadEverything
"#,
        );

        match load_and_validate_config(file.path()) {
            Err(PipelineError::Invalid(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        ConfigError::EmptyProcessorName { index: 0 },
                        ConfigError::UnknownHandler {
                            processor: "reader".to_string(),
                            handler: "ReadEverything".to_string(),
                        },
                    ]
                );
            }
            other => panic!("expected invalid definition, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_and_bad_yaml() {
        assert!(matches!(
            load_config("/definitely/not/here.yaml"),
            Err(PipelineError::Io(_))
        ));

        let file = write_temp("processors: [name: oops");
        assert!(matches!(load_config(file.path()), Err(PipelineError::Parse(_))));
    }
}
