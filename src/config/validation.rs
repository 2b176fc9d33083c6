// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Checks a pipeline definition before anything is built from it.
//!
//! Three checks run over every processor and all findings are collected, so a
//! broken definition is reported in one go:
//!
//! 1. **Names**: a processor name must be non-empty and unique
//! 2. **Handlers**: the handler must be known to the registry
//! 3. **Topics**: a subscription should name a topic some processor publishes to
//!
//! The topic check only produces warnings. A payload can reach a topic from
//! outside the pipeline, for instance from an embedding application that
//! publishes on the same bus.

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::errors::ConfigError;
use crate::handlers::HandlerRegistry;

/// Validate `cfg` against `registry`.
///
/// Returns the warnings when there are no errors, or the errors otherwise.
pub fn validate_pipeline(
    cfg: &PipelineConfig,
    registry: &HandlerRegistry,
) -> Result<Vec<ConfigError>, Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut names = HashSet::new();

    for (index, processor) in cfg.processors.iter().enumerate() {
        if processor.name.trim().is_empty() {
            errors.push(ConfigError::EmptyProcessorName { index });
        } else if !names.insert(processor.name.as_str()) {
            errors.push(ConfigError::DuplicateProcessorName {
                name: processor.name.clone(),
            });
        }

        if !registry.contains(&processor.handler) {
            errors.push(ConfigError::UnknownHandler {
                processor: processor.name.clone(),
                handler: processor.handler.clone(),
            });
        }
    }

    let published: HashSet<&str> = cfg
        .processors
        .iter()
        .flat_map(|p| p.topics.iter().map(String::as_str))
        .collect();
    for processor in &cfg.processors {
        for topic in &processor.subscriptions {
            if !published.contains(topic.as_str()) {
                warnings.push(ConfigError::TopicWithoutPublisher {
                    processor: processor.name.clone(),
                    topic: topic.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessorConfig;

    fn processor(name: &str, handler: &str, topics: &[&str], subscriptions: &[&str]) -> ProcessorConfig {
        ProcessorConfig {
            name: name.to_string(),
            handler: handler.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            subscriptions: subscriptions.iter().map(|t| t.to_string()).collect(),
            properties: Default::default(),
        }
    }

    fn pipeline(processors: Vec<ProcessorConfig>) -> PipelineConfig {
        PipelineConfig {
            drain_buffers: false,
            processors,
        }
    }

    #[test]
    fn test_validation_cases() {
        struct TestCase {
            name: &'static str,
            processors: Vec<ProcessorConfig>,
            expected: Result<Vec<ConfigError>, Vec<ConfigError>>,
        }

        let test_cases = vec![
            TestCase {
                name: "wired pipeline",
                processors: vec![
                    processor("listdir", "ListDirectory", &["found"], &[]),
                    processor("reader", "ReadFile", &["content"], &["found"]),
                    processor("printer", "Stdout", &[], &["content"]),
                ],
                expected: Ok(vec![]),
            },
            TestCase {
                name: "empty definition",
                processors: vec![],
                expected: Ok(vec![]),
            },
            TestCase {
                name: "subscription without publisher is only a warning",
                processors: vec![processor("printer", "Stdout", &[], &["external"])],
                expected: Ok(vec![ConfigError::TopicWithoutPublisher {
                    processor: "printer".to_string(),
                    topic: "external".to_string(),
                }]),
            },
            TestCase {
                name: "blank name",
                processors: vec![processor("  ", "Stdout", &[], &[])],
                expected: Err(vec![ConfigError::EmptyProcessorName { index: 0 }]),
            },
            TestCase {
                name: "duplicate name",
                processors: vec![
                    processor("printer", "Stdout", &[], &[]),
                    processor("printer", "Stdout", &[], &[]),
                ],
                expected: Err(vec![ConfigError::DuplicateProcessorName {
                    name: "printer".to_string(),
                }]),
            },
            TestCase {
                name: "unknown handler",
                processors: vec![processor("pcap", "OpenPcap", &[], &[])],
                expected: Err(vec![ConfigError::UnknownHandler {
                    processor: "pcap".to_string(),
                    handler: "OpenPcap".to_string(),
                }]),
            },
        ];

        let registry = HandlerRegistry::with_builtin_handlers();
        for test_case in test_cases {
            let result = validate_pipeline(&pipeline(test_case.processors), &registry);
            assert_eq!(result, test_case.expected, "{}", test_case.name);
        }
    }

    #[test]
    fn test_warnings_are_classified() {
        let warning = ConfigError::TopicWithoutPublisher {
            processor: "p".to_string(),
            topic: "t".to_string(),
        };
        assert!(warning.is_warning());
        assert!(!ConfigError::EmptyProcessorName { index: 0 }.is_warning());
    }
}
