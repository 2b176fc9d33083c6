// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod property;
mod runtime;
mod validation;

pub use loader::{load_and_validate_config, load_config, PipelineConfig, ProcessorConfig};
pub use property::{Configuration, Property, PropertyKind, PropertyValue};
pub use runtime::{Pipeline, PipelineBuilder};
pub use validation::validate_pipeline;
