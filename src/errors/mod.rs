// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod bus;
mod config;
mod handler;
mod metric;
mod processor;
mod registry;

pub use bus::BusError;
pub use config::{ConfigError, PipelineError, PropertyError};
pub use handler::HandlerError;
pub use metric::MetricError;
pub use processor::ProcessorError;
pub use registry::RegistryError;
