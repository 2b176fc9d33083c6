// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod handler;
pub mod metric_provider;

pub use handler::Handler;
pub use metric_provider::MetricProvider;
