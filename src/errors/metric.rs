// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("metric names cannot be empty")]
    EmptyName,

    #[error("metric '{0}' is already registered")]
    Duplicate(String),
}
