// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // properties + pipeline definitions
pub mod engine;     // topic bus and processors
pub mod errors;     // error handling
pub mod handlers;   // built-in handlers + registry
pub mod metrics;
pub mod observability;
pub mod payload;
pub mod traits;     // unified abstractions
