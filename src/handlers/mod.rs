// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in handlers and the registry that creates them by name.

mod common;
pub mod files;
pub mod filters;
pub mod parsers;
pub mod registry;
pub mod terminal;

#[cfg(test)]
pub mod stub;

pub use common::{ErrorChannel, HandlerCore, HandlerMetrics, ERROR_CHANNEL_CAPACITY};
pub use files::{ListDirectory, ReadFile, WriteFile};
pub use filters::MapFilter;
pub use parsers::ParseCsv;
pub use registry::HandlerRegistry;
pub use terminal::Stdout;
