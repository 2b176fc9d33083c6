// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic line the engine emits is a typed message from
//! [`messages`] that implements `Display` and [`messages::StructuredLog`], so
//! log text lives in one place and carries structured fields.
//!
//! # Usage
//!
//! ```rust
//! use flowbus::observability::messages::{processor::ProcessorStarted, StructuredLog};
//!
//! ProcessorStarted {
//!     processor: "printer",
//!     processor_id: 3,
//!     handler: "Stdout",
//!     subscriptionless: false,
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
