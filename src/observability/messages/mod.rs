// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `bus` - topic routing, buffering and delivery failures
//! * `processor` - processor lifecycle and handler failures
//! * `pipeline` - pipeline definition loading and wiring
//!
//! # Usage Pattern
//!
//! ```rust
//! use flowbus::observability::messages::bus::PayloadsBuffered;
//! use flowbus::observability::messages::StructuredLog;
//!
//! let msg = PayloadsBuffered {
//!     topic: "found_files",
//!     count: 2,
//!     buffered_total: 5,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod bus;
pub mod pipeline;
pub mod processor;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with its fields attached
    fn log(&self);

    /// Open a span carrying the same fields
    fn span(&self, name: &str) -> Span;
}
