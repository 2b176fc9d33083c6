// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bus;
pub mod context;
pub mod processor;

pub use bus::{TopicBus, DEFAULT_QUEUE_CAPACITY};
pub use context::ExecutionContext;
pub use processor::{Failure, Processor};
