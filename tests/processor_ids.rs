// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lives in its own test binary so no other test allocates processor ids
//! concurrently.

use std::sync::Arc;

use flowbus::engine::{Processor, TopicBus};

#[test]
fn test_processor_ids_are_sequential_from_one() {
    let bus = Arc::new(TopicBus::new());
    let first = Processor::with_bus("first", Vec::<String>::new(), bus.clone());
    let second = Processor::with_bus("second", Vec::<String>::new(), bus);

    assert_eq!(first.id, 1);
    assert_eq!(second.id, first.id + 1);
    assert_eq!(first.metric_prefix(), "first_1");
}

#[test]
fn test_global_bus_is_shared() {
    assert!(Arc::ptr_eq(&TopicBus::global(), &TopicBus::global()));
}
