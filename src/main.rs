// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use tokio_util::sync::CancellationToken;

use flowbus::config::{load_and_validate_config, PipelineBuilder};
use flowbus::engine::TopicBus;
use flowbus::handlers::HandlerRegistry;
use flowbus::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <pipeline.yaml>", args[0]);
        eprintln!("Handlers: {}", HandlerRegistry::global().names().join(", "));
        bail!("expected exactly one pipeline definition");
    }

    let cfg = load_and_validate_config(&args[1])
        .with_context(|| format!("loading pipeline definition '{}'", args[1]))?;
    let mut pipeline = PipelineBuilder::from_config(&cfg, HandlerRegistry::global(), TopicBus::global())?;

    let root = CancellationToken::new();
    pipeline.start(&root)?;
    // Only picks up payloads published onto the global bus before start
    if pipeline.drains_buffers() {
        for error in pipeline.drain_buffers().await {
            tracing::warn!(topic = error.topic(), "{}", error);
        }
    }

    println!("🚀 Pipeline running with {} processors, press Ctrl-C to stop", pipeline.processors().len());
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    root.cancel();
    pipeline.shutdown().await;
    Ok(())
}
