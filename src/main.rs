// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use the_junction::config::{load_and_validate_config, RuntimeBuilder};
use the_junction::engine::AdaptorReport;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(report) => {
            print_report(&report);
            // exit codes above 255 wrap on most platforms
            ExitCode::from(report.exit_code.clamp(0, 255) as u8)
        }
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<AdaptorReport> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <config.yaml|config.toml>", args[0]);
        eprintln!("Example: {} configs/hello-router.yaml", args[0]);
        bail!("expected exactly one configuration file");
    }
    let config_file = &args[1];

    let start_time = Instant::now();
    let config = load_and_validate_config(config_file)
        .with_context(|| format!("failed to load {config_file}"))?;
    let adaptor = RuntimeBuilder::from_config(&config)
        .with_context(|| format!("failed to build adaptor from {config_file}"))?;

    println!("📋 Configuration: {config_file}");
    println!("🔌 Producers: {}", config.producers.len());
    println!("🧩 Nodes: {}", config.nodes.len());
    println!("🛡️  Fail Fast: {}", config.run.fail_fast);

    let shutdown = adaptor.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let report = adaptor.run().await?;
    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());
    Ok(report)
}

fn print_report(report: &AdaptorReport) {
    if report.is_success() {
        println!("✅ All producers finished cleanly");
        return;
    }
    println!("❌ Exit code {}", report.exit_code);
    for failure in &report.failures {
        println!("   • {}: {}", failure.producer_id, failure.error);
    }
}
