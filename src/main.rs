mod commands;
mod config;
mod metrics;
mod pipeline;
mod storage;

use crate::commands::{run_command::USAGE, RunCommand};
use crate::config::EngineConfig;
use crate::pipeline::MetricsService;
use anyhow::Context;
use log::{error, info};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let (json, validate_only) = match RunCommand::from_args(std::env::args().skip(1)) {
        RunCommand::Recompute { json } => (json, false),
        RunCommand::Validate { json } => (json, true),
        RunCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        RunCommand::Unknown(arg) => {
            eprintln!("未知参数: {}\n{}", arg, USAGE);
            std::process::exit(2);
        }
    };

    // --json 时 stdout 只留给结果，日志改走 stderr
    let target = if json {
        env_logger::Target::Stderr
    } else {
        env_logger::Target::Stdout
    };
    env_logger::Builder::from_default_env()
        .target(target)
        .filter_level(log::LevelFilter::Warn)
        .filter_module("daily_metrics", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    // 没有 .env 文件不算错误，直接用系统环境变量
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to load .env");
        }
    }

    let config = EngineConfig::from_env()?;

    info!("{}", "=".repeat(72));
    info!("Compute Daily Metrics Pipeline");
    info!("{}", "=".repeat(72));
    if validate_only {
        info!("Mode    : validate only (no writes)");
    } else {
        info!("Strategy: DELETE + INSERT (full recompute) in a single transaction");
    }
    info!("Metrics : daily_return_pct, daily_range_pct, vol_7d, vol_30d, sma_7, sma_30, volume_ratio_30d");

    let service = match MetricsService::connect(&config).await {
        Ok(service) => service,
        Err(e) => {
            error!("Fatal error during metrics computation: {}", e);
            return Err(e.into());
        }
    };
    let outcome = if validate_only {
        service.validate_only().await
    } else {
        service.run().await
    };
    service.close().await;

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            error!("Fatal error during metrics computation: {}", e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    info!("{}", "=".repeat(72));
    info!("Pipeline finished successfully.");
    Ok(())
}
