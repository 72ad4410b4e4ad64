use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

use base_standard_score::{
    CollectionOverrides, MetricsCollector, ScoreBreakdown, calculate_score,
    config::{ScoringConfig, mask_secret},
};

/// Score a Base account
#[derive(Debug, Parser)]
#[command(name = "base-standard-score", version)]
struct Cli {
    /// Account address (0x...)
    address: String,

    /// Give up on outstanding providers after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Include the collected metrics in the output
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first - this validates all security requirements
    let config = ScoringConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        eprintln!("Please check BSS_* environment variables.");
        e
    })?;

    init_secure_logging(&config)?;

    if !is_address(&cli.address) {
        return Err(anyhow::anyhow!(
            "Invalid address: {} (expected 0x followed by 40 hex characters)",
            cli.address
        ));
    }

    log_provider_keys(&config);

    let collector =
        MetricsCollector::from_config(&config).context("Failed to build metrics collector")?;

    let (metrics, score) = match cli.deadline_secs {
        Some(secs) => {
            let metrics = collector
                .collect_metrics_with_deadline(
                    &cli.address,
                    CollectionOverrides::default(),
                    Duration::from_secs(secs),
                )
                .await;
            let score = calculate_score(&metrics);
            (metrics, score)
        }
        None => {
            collector
                .score(&cli.address, CollectionOverrides::default())
                .await
        }
    };
    info!(
        "Score for {}: {} ({}), multiplier {:.2}",
        cli.address, score.total, score.tier, score.multiplier
    );

    let mut output = json!({
        "address": cli.address.to_lowercase(),
        "score": score,
        "breakdown": ScoreBreakdown::from_score(&score),
    });
    if cli.metrics {
        output["metrics"] = serde_json::to_value(&metrics)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Initialize secure logging with sanitization
fn init_secure_logging(config: &ScoringConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays machine-readable
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_span_events(if config.logging.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    if config.logging.sanitize_logs {
        info!("Secure logging initialized with data sanitization enabled");
    }

    Ok(())
}

fn log_provider_keys(config: &ScoringConfig) {
    let p = &config.providers;
    let keys = [
        ("BaseScan", &p.basescan_api_key),
        ("Blockscout", &p.blockscout_api_key),
        ("Passport", &p.passport_api_key),
    ];

    for (name, key) in keys {
        match key {
            Some(key) if config.logging.sanitize_logs => {
                info!("{} API key: {}", name, mask_secret(key))
            }
            Some(_) => warn!("Log sanitization disabled - {} API key not shown", name),
            None => info!("{} API key not configured", name),
        }
    }
}

fn is_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
