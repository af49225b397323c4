use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, Error, MarketQuote};
use engine::StrategyPipeline;
use strategy::PipelineFileConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("loading environment config")?;
    info!(backend = %cfg.model_backend, "stellar-ai starting");

    let pipeline_cfg = if Path::new(&cfg.pipeline_config_path).exists() {
        PipelineFileConfig::load(&cfg.pipeline_config_path)?
    } else {
        warn!(path = %cfg.pipeline_config_path, "Pipeline config not found, using defaults");
        PipelineFileConfig::default()
    };

    // ── Pipeline ──────────────────────────────────────────────────────────────
    let pipeline = Arc::new(StrategyPipeline::new(pipeline_cfg, cfg.model_backend)?);

    // ── Replay snapshots ──────────────────────────────────────────────────────
    let snapshot_path = cfg.require_snapshot_path()?;
    let content = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("reading snapshots from '{snapshot_path}'"))?;

    let mut snapshots = 0usize;
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let quotes: Vec<MarketQuote> = serde_json::from_str(line)
            .with_context(|| format!("parsing snapshot on line {}", line_no + 1))?;
        pipeline.ingest_snapshot(&quotes).await;
        snapshots += 1;
    }
    info!(snapshots, "Snapshots replayed");

    // ── Training ──────────────────────────────────────────────────────────────
    match pipeline.train_from_history().await {
        Ok(report) => info!(
            samples = report.samples,
            features = report.features,
            r2 = ?report.in_sample_r2,
            "Model ready"
        ),
        Err(e @ Error::InsufficientData { .. }) => {
            warn!(error = %e, "Not enough history to train; recommendations need more snapshots")
        }
        Err(e) => return Err(e).context("training from history"),
    }

    // ── Recommendations ───────────────────────────────────────────────────────
    let status = pipeline.status().await;
    println!("{}", serde_json::to_string(&status)?);

    for token in pipeline.tokens().await {
        match pipeline.recommend(&token).await {
            Ok(analysis) => println!("{}", serde_json::to_string(&analysis)?),
            Err(e) => warn!(token = %token, error = %e, "No recommendation"),
        }
    }

    if let Some(summary) = pipeline.market_summary().await {
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
