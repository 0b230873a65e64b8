mod config;
mod gate;
mod surface;

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use prometheus::{Encoder, TextEncoder};
use tracing::info;

use tagflow_client::CatalogClient;
use tagflow_core::{CompletionSweep, Controller, RunReport};
use tagflow_observe::init_logging;
use tagflow_prometheus::PrometheusMetrics;

use crate::config::CliConfig;
use crate::gate::StdinGate;
use crate::surface::PlanSurface;

#[derive(Parser)]
#[command(name = "tagflow", version, about = "Batch automation for a media catalog")]
struct Cli {
    /// JSON config file merged over built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog server base URL.
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// API key, when the server requires authentication.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log filter expression (e.g. "info", "tagflow_core=debug,info").
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: text|json|journald.
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Assume yes on confirmation prompts.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Write prometheus metrics to this file before exiting.
    #[arg(long, global = true)]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify connectivity to the catalog server.
    Check,

    /// Find-or-create tags by name.
    Resolve {
        /// Comma-separated tag names.
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,

        /// File with one tag name per line.
        #[arg(long)]
        names_file: Option<PathBuf>,
    },

    /// Drive a full dual-queue run over a captured surface snapshot.
    ///
    /// Activations are replayed as log lines; tag resolution goes to the
    /// real server.
    Run {
        /// Surface snapshot JSON file.
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Create missing entries discovered in a captured surface snapshot.
    Complete {
        /// Surface snapshot JSON file.
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Local-offset detection must precede the runtime's worker threads.
    tagflow_observe::init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = CliConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.server_url {
        cfg.client.base_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        cfg.client.api_key = Some(key.clone());
    }
    if let Some(level) = &cli.log_level {
        cfg.log.level = level.parse()?;
    }
    if let Some(format) = &cli.log_format {
        cfg.log.format = format.parse()?;
    }
    init_logging(&cfg.log)?;

    let metrics = match &cli.metrics_file {
        Some(_) => Some(Arc::new(PrometheusMetrics::new()?)),
        None => None,
    };
    let gate = StdinGate::new(cli.yes);

    match &cli.command {
        Command::Check => {
            let client = CatalogClient::new(&cfg.client)?;
            let schema = client.check_connection().await?;
            println!("catalog reachable (database schema {schema})");
        }
        Command::Resolve { names, names_file } => {
            let names = collect_names(names, names_file.as_deref())?;
            anyhow::ensure!(!names.is_empty(), "no tag names given");

            let client = CatalogClient::new(&cfg.client)?;
            let mut resolved = Vec::new();
            let mut failed = Vec::new();
            for name in &names {
                match client.find_or_create_tag(name).await {
                    Some(id) => resolved.push((name.clone(), id)),
                    None => failed.push(name.clone()),
                }
            }

            if cli.json {
                let out = serde_json::json!({
                    "resolved": resolved
                        .iter()
                        .map(|(name, id)| serde_json::json!({"name": name, "id": id}))
                        .collect::<Vec<_>>(),
                    "failed": failed,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for (name, id) in &resolved {
                    println!("{name} -> {id}");
                }
                for name in &failed {
                    println!("{name} -> failed");
                }
                println!("{} resolved, {} failed", resolved.len(), failed.len());
            }
        }
        Command::Run { snapshot } => {
            let surface = Arc::new(PlanSurface::from_file(snapshot)?);
            let client = Arc::new(CatalogClient::new(&cfg.client)?);
            let mut controller = Controller::new(surface, client, cfg.runner.clone());
            if let Some(metrics) = &metrics {
                controller = controller.with_metrics(metrics.clone());
            }

            let report = controller.run(&gate).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Complete { snapshot } => {
            let surface = Arc::new(PlanSurface::from_file(snapshot)?);
            let sweep = CompletionSweep::new(surface, cfg.automation.clone())
                .with_step_delay(Duration::from_millis(cfg.runner.step_delay_ms));

            let report = sweep.run(&gate).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} missing entries discovered, {} created",
                    report.discovered, report.activated
                );
            }
        }
    }

    if let (Some(path), Some(metrics)) = (&cli.metrics_file, &metrics) {
        write_metrics(path, metrics)?;
        info!(path = %path.display(), "metrics written");
    }

    Ok(())
}

/// Merge `--names` and `--names-file` into one deduplicated list, keeping
/// first-occurrence order.
fn collect_names(names: &[String], names_file: Option<&std::path::Path>) -> anyhow::Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let mut push = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    };

    for name in names {
        push(name);
    }
    if let Some(path) = names_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading names file {}", path.display()))?;
        for line in text.lines() {
            push(line);
        }
    }
    Ok(out)
}

fn print_report(report: &RunReport) {
    println!(
        "run {}: {}/{} items processed",
        report.outcome.as_label(),
        report.processed,
        report.total
    );
    println!(
        "  creates activated: {} ({} missing confirms)",
        report.creates_activated, report.confirms_missing
    );
    println!("  links activated:   {}", report.links_activated);
    println!(
        "  tags resolved:     {} ({} failed)",
        report.names_resolved, report.names_failed
    );
    println!("  elapsed:           {} ms", report.elapsed_ms);
}

fn write_metrics(path: &std::path::Path, metrics: &PrometheusMetrics) -> anyhow::Result<()> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metrics.gather(), &mut buffer)
        .context("encoding metrics")?;
    fs::write(path, buffer).with_context(|| format!("writing metrics to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deduplicated_in_order() {
        let names = vec![
            "blonde".to_string(),
            " tattoo ".to_string(),
            "blonde".to_string(),
            "".to_string(),
        ];
        let out = collect_names(&names, None).unwrap();
        assert_eq!(out, vec!["blonde".to_string(), "tattoo".to_string()]);
    }
}
