use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use klimaplot_core::config::{LayoutMode, PipelineConfig};
use klimaplot_core::pipeline::run_batch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod routes;

#[derive(Parser, Debug)]
#[command(author, version, about = "Klimaplot logger-chart CLI and API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the upload/plot API server
    Serve(ServeArgs),
    /// Render charts for local logger exports
    Plot(PlotArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
    /// Directory generated artifacts are served from
    #[arg(long, default_value = "static")]
    serve_dir: PathBuf,
    /// Seconds artifacts stay available before cleanup (0 disables)
    #[arg(long, default_value_t = 60)]
    cleanup_secs: u64,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,
    /// One artifact per input instead of a combined grid
    #[arg(long)]
    individual: bool,
    #[arg(long)]
    dpi: Option<u32>,
    #[arg(long)]
    timestamp_count: Option<usize>,
    /// Temperature axis bounds as "min,max"
    #[arg(long)]
    temp_range: Option<String>,
    /// Humidity axis bounds as "min,max"
    #[arg(long)]
    relh_range: Option<String>,
    #[arg(long, default_value = "plots")]
    out_dir: PathBuf,
    /// TOML file overriding header phrasings, noise tokens and name variants
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => routes::serve(args.addr, args.serve_dir, args.cleanup_secs).await,
        Command::Plot(args) => run_plot(args),
    }
}

fn run_plot(args: PlotArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if args.individual {
        config.plot.layout = LayoutMode::Individual;
    }
    if let Some(dpi) = args.dpi {
        config.plot.dpi = dpi;
    }
    if let Some(count) = args.timestamp_count {
        config.plot.timestamp_count = count;
    }
    if let Some(range) = &args.temp_range {
        config.plot.temp_range = parse_range(range)?;
    }
    if let Some(range) = &args.relh_range {
        config.plot.relh_range = parse_range(range)?;
    }

    let paths = expand_inputs(&args.inputs)?;
    if paths.is_empty() {
        bail!("no input files matched");
    }

    let report = run_batch(&paths, &config, &args.out_dir)?;

    if report.is_all_failed() {
        warn!(files = report.reports.len(), "no usable charts were produced");
    } else {
        info!(
            rendered = report.rendered_count(),
            skipped = report.skipped_count(),
            "batch complete"
        );
        for artifact in &report.artifacts {
            info!(artifact = %artifact.display(), "artifact written");
        }
    }
    for file in report.reports.iter().filter(|r| r.message.is_some()) {
        warn!(file = %file.path, status = ?file.status, "file skipped");
    }
    Ok(())
}

/// Parses an axis bound pair of the form "min,max".
pub(crate) fn parse_range(raw: &str) -> Result<(f64, f64)> {
    let Some((min, max)) = raw.split_once(',') else {
        bail!("range '{raw}' is not of the form min,max");
    };
    let min: f64 = min
        .trim()
        .parse()
        .with_context(|| format!("invalid range bound '{}'", min.trim()))?;
    let max: f64 = max
        .trim()
        .parse()
        .with_context(|| format!("invalid range bound '{}'", max.trim()))?;
    Ok((min, max))
}

fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in
            glob::glob(pattern).with_context(|| format!("invalid glob pattern '{pattern}'"))?
        {
            paths.push(entry?);
            matched = true;
        }
        if !matched {
            // Literal paths glob finds nothing for are still attempted, so a
            // missing file surfaces as a per-file read error in the report.
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::parse_range;

    #[test]
    fn parses_a_range_pair() {
        assert_eq!(parse_range("10,30").unwrap(), (10.0, 30.0));
        assert_eq!(parse_range(" 5 , 27.5 ").unwrap(), (5.0, 27.5));
    }

    #[test]
    fn rejects_malformed_ranges() {
        assert!(parse_range("10").is_err());
        assert!(parse_range("low,high").is_err());
    }
}
