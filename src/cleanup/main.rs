//! One-shot cleanup of the transport point snapshot.
//!
//! Reads regions and points, removes duplicates and foreign entries, labels
//! every point with its region, and writes the cleaned snapshot.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use somgeo::config::Config;
use somgeo::dataset;
use somgeo::pip::{CleanupPass, CleanupReport, RegionResolver, RemovalReason};

#[derive(Parser, Debug)]
#[command(name = "cleanup")]
#[command(about = "Deduplicate, filter, and region-label transport points")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transport points GeoJSON, defaults to data.points from the config
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Region boundaries GeoJSON, defaults to data.regions from the config
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Where to write the cleaned points
    #[arg(short, long)]
    output: PathBuf,

    /// Optional JSON report of removed points
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref())?;

    let regions_path = args.regions.unwrap_or_else(|| config.data.regions.clone());
    let input_path = args.input.unwrap_or_else(|| config.data.points.clone());

    info!("Cleaning transport points for {}", config.country.name);
    info!("Input: {}", input_path.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    pb.set_message("Loading regions");
    let regions = dataset::load_regions(&regions_path)?;
    if regions.is_empty() {
        warn!("No regions loaded; only the country box will be used");
    }
    let resolver = RegionResolver::from_regions(regions);

    pb.set_message("Loading transport points");
    let points = dataset::load_points(&input_path)?;
    let input_count = points.len();

    pb.set_message("Running cleanup pass");
    let report = CleanupPass::new(&resolver, config.country.cleanup()).run(points);

    pb.set_message("Writing output");
    dataset::write_points(&args.output, &report.kept)?;
    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    pb.finish_with_message("Done");

    log_summary(input_count, &report);

    Ok(())
}

fn write_report(path: &Path, report: &CleanupReport) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create report: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report.removed)?;
    writer.flush()?;
    info!("Wrote removal report to {}", path.display());
    Ok(())
}

fn log_summary(input_count: usize, report: &CleanupReport) {
    let duplicates = report.count_removed(|r| matches!(r, RemovalReason::Duplicate { .. }));
    let excluded = report.count_removed(|r| matches!(r, RemovalReason::ExcludedCode { .. }));
    let outside = report.count_removed(|r| matches!(r, RemovalReason::OutsideCountry));

    info!("Input points:        {}", input_count);
    info!("Duplicates removed:  {}", duplicates);
    info!("Excluded by code:    {}", excluded);
    info!("Outside country:     {}", outside);
    info!("Kept:                {}", report.kept.len());
    if report.unlabeled() > 0 {
        warn!(
            "{} kept points fall inside the country box but in no region",
            report.unlabeled()
        );
    }
}
