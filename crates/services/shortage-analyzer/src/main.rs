//! Shortage analyzer CLI: reads allocation and need CSVs, writes a JSON report.

use anyhow::Context;
use clap::Parser;
use insight_tracing::{LogFormat, TracingConfig};
use shortage_analyzer::export::JsonExporter;
use shortage_analyzer::ingest::{discover_need_files, CsvAllocationSource, CsvNeedSource, NeedSource};
use shortage_analyzer::{AnalysisService, AnalyzerConfig};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "shortage-analyzer")]
#[command(version, about = "Staffing coverage, shortage and demand forecast analysis")]
struct Cli {
    /// Allocation CSV (timestamp, staff, role, employment, slot count)
    #[arg(short, long)]
    allocation: PathBuf,

    /// Need grid CSV; may be repeated
    #[arg(short, long)]
    need: Vec<PathBuf>,

    /// Directory scanned for need grid files
    #[arg(long)]
    need_dir: Option<PathBuf>,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, env = "SHORTAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Forecast horizon in days, overriding the configuration
    #[arg(long)]
    horizon_days: Option<u32>,

    /// Skip demand forecasting
    #[arg(long)]
    no_forecast: bool,

    /// Report output path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = insight_tracing::init(TracingConfig {
        service_name: "shortage-analyzer".to_string(),
        log_level: cli.log_level.clone(),
        format: cli.log_format,
    })?;

    info!("Starting shortage analyzer v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalyzerConfig::from_env()?,
    };
    if let Some(days) = cli.horizon_days {
        config.forecast.horizon_days = days;
    }
    if cli.no_forecast {
        config.forecast.enabled = false;
    }

    let allocation =
        CsvAllocationSource::new(&cli.allocation).with_default_employment(&config.ingest.default_employment);

    let mut needs: Vec<Box<dyn NeedSource>> = Vec::new();
    for path in &cli.need {
        needs.push(Box::new(CsvNeedSource::from_path(path, &config.ingest.need_file_prefix)?));
    }
    if let Some(dir) = &cli.need_dir {
        let found = discover_need_files(
            dir,
            &config.ingest.need_file_prefix,
            &config.ingest.need_file_extension,
        )
        .with_context(|| format!("scanning {}", dir.display()))?;
        needs.extend(found.into_iter().map(|s| Box::new(s) as Box<dyn NeedSource>));
    }
    if needs.is_empty() {
        warn!("No need grids given; coverage falls back to baseline-relative mode");
    }

    let service = AnalysisService::new(config)?;
    let report = service.run(&allocation, &needs)?;

    let org = &report.organization_shortage;
    info!(
        roles = report.role_shortages.len(),
        shortage_hours = org.shortage_daily_hours,
        status = ?org.status,
        immediate = ?report.immediate_staffing_roles,
        reliability = report.reliability.overall,
        "Analysis finished"
    );

    let exporter = JsonExporter::new();
    match &cli.output {
        Some(path) => exporter
            .write_to(&report, path)
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{}", exporter.export(&report)?),
    }

    Ok(())
}
