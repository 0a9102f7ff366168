use anyhow::Result;
use log::{debug, info};

use crate::{
    config::{Config, resolve_entry},
    orchestrator::Orchestrator,
    report::{self, SizeReport},
};

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub entry: String,
    pub report: SizeReport,
}

pub async fn run_size_check(cfg: Config) -> Result<CheckResult> {
    info!("Starting size check");

    let entry = resolve_entry(&cfg)?;
    debug!("Entry specifier: '{}', CDN base: {}", entry, cfg.cdn);

    let orchestrator = Orchestrator::new(&cfg.cdn);
    let bundle = orchestrator.run(&entry).await?;

    let report = report::measure(&bundle, !cfg.no_minify);
    info!(
        "Size check complete: {} file(s), {} bytes compressed",
        report.file_count, report.compressed_bytes
    );
    Ok(CheckResult { entry, report })
}
