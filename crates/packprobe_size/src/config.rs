use anyhow::{Result, anyhow};
use clap::Parser;
use log::debug;
use std::{fs, path::Path};

use packprobe_core::DEFAULT_CDN_BASE;

#[derive(Debug, Clone, Parser)]
#[command(name = "size")]
#[command(about = "Estimate the installed footprint of a JavaScript module")]
pub struct Config {
    /// Package name (optionally with @version or /subpath), URL, or local
    /// path. Defaults to the `main` entry of ./package.json
    pub specifier: Option<String>,

    /// CDN base used to fetch package manifests and files
    #[arg(long, default_value = DEFAULT_CDN_BASE)]
    pub cdn: String,

    /// Measure the raw bundle without minifying first
    #[arg(long)]
    pub no_minify: bool,
}

/// Pick the entry specifier: an explicit argument wins; a directory argument
/// (or no argument at all) falls back to the `main` field of its
/// package.json, with index.js as the last resort.
pub(crate) fn resolve_entry(cfg: &Config) -> Result<String> {
    match &cfg.specifier {
        Some(s) if Path::new(s).is_dir() => entry_from_manifest(Path::new(s)),
        Some(s) => Ok(s.clone()),
        None => entry_from_manifest(Path::new(".")),
    }
}

fn entry_from_manifest(dir: &Path) -> Result<String> {
    let manifest_path = dir.join("package.json");
    debug!("Reading local manifest: {}", manifest_path.display());
    let text = fs::read_to_string(&manifest_path).map_err(|_| {
        anyhow!("No specifier given and no package.json found in {}", dir.display())
    })?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let main = json.get("main").and_then(|m| m.as_str()).unwrap_or("index.js");
    Ok(dir.join(main).to_string_lossy().to_string())
}
