//! Installed-footprint estimation for JavaScript modules.
//!
//! This crate drives the resolution engine from `packprobe_core`: one
//! orchestrator run fans out over the dependency graph of an entry
//! specifier, accumulates every reachable module's source into a bundle,
//! minifies the result, and reports minified and gzip-compressed sizes.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use packprobe_size::{Config, run_size_check};
//! use std::io::{BufWriter, Write};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     specifier: Some("lodash-es/isEqual".to_string()),
//!     cdn: packprobe_core::DEFAULT_CDN_BASE.to_string(),
//!     no_minify: false,
//! };
//!
//! let result = run_size_check(cfg).await?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! packprobe_size::print_report(&mut stdout, &result.entry, &result.report)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod bundle;
mod checker;
mod config;
mod minify;
mod orchestrator;
mod report;

// Re-export public API
pub use bundle::Bundle;
pub use checker::{CheckResult, run_size_check};
pub use config::Config;
pub use orchestrator::Orchestrator;
pub use report::{SizeReport, print_report};
