use colored::Colorize;
use flate2::{Compression, write::GzEncoder};
use log::{debug, warn};
use std::io::{self, Write};

use crate::{bundle::Bundle, minify::minify};

#[derive(Debug, Clone)]
pub struct SizeReport {
    pub file_count: usize,
    pub minified_bytes: usize,
    pub compressed_bytes: usize,
    /// False when minification failed or was disabled and the raw bundle
    /// text was measured instead.
    pub minified: bool,
}

pub fn measure(bundle: &Bundle, use_minifier: bool) -> SizeReport {
    let text = bundle.concat();
    let (measured, minified) = if use_minifier {
        match minify(&text) {
            Ok(min) => (min, true),
            Err(e) => {
                warn!("{}; measuring raw bundle text", e);
                (text, false)
            }
        }
    } else {
        (text, false)
    };

    let compressed_bytes = gzip_len(measured.as_bytes());
    debug!(
        "Measured {} file(s): {} bytes minified, {} bytes compressed",
        bundle.len(),
        measured.len(),
        compressed_bytes
    );
    SizeReport {
        file_count: bundle.len(),
        minified_bytes: measured.len(),
        compressed_bytes,
        minified,
    }
}

/// Deterministic compressed length: gzip at the default level.
fn gzip_len(bytes: &[u8]) -> usize {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(bytes).is_err() {
        return bytes.len();
    }
    match encoder.finish() {
        Ok(compressed) => compressed.len(),
        Err(_) => bytes.len(),
    }
}

fn kib(bytes: usize) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

pub fn print_report<W: Write>(writer: &mut W, entry: &str, report: &SizeReport) -> io::Result<()> {
    writeln!(writer, "{} {}", "●".bright_blue(), entry.bold())?;
    writeln!(writer, "  Files bundled:   {}", report.file_count.to_string().cyan())?;

    let size_label = if report.minified { "Minified size:" } else { "Raw size:" };
    writeln!(
        writer,
        "  {:<16} {} bytes ({} KiB)",
        size_label,
        report.minified_bytes.to_string().green(),
        kib(report.minified_bytes).green()
    )?;
    writeln!(
        writer,
        "  {:<16} {} bytes ({} KiB)",
        "Compressed size:",
        report.compressed_bytes.to_string().green(),
        kib(report.compressed_bytes).green()
    )?;

    if !report.minified {
        writeln!(writer, "  {}", "note: raw bundle text was measured".yellow())?;
    }
    writer.flush()?;
    Ok(())
}
