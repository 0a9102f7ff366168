use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use packprobe_size::Config;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "packprobe")]
#[command(about = "Estimate how much a JavaScript module weighs once installed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Estimate the minified/compressed size of a module and its dependency graph
    Size(Config),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Size(cfg) => {
            info!("Running size check against {}", cfg.cdn);

            let result = packprobe_size::run_size_check(cfg).await?;
            packprobe_size::print_report(&mut stdout, &result.entry, &result.report)?;

            let elapsed_ms = start.elapsed().as_millis();
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                result.report.file_count.to_string().cyan()
            )?;
            stdout.flush()?;

            Ok(())
        }
    }
}
