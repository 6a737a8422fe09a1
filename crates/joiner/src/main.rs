use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use joiner::config::Config;
use joiner::engine::BundleEngine;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the package to build
    #[arg(required_unless_present = "list")]
    package: Option<String>,

    /// Minify the combined output
    #[arg(short, long)]
    min: bool,

    /// Write the bundle to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Package document (.json or .toml); overrides the configured one
    #[arg(short, long)]
    packages: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the declared packages and exit
    #[arg(long, conflicts_with_all = ["package", "min", "output"])]
    list: bool,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();
    debug!(
        "Verbosity level: {} (log level: {})",
        cli.verbose, log_level
    );

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(packages) = cli.packages {
        config.set_packages(packages);
    }
    debug!("Configuration: {:?}", config);

    let engine = BundleEngine::from_config(&config)?;

    if cli.list {
        let mut stdout = io::stdout().lock();
        for name in engine.store().names() {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    let package = cli.package.unwrap_or_default();
    let result = engine
        .build(&package, cli.min)
        .inspect_err(|err| debug!("Build of `{}` failed: {}", package, err.kind()))
        .with_context(|| format!("Failed to build package `{package}`"))?;

    match cli.output {
        Some(output_path) => {
            fs::write(&output_path, &result.raw)
                .with_context(|| format!("Failed to write output file: {:?}", output_path))?;
            info!(
                "Bundle written to {:?} ({} bytes)",
                output_path, result.size
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(result.raw.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
