//! rillc - command-line interface for the Rill compiler.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rillc_drv::{Config, FileConfig, Session};

/// Compiler for the Rill language.
///
/// Reads one source file and writes its intermediate representation to
/// the destination file. Nothing is written when the compile reports
/// errors.
#[derive(Parser, Debug)]
#[command(name = "rillc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler for the Rill language", long_about = None)]
struct Cli {
    /// Source file to compile
    source: PathBuf,

    /// Destination file (default: the source path with a .c extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Interleave human-readable comments with the emitted code
    #[arg(long, env = "RILLC_DEBUG")]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "RILLC_VERBOSE")]
    verbose: bool,

    /// Path to a configuration file (default: rillc.toml next to the
    /// source)
    #[arg(short, long, env = "RILLC_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.source.with_file_name(FileConfig::FILE_NAME));
    let file_config = FileConfig::load(&config_path)?;

    let config = Config::resolve(cli.source, cli.output, cli.debug, &file_config);
    Session::new(config).compile()?;

    Ok(())
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")?;

    Ok(())
}
