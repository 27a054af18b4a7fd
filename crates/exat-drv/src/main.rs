//! exat - EXAPUNKS assembly transpiler CLI.
//!
//! Reads a source file, runs the pipeline, and prints the transpiled
//! program followed by its statistics. Failures are reported on stdout
//! and exit with a non-zero status; no partial output is produced.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use exat_drv::transpile;

/// EXAPUNKS assembly transpiler.
///
/// Accepts a superset of the in-game language (structured control flow,
/// infix assignment, rich comparisons) and lowers it to plain EXAPUNKS
/// assembly, then optimizes the result.
#[derive(Parser, Debug)]
#[command(name = "exat")]
#[command(version)]
#[command(about = "EXAPUNKS assembly transpiler", long_about = None)]
struct Cli {
    /// Input file path
    #[arg(short, long)]
    input: PathBuf,

    /// Enable verbose output
    #[arg(short, long, env = "EXAT_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    run(&cli)
}

/// Initializes the logging system. Verbose mode drops the filter down to
/// debug so the per-phase progress lines show up on stderr.
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let subscriber = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}

fn run(cli: &Cli) -> ExitCode {
    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            println!("Error reading input file: {err}");
            return ExitCode::FAILURE;
        }
    };

    let out = match transpile(&source) {
        Ok(out) => out,
        Err(err) => {
            println!("Parse error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", out.program);
    println!("LOC: {}", out.loc);

    if out.passes > 0 {
        let plural = if out.passes == 1 { "" } else { "es" };
        println!("Optimized in {} pass{}", out.passes, plural);
    }

    ExitCode::SUCCESS
}
