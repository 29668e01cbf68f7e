//! partquote CLI - analyse, price and review part models
//!
//! JSON goes to stdout, logs to stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use partquote::Analyzer;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::QuoteRequest;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "partquote")]
#[command(about = "Instant quotes and DFM advice for STEP, IGES, STL and OBJ parts", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure a model and print its features
    Analyze {
        /// Model file (.step, .stp, .igs, .iges, .stl, .obj)
        file: PathBuf,
        /// Include the winning backend and failed attempts
        #[arg(long)]
        report: bool,
    },
    /// Measure, price and review a model
    Quote {
        /// Model file
        file: PathBuf,
        /// Processing type: milling, turning or printing
        #[arg(short, long, default_value = "milling")]
        process: String,
        /// Material: aluminum, steel, stainless_steel, plastic or other
        #[arg(short, long, default_value = "aluminum")]
        material: String,
        /// Number of parts
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        /// Print full-precision values instead of rounding to cents
        #[arg(long)]
        raw: bool,
    },
    /// Print design-for-manufacturing advice for a model
    Advise {
        /// Model file
        file: PathBuf,
    },
    /// Measure many models in parallel
    Batch {
        /// Model files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,partquote=info",
        1 => "warn,partquote=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfig::load_or_default(cli.config.as_deref())?;
    let analyzer = Analyzer::new(config.engine.clone());

    match cli.command {
        Commands::Analyze { file, report } => {
            print_json(&commands::analyze(&analyzer, &file, report)?)?;
        }
        Commands::Quote {
            file,
            process,
            material,
            quantity,
            raw,
        } => {
            let request = QuoteRequest {
                process,
                material,
                quantity,
                raw,
            };
            let snapshot = config.snapshot()?;
            print_json(&commands::quote(&analyzer, &file, &request, &snapshot)?)?;
        }
        Commands::Advise { file } => {
            print_json(&commands::advise(&analyzer, &file)?)?;
        }
        Commands::Batch { files } => {
            print_json(&commands::batch(&analyzer, &files))?;
        }
    }

    Ok(())
}
