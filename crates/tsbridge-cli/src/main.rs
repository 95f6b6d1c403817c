//! tsbridge CLI - TypeScript module generator
//!
//! Commands:
//! - `tsbridge generate` - Generate TypeScript modules from type manifests
//! - `tsbridge check` - Validate a tsbridge.toml configuration
//! - `tsbridge classify` - Show how each discovered type is classified

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tsbridge_core::{GeneratorConfig, GeneratorError};

mod check;
mod classify;
mod generate;
mod logging;

#[derive(Parser)]
#[command(name = "tsbridge")]
#[command(author, version, about = "TypeScript module generator for JVM type manifests", long_about = None)]
struct Cli {
    /// Path to tsbridge.toml
    #[arg(short, long, global = true, default_value = "tsbridge.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TypeScript modules
    Generate {
        /// Type manifest to read (repeatable, replaces the configured inputs)
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Output directory (overrides output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration
    Check,

    /// Print the category of every discovered type, without writing files
    Classify {
        /// Type manifest to read (repeatable, replaces the configured inputs)
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration: {:?}", cli.config))?;
    logging::init_logging(&logging::filter_directive(
        cli.log_level.as_deref(),
        &config.log_level,
    ));

    match cli.command {
        Commands::Generate { input, output } => {
            generate::run(config, input, output)?;
        }
        Commands::Check => {
            check::run(&cli.config, &config)?;
        }
        Commands::Classify { input, json } => {
            classify::run(config, input, json)?;
        }
    }

    Ok(())
}

/// Exit status for a failed command: the library error code when there is one.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GeneratorError>())
        .and_then(|e| u8::try_from(e.error_code()).ok())
        .unwrap_or(1)
}
