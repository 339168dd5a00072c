// nichegen/cli/src/main.rs

//! `nichegen` command line.
//!
//! Commands:
//! - `nichegen generate` - build one site per niche (the default)
//! - `nichegen validate` - check a generated output tree

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nichegen::{run_from_config, validate_sites, GeneratorConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Generate static affiliate niche sites from product search results
#[derive(Parser)]
#[command(name = "nichegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate a site for every niche in the niche list
  Generate(GenerateArgs),

  /// Check generated sites for duplicate ASINs, blank brands and missing alt text
  Validate(ValidateArgs),
}

#[derive(Args, Default)]
struct GenerateArgs {
  /// Niche list CSV (overrides NICHES_FILE)
  #[arg(long)]
  niches: Option<PathBuf>,

  /// HTML template (overrides TEMPLATE_FILE)
  #[arg(long)]
  template: Option<PathBuf>,

  /// Output directory (overrides OUTPUT_DIR)
  #[arg(long)]
  output: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
  /// Root of the generated output tree
  #[arg(default_value = "sites")]
  root: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  let result = match cli.command.unwrap_or_else(|| Commands::Generate(GenerateArgs::default())) {
    Commands::Generate(args) => generate(args).await,
    Commands::Validate(args) => validate(args),
  };

  match result {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      tracing::error!("{:#}", e);
      ExitCode::FAILURE
    }
  }
}

async fn generate(args: GenerateArgs) -> Result<bool> {
  let mut config = GeneratorConfig::from_env().context("Failed to load configuration")?;
  if let Some(path) = args.niches {
    config.niches_path = path;
  }
  if let Some(path) = args.template {
    config.template_path = path;
  }
  if let Some(dir) = args.output {
    config.output_dir = dir;
  }

  tracing::info!("Starting site generation...");
  let summary = run_from_config(&config).await?;
  summary.into_result()?;
  Ok(true)
}

fn validate(args: ValidateArgs) -> Result<bool> {
  let report = validate_sites(&args.root).with_context(|| format!("Failed to validate {}", args.root.display()))?;
  if report.passed() {
    tracing::info!("All validation checks passed!");
  } else {
    tracing::error!("{} validation issues found", report.violations().count());
  }
  Ok(report.passed())
}
