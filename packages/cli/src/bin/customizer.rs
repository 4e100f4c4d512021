use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use customizer_cli::{load_batch, load_manifest, log_filter, CommandContext, Rejection};
use customizer_config::CustomizerConfig;

#[derive(Parser)]
#[command(name = "customizer")]
#[command(about = "Check theme setting manifests and sanitize setting values")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register every setting in a manifest and report the result
    Check {
        /// JSON array of setting declarations
        manifest: PathBuf,
        #[arg(long, help = "Coerce control types unsupported by pre-4.0 hosts to text")]
        legacy: bool,
    },
    /// Sanitize a JSON object of raw values against a manifest
    Sanitize {
        /// JSON array of setting declarations
        manifest: PathBuf,
        /// JSON object of raw setting values
        values: PathBuf,
        #[arg(long, help = "Coerce control types unsupported by pre-4.0 hosts to text")]
        legacy: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn resolve_context(legacy: bool) -> anyhow::Result<CommandContext> {
    let config = CustomizerConfig::from_env().context("Invalid customizer configuration")?;
    Ok(CommandContext::resolve(legacy, &config))
}

fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Check { manifest, legacy } => check(&manifest, &resolve_context(legacy)?),
        Commands::Sanitize {
            manifest,
            values,
            legacy,
        } => sanitize(&manifest, &values, &resolve_context(legacy)?),
    }
}

fn check(manifest: &Path, context: &CommandContext) -> anyhow::Result<()> {
    let report = customizer_cli::check(load_manifest(manifest)?, context);

    println!("{}", report.to_table());
    println!(
        "Registered: {} of {} settings",
        report.registered().to_string().cyan(),
        report.total
    );
    println!("Option: {}", report.option.cyan());
    println!("Filter: {}", report.hook.dimmed());

    print_rejections(&report.rejections);
    Ok(())
}

fn print_rejections(rejections: &[Rejection]) {
    for rejection in rejections {
        let label = rejection
            .id
            .as_deref()
            .map(|id| format!("'{}'", id))
            .unwrap_or_else(|| format!("entry #{}", rejection.index));
        println!("{} {} {}", "Skipped".yellow().bold(), label, rejection.error);
    }
}

fn sanitize(manifest: &Path, values: &Path, context: &CommandContext) -> anyhow::Result<()> {
    let specs = load_manifest(manifest)?;
    let batch = load_batch(values)?;
    let report = customizer_cli::sanitize(specs, batch, context)?;

    if !report.rejections.is_empty() {
        eprintln!(
            "{} {} manifest entries were skipped",
            "Warning:".yellow().bold(),
            report.rejections.len()
        );
    }
    eprintln!("Sanitized values for option {}", report.option.cyan());

    println!("{}", serde_json::to_string_pretty(&report.values)?);
    Ok(())
}
