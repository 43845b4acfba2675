//! Subfmt - Subtitle Filename Convention Converter
//!
//! Command line entry point: loads configuration, sets up logging and runs the
//! requested conversion or inspection command.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subfmt::cli::{Args, Commands};
use subfmt::config::Config;
use subfmt::converter::{RenameResults, SubFormatConverter};
use subfmt::formatter::{FormatDescriptor, FormatterRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("subfmt.toml").exists() {
                info!("Found subfmt.toml in current directory, loading...");
                Config::from_file("subfmt.toml")?
            } else {
                Config::default()
            }
        }
    };

    let converter = SubFormatConverter::from_config(&config);

    match args.command {
        Commands::Convert { movies, series, to, legacy_code, dry_run, json } => {
            let mut config = config;
            if let Some(movies) = movies {
                config.library.movies_root = Some(movies);
            }
            if let Some(series) = series {
                config.library.series_root = Some(series);
            }
            if let Some(to) = to {
                config.formatter.target = Some(converter.registry().resolve_name(&to)?.name());
            }
            if let Some(code) = legacy_code {
                config.formatter.target = Some(converter.registry().legacy_formatter(code)?.name());
                config.formatter.legacy_code = Some(code);
            }
            config.validate()?;

            let movies_root = config.library.movies_root()?;
            let series_root = config.library.series_root()?;
            let target = config.formatter.target_convention();

            if dry_run {
                let planned = converter.plan_all(movies_root, series_root, target).await?;
                for (from, to) in &planned {
                    let root = if from.starts_with(movies_root) { movies_root } else { series_root };
                    println!("{} -> {}", relative(from, root), relative(to, root));
                }
                println!("{} subtitle(s) would be renamed to {}", planned.len(), target);
                return Ok(());
            }

            let cancel = cancel_on_ctrl_c();
            let results = converter.convert_all(movies_root, series_root, target, &cancel).await?;
            print_results(&results, json)?;
        }
        Commands::Rename { to, dry_run, files } => {
            let target = converter.registry().resolve_name(&to)?.name();

            if dry_run {
                for file in &files {
                    match converter.plan(file, target)? {
                        Some(new_path) => println!("{} -> {}", file.display(), new_path.display()),
                        None => println!("{} (unchanged)", file.display()),
                    }
                }
                return Ok(());
            }

            let cancel = cancel_on_ctrl_c();
            let results = converter.convert_files(&files, target, &cancel).await?;
            print_results(&results, false)?;
        }
        Commands::Detect { files } => {
            let registry = converter.registry();
            println!(
                "{:<14} {:<40} {:<10} {:<12} {:<8} {:<8} {:<8}",
                "Convention", "Base name", "Language", "Prefix", "Ext", "Default", "Forced"
            );
            println!("{}", "-".repeat(106));

            for file in &files {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                match registry.detect(&name) {
                    Some((convention, d)) => println!(
                        "{:<14} {:<40} {:<10} {:<12} {:<8} {:<8} {:<8}",
                        convention,
                        d.base_name,
                        d.language_tag,
                        d.extra_prefix,
                        d.extension,
                        yes_no(d.is_default_track()),
                        yes_no(d.is_forced_track())
                    ),
                    None => println!("{:<14} {}", "-", name),
                }
            }
        }
        Commands::Conventions => {
            let registry = FormatterRegistry::new();
            println!("{:<14} {:<6} {}", "Name", "Code", "Example");
            println!("{}", "-".repeat(60));
            for formatter in registry.iter() {
                let id = formatter.name();
                let example = FormatDescriptor::new("Movie (2020)", ".ass", "zh", "");
                println!(
                    "{:<14} {:<6} {}",
                    id,
                    id.legacy_code(),
                    formatter.generate(&example).default
                );
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current file");
            token.cancel();
        }
    });
    cancel
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn relative(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| PathBuf::from(path))
        .display()
        .to_string()
}

fn print_results(results: &RenameResults, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for (path, count) in &results.renamed_files {
        println!("renamed  {} (x{})", path, count);
    }
    for (path, count) in &results.err_files {
        println!("failed   {} (x{})", path, count);
    }
    println!(
        "{} renamed, {} failed{}",
        results.renamed_count(),
        results.failed_count(),
        if results.cancelled { " (cancelled)" } else { "" }
    );
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subfmt").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subfmt.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
