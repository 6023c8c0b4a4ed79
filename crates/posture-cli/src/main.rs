//! Posture CLI - Monitors sitting posture through a camera.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::try_new(config.log_level().to_lowercase())
            .unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    for path in &config.sources {
        info!("Loaded config: {}", path.display());
    }

    let result = match cli.command {
        Some(Commands::Run(args)) => commands::run::run(&args.with_config(&config)),
        Some(Commands::Check(args)) => commands::check::run(&args.with_config(&config)),
        // Default behavior: run the monitor with flattened args
        None => commands::run::run(&cli.run.with_config(&config)),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    };

    exit_code.into()
}
