mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use lns::config::ConfigDir;
use lns::Error as LnsError;

fn main() {
    if let Err(e) = run() {
        if let Some(lns_error) = e.downcast_ref::<LnsError>() {
            eprintln!("Error: {}", lns_error);
            if let Some(suggestion) = lns_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match cli.config_dir.clone() {
        Some(dir) => ConfigDir::at(dir),
        None => ConfigDir::resolve(),
    };
    tracing::debug!(config_dir = %config.root().display(), "Using config directory");

    let out = output::CliOutput;
    match &cli.command {
        Commands::Project(cmd) => commands::run_project(cmd, &config, &out),
        Commands::Service(cmd) => commands::run_service(cmd, &config, &out),
        Commands::Ports(cmd) => commands::run_ports(cmd, &config, &out),
        Commands::Frameworks => commands::run_frameworks(&out),
        Commands::Settings(cmd) => commands::run_settings(cmd, &config, &out),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Logs go to stderr so command output on stdout stays pipeable. Quiet unless
/// `RUST_LOG` asks for more.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
