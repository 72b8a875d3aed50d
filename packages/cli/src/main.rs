mod commands;
mod config;
mod keys;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    compose, export, init, new, project, validate, ComposeArgs, ExportArgs, InitArgs, NewArgs,
    ProjectCommand, ValidateArgs,
};
use tracing_subscriber::EnvFilter;

/// Screenwright CLI - screenplay editing, storage and export
#[derive(Parser, Debug)]
#[command(name = "screenwright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a screenwright.config.json in the current directory
    Init(InitArgs),

    /// Create a new .screenplay file
    New(NewArgs),

    /// Check that a .screenplay file loads
    Validate(ValidateArgs),

    /// Export a screenplay as layout JSON or paginated text
    Export(ExportArgs),

    /// Replay a key script through the editor and save the result
    Compose(ComposeArgs),

    /// Manage projects in the local store
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(dir) => {
            let cwd = dir.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::New(args) => new(args, &cwd),
                Command::Validate(args) => validate(args, &cwd),
                Command::Export(args) => export(args, &cwd),
                Command::Compose(args) => compose(args, &cwd).await,
                Command::Project { command } => project(command, &cwd).await,
            }
        }
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
