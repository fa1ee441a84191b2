// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, RepairAction};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            package,
            thorough,
            metadata,
            workers,
        } => {
            let valid = commands::cmd_validate(&package, thorough, metadata, workers)?;
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::Repair { package, action } => match action {
            RepairAction::Oxum { message } => {
                commands::cmd_repair_oxum(&package, message.as_deref())?;
            }
            RepairAction::Add { message, workers } => {
                commands::cmd_repair_add(&package, message.as_deref(), workers)?;
            }
            RepairAction::Delete {
                remove,
                keep,
                message,
            } => {
                commands::cmd_repair_delete(&package, &remove, &keep, message.as_deref())?;
            }
        },
    }

    Ok(())
}
