use anyhow::Result;
use clap::Parser;

// Core modules
mod cli;
mod commands;
mod config;
mod repo;

// Layered architecture
mod domain;
mod error;
mod infrastructure;
mod services;
mod ui;

use cli::{AppCommands, Cli, Commands, ProjectCommands};
use commands::{app_package, app_show, project_init, project_show};
use config::ToolConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    // Logs go to stderr so packaged templates can be piped from stdout
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    let config = ToolConfig::load(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Project { command } => match command {
            ProjectCommands::Init { name, domain } => {
                project_init::execute(&config, name, domain).await
            }
            ProjectCommands::Show { project, json } => {
                project_show::execute(&config, project, json).await
            }
        },
        Commands::App { command } => match command {
            AppCommands::Package {
                name,
                env,
                tag,
                output_dir,
            } => app_package::execute(&config, name, env, tag, output_dir).await,
            AppCommands::Show {
                name,
                project,
                json,
                resources,
            } => app_show::execute(&config, name, project, json, resources).await,
        },
    }
}
