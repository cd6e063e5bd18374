//! CLI definitions for stackwright
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stackwright",
    version,
    about = "Provision and package containerized applications on AWS",
    long_about = "Organizes infrastructure into projects, environments and applications.\nGenerates CloudFormation for applications and bootstraps shared project infrastructure."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Tool configuration file
    #[arg(long, global = true, env = "STACKWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, show and manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Work with applications in the workspace
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Creates a new empty project
    ///
    /// A project is a collection of containerized applications that operate together.
    Init {
        /// Project name (defaults to the project this workspace is bound to)
        name: Option<String>,

        /// Existing domain to delegate to the project, e.g. example.com
        #[arg(long, default_value = "")]
        domain: String,
    },

    /// Shows configuration, environments and applications for a project
    Show {
        /// Project name
        #[arg(short, long)]
        project: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AppCommands {
    /// Prints the CloudFormation template of an application
    ///
    /// With --output-dir the stack template, its parameters and any addons
    /// template are written to files instead.
    Package {
        /// Name of the application
        #[arg(short, long)]
        name: Option<String>,

        /// Name of the environment
        #[arg(short, long)]
        env: Option<String>,

        /// Container image tag (defaults to the short git SHA)
        #[arg(long)]
        tag: Option<String>,

        /// Directory to write the stack, parameters and addons templates to
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Shows info about a deployed application per environment
    ///
    /// Includes the route, capacity and environment variables in every
    /// environment the application is deployed to.
    Show {
        /// Name of the application
        #[arg(short, long)]
        name: Option<String>,

        /// Project name
        #[arg(short, long)]
        project: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Also list the CloudFormation resources of each environment
        #[arg(long)]
        resources: bool,
    },
}
