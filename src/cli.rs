use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use lns::models::valid_frameworks;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lns")]
#[command(about = "Local dev-server registry - projects, services and their ports")]
pub struct Cli {
    /// Directory holding registry.json and settings.json (defaults to ~/.lns)
    #[arg(long, global = true, env = "LNS_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),
    /// Manage services within a project
    #[command(subcommand)]
    Service(ServiceCommands),
    /// Inspect port assignments
    #[command(subcommand)]
    Ports(PortsCommands),
    /// List known frameworks and their preferred port ranges
    Frameworks,
    /// Show or change proxy listener settings
    #[command(subcommand)]
    Settings(SettingsCommands),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Register a new project
    Add {
        /// Project name (unique)
        name: String,
        /// Filesystem path of the project's codebase
        #[arg(long)]
        path: Option<PathBuf>,
        /// Hostname prefix (defaults to the project name)
        #[arg(long)]
        prefix: Option<String>,
        /// Docker network the project's containers join
        #[arg(long)]
        docker_network: Option<String>,
    },
    /// Remove a project and release all of its ports
    #[command(alias = "rm")]
    Remove {
        /// Project name
        name: String,
    },
    /// List projects
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a project and its services
    Show {
        /// Project name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the filesystem path recorded for a project
    SetPath {
        /// Project name
        name: String,
        /// New path
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// Register a service and assign it a port
    Add {
        /// Project the service belongs to
        project: String,
        /// Service name (unique within the project)
        name: String,
        /// Framework, used to pick the preferred port range
        #[arg(short, long, default_value = "generic", value_parser = PossibleValuesParser::new(valid_frameworks()))]
        framework: String,
        /// Explicit port; omit to auto-assign
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
        /// Hostname override (defaults to <prefix>-<name>.localhost)
        #[arg(long)]
        hostname: Option<String>,
        /// Route through a Docker container instead of localhost
        #[arg(long)]
        docker: bool,
        /// Container name used when --docker is set
        #[arg(long, requires = "docker")]
        container_name: Option<String>,
        /// URL path prefix the service is mounted under
        #[arg(long)]
        path_prefix: Option<String>,
    },
    /// Remove a service and release its port
    #[command(alias = "rm")]
    Remove {
        /// Project the service belongs to
        project: String,
        /// Service name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum PortsCommands {
    /// List all port assignments
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which service holds a port, if any
    Check {
        /// Port to look up
        port: u16,
    },
    /// Suggest the next free port for a framework without reserving it
    Suggest {
        /// Framework name
        #[arg(value_parser = PossibleValuesParser::new(valid_frameworks()))]
        framework: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update settings; unspecified values are kept
    Set {
        /// Public HTTP listener port
        #[arg(long)]
        http_port: Option<u16>,
        /// Admin API address (host:port)
        #[arg(long)]
        admin_addr: Option<String>,
    },
}
