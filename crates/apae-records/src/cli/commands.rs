//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::Resource;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Direct record operations, bypassing HTTP.
#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// Print every record of a resource
    List {
        /// Resource to read
        #[arg(value_enum)]
        resource: ResourceArg,
    },

    /// Print one record
    Get {
        /// Resource to read
        #[arg(value_enum)]
        resource: ResourceArg,
        /// Record id
        id: String,
    },

    /// Create a record from a JSON object
    Create {
        /// Resource to write
        #[arg(value_enum)]
        resource: ResourceArg,
        /// Field values, e.g. '{"name": "Ana"}'
        #[arg(short, long, default_value = "{}")]
        data: String,
    },

    /// Update a record from a JSON object
    Update {
        /// Resource to write
        #[arg(value_enum)]
        resource: ResourceArg,
        /// Record id
        id: String,
        /// Field values, e.g. '{"status": "inactive"}'
        #[arg(short, long)]
        data: String,
    },

    /// Delete a record
    Delete {
        /// Resource to write
        #[arg(value_enum)]
        resource: ResourceArg,
        /// Record id
        id: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Resource argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceArg {
    /// Users
    Users,
    /// Professionals
    Professionals,
    /// Teachers
    Teachers,
    /// Students
    Students,
    /// Appointments
    Appointments,
    /// Events
    Events,
}

impl From<ResourceArg> for Resource {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::Users => Self::Users,
            ResourceArg::Professionals => Self::Professionals,
            ResourceArg::Teachers => Self::Teachers,
            ResourceArg::Students => Self::Students,
            ResourceArg::Appointments => Self::Appointments,
            ResourceArg::Events => Self::Events,
        }
    }
}
