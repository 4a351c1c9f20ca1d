use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "foamcase", version, about = "foamcase CLI")]
pub struct Cli {
    /// Emit JSON output on stdout and JSON logs on stderr.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Upgrade a case file to the current schema version.
    Migrate {
        case: PathBuf,

        /// Write the migrated case here instead of in place.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the value at a path, e.g. `models/turbulenceModels/model`.
    Get { case: PathBuf, path: String },

    /// Validate and commit `path=value` assignments as one batch.
    Set {
        case: PathBuf,

        #[arg(required = true, value_name = "PATH=VALUE")]
        assignments: Vec<String>,

        /// Field name used in validation messages.
        #[arg(long)]
        label: Option<String>,
    },

    /// Write solver dictionaries for every region.
    Generate {
        case: PathBuf,

        /// Case directory to generate into.
        #[arg(long)]
        out: PathBuf,

        /// Directory holding referenced CSV files (default: next to the case file).
        #[arg(long)]
        resources: Option<PathBuf>,

        /// Generation configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show version, digest, regions and the solver a case selects.
    Info { case: PathBuf },
}
