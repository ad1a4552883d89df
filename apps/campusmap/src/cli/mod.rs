//! # campusmap CLI Module
//!
//! This module implements the CLI interface for campusmap.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show graph counts and validation summary
//! - `validate` - List every validation issue
//! - `route` - Find a constrained route between two nodes
//! - `snap` - Resolve a cursor position
//! - `convert` - Write the document in another format
//! - `init` - Create an empty document
//! - `hash` - Compute BLAKE3 hash of the graph snapshot

mod commands;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use campusmap_core::{CampusError, Format, Optimize};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// campusmap - campus spatial graph tool
///
/// Edits, validates and queries the walkable graph of a multi-building campus.
#[derive(Parser, Debug)]
#[command(name = "campusmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the campus document (JSON or binary snapshot)
    #[arg(short = 'D', long, global = true, default_value = "campus.json")]
    pub document: PathBuf,

    /// Path to the configuration file
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Route cost metric.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizeArg {
    Distance,
    Time,
}

impl From<OptimizeArg> for Optimize {
    fn from(arg: OptimizeArg) -> Self {
        match arg {
            OptimizeArg::Distance => Optimize::Distance,
            OptimizeArg::Time => Optimize::Time,
        }
    }
}

/// Output encoding for `convert`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Binary,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Binary => Format::Binary,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the configuration file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the configuration file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show graph status
    Status,

    /// Validate the graph and list every issue
    Validate,

    /// Find a route between two nodes
    Route {
        /// Start node id
        #[arg(short, long)]
        from: String,

        /// End node id
        #[arg(short, long)]
        to: String,

        /// Cost to minimize
        #[arg(short, long, value_enum, default_value_t = OptimizeArg::Distance)]
        optimize: OptimizeArg,

        /// Required clear width
        #[arg(long)]
        width: Option<f64>,

        /// Required clear height
        #[arg(long)]
        height: Option<f64>,

        /// Required load capacity
        #[arg(long)]
        weight: Option<f64>,

        /// Capability tag held by the traveller (repeatable)
        #[arg(short, long = "grant")]
        grant: Vec<String>,

        /// Avoid edges with steps
        #[arg(long)]
        avoid_steps: bool,

        /// Avoid outdoor edges
        #[arg(long)]
        avoid_outdoor: bool,

        /// Walking speed in metres per second (overrides the configuration file)
        #[arg(long)]
        walking_speed: Option<f64>,
    },

    /// Snap a cursor position to nearby geometry
    Snap {
        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,

        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,

        /// Only consider geometry on this floor
        #[arg(short, long)]
        floor: Option<String>,

        /// Previous point x, for orthogonal snapping
        #[arg(long, requires = "prev_y", allow_hyphen_values = true)]
        prev_x: Option<f64>,

        /// Previous point y, for orthogonal snapping
        #[arg(long, requires = "prev_x", allow_hyphen_values = true)]
        prev_y: Option<f64>,

        /// Enable grid snapping with this cell size
        #[arg(long)]
        grid: Option<f64>,
    },

    /// Write the document in another format
    Convert {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short = 't', long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },

    /// Initialize a new empty document
    Init {
        /// Force initialization even if the document exists
        #[arg(short, long)]
        force: bool,
    },

    /// Compute BLAKE3 hash of the graph snapshot
    Hash,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and loaded configuration.
pub async fn execute(cli: Cli, config: Config) -> Result<(), CampusError> {
    let doc = cli.document.as_path();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(doc, config, host, port).await,
        Some(Commands::Status) => cmd_status(doc, json_mode),
        Some(Commands::Validate) => cmd_validate(doc, json_mode),
        Some(Commands::Route {
            from,
            to,
            optimize,
            width,
            height,
            weight,
            grant,
            avoid_steps,
            avoid_outdoor,
            walking_speed,
        }) => {
            let constraints = campusmap_core::UserConstraints {
                width,
                height,
                weight,
                granted: grant.into_iter().collect(),
                avoid_steps,
                avoid_outdoor,
                ..campusmap_core::UserConstraints::default()
            };
            let mut request = campusmap_core::RouteRequest::new(from, to)
                .with_constraints(constraints)
                .optimize(optimize.into());
            request.walking_speed = Some(walking_speed.unwrap_or(config.routing.walking_speed));
            cmd_route(doc, json_mode, &request)
        }
        Some(Commands::Snap {
            x,
            y,
            floor,
            prev_x,
            prev_y,
            grid,
        }) => {
            let mut snap = config.snap;
            if let Some(size) = grid {
                snap.grid_enabled = true;
                snap.grid_size = size;
            }
            let previous = prev_x.zip(prev_y);
            cmd_snap(doc, json_mode, (x, y), floor, previous, &snap)
        }
        Some(Commands::Convert { output, format }) => cmd_convert(doc, &output, format.into()),
        Some(Commands::Init { force }) => cmd_init(doc, force),
        Some(Commands::Hash) => cmd_hash(doc, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(doc, json_mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_route_constraints() {
        let cli = Cli::parse_from([
            "campusmap",
            "route",
            "--from",
            "lobby",
            "--to",
            "lab",
            "--width",
            "0.9",
            "--grant",
            "staff",
            "--grant",
            "lab",
            "--avoid-steps",
            "--optimize",
            "time",
        ]);
        let Some(Commands::Route {
            from,
            width,
            grant,
            avoid_steps,
            optimize,
            ..
        }) = cli.command
        else {
            unreachable!("route subcommand");
        };
        assert_eq!(from, "lobby");
        assert_eq!(width, Some(0.9));
        assert_eq!(grant, vec!["staff", "lab"]);
        assert!(avoid_steps);
        assert_eq!(optimize, OptimizeArg::Time);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["campusmap", "status", "--json-mode", "-D", "site.cmap"]);
        assert!(cli.json_mode);
        assert_eq!(cli.document, PathBuf::from("site.cmap"));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn snap_previous_needs_both_coordinates() {
        let result = Cli::try_parse_from(["campusmap", "snap", "-x", "1", "-y", "2", "--prev-x", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn snap_accepts_negative_coordinates() {
        let cli = Cli::parse_from(["campusmap", "snap", "-x", "-4.5", "-y", "2"]);
        assert!(matches!(cli.command, Some(Commands::Snap { x, .. }) if x == -4.5));
    }
}
