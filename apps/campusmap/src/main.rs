//! # campusmap
//!
//! The main binary for the campus spatial graph.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) for map editors
//! - CLI interface for validation, routing and snapping
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            apps/campusmap (THE BINARY)          │
//! │                                                 │
//! │  ┌─────────────┐    ┌─────────────┐             │
//! │  │   CLI       │    │   HTTP API  │             │
//! │  │  (clap)     │    │   (axum)    │             │
//! │  └──────┬──────┘    └──────┬──────┘             │
//! │         └────────┬─────────┘                    │
//! │                  ▼                              │
//! │         ┌─────────────────┐   campus.json       │
//! │         │ campusmap-core  │ ◄──────────────     │
//! │         │  (THE ENGINE)   │   campusmap.toml    │
//! │         └─────────────────┘                     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! campusmap server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! campusmap validate -D campus.json
//! campusmap route --from lobby --to lab --width 0.9 --avoid-steps
//! campusmap snap -x 12.5 -y 3 --floor eng-0
//! ```

use campusmap::cli;
use campusmap::config::{Config, LogFormat};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // The config decides the log format, so tracing starts after it loads.
    let loaded = Config::load(&cli.config).map(Config::with_env_overrides);
    let log_format = match &loaded {
        Ok(config) => config.log.format,
        Err(_) => Config::default().with_env_overrides().log.format,
    };
    init_tracing(log_format, cli.verbose);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(format: LogFormat, verbose: bool) {
    let default_filter = if verbose {
        "campusmap=debug,tower_http=debug"
    } else {
        "campusmap=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   ___ __ _ _ __ ___  _ __  _   _ ___ _ __ ___   __ _ _ __
  / __/ _` | '_ ` _ \| '_ \| | | / __| '_ ` _ \ / _` | '_ \
 | (_| (_| | | | | | | |_) | |_| \__ \ | | | | | (_| | |_) |
  \___\__,_|_| |_| |_| .__/ \__,_|___/_| |_| |_|\__,_| .__/
                     |_|                             |_|

  Campus spatial graph v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
