//! CLI argument parsing with clap.

use clap::Parser;

/// RenoVision backend - restyles interior photos through Stability AI.
///
/// `STABILITY_API_KEY`, `ENVIRONMENT` and `PORT` are read from the
/// environment; flags given here take precedence.
#[derive(Parser, Debug)]
#[command(name = "renovision", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Interface to bind (default 0.0.0.0).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (default $PORT or 8000).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "renovision=debug,tower_http=debug"
        } else {
            "renovision=info,tower_http=info"
        }
    }
}
