//! CLI argument definitions for dockwatch-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// dockwatch Docker event daemon.
///
/// Subscribes to container start/die events, reconnecting with exponential
/// backoff whenever the Docker event stream drops.
#[derive(Parser, Debug)]
#[command(name = "dockwatch-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to dockwatch.toml configuration file.
    ///
    /// Built-in defaults are used when the file does not exist.
    #[arg(short, long, default_value = "/etc/dockwatch/dockwatch.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,

    /// Print the address a container can be reached at, then exit.
    #[arg(long, value_name = "CONTAINER")]
    pub resolve: Option<String>,
}

impl DaemonCli {
    /// Applies the `--log-level`/`--log-format` overrides to a loaded config.
    pub fn apply_overrides(&self, general: &mut dockwatch_core::GeneralConfig) {
        if let Some(level) = &self.log_level {
            general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            general.log_format.clone_from(format);
        }
    }
}
