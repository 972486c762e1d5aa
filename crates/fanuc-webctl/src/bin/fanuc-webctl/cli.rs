use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "fanuc-webctl",
    version,
    about = "Read and write state of a Fanuc robot controller over its web server"
)]
pub struct Cli {
    /// Assume the helper templates are already present on the controller.
    #[arg(long, global = true)]
    pub no_upload: bool,
    /// Session configuration file (TOML).
    #[arg(long, global = true, env = "FANUC_WEBCTL_CONFIG")]
    pub config: Option<PathBuf>,
    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the value of a scalar variable.
    Get {
        host: String,
        /// Variable name, e.g. `$MCR.$GENOVERRIDE` or `$NUMREG[1]`.
        variable: String,
    },
    /// Read an I/O port.
    Read {
        host: String,
        port_type: String,
        index: u32,
        /// Exit with 1 when the port is ON and 0 when it is OFF.
        #[arg(long)]
        status: bool,
    },
    /// Write an I/O port.
    Write {
        host: String,
        port_type: String,
        index: u32,
        #[arg(allow_hyphen_values = true)]
        value: i64,
        /// Wait for the controller's answer and exit 1 if the write did not take.
        #[arg(long)]
        check: bool,
    },
    /// Clear active faults.
    Reset {
        host: String,
        /// Exit with 1 when the controller is still faulted afterwards.
        #[arg(long)]
        verify: bool,
    },
    /// Print a summary of controller, robot and program state.
    Info { host: String },
}

impl Command {
    pub fn host(&self) -> &str {
        match self {
            Self::Get { host, .. }
            | Self::Read { host, .. }
            | Self::Write { host, .. }
            | Self::Reset { host, .. }
            | Self::Info { host } => host,
        }
    }

    /// Commands that never read through the helper templates.
    pub fn needs_helpers(&self) -> bool {
        !matches!(self, Self::Reset { verify: false, .. })
    }
}
