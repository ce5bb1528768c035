//! Clap derive structures for the `kwlbridge` daemon.

use std::path::PathBuf;

use clap::Parser;

/// kwlbridge -- bridge a Helios easyControls ventilation unit into a
/// path-keyed state store over its HTTP+XML polling interface.
#[derive(Debug, Parser)]
#[command(
    name = "kwlbridge",
    version,
    about = "Bridge daemon for Helios easyControls ventilation units",
    long_about = "Authenticates against the device's embedded web server, \
        polls its XML value pages into typed state entries, and relays \
        state write requests back as device commands."
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Device address (IP or hostname; overrides config file)
    #[arg(long, env = "KWL_HOST")]
    pub host: Option<String>,

    /// Device password
    #[arg(long, env = "KWL_PASSWORD", hide_env = true)]
    pub password: Option<String>,

    /// Recurring poll interval in seconds (floor-clamped to 1)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Page identifiers for the recurring poll (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub pages: Option<Vec<u8>>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
