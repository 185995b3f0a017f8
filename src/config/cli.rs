//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(name = "halow-link-manager", version, author)]
#[clap(about = "HaLow (802.11ah) station link manager with a Unix socket command surface")]
pub struct CliArgs {
    /// Regulatory domain (two-letter country code, case-sensitive)
    #[clap(short, long, default_value = "US")]
    pub country: String,

    /// File holding the saved network credential
    #[clap(long, default_value = "/var/lib/halow/credentials.json")]
    pub store_path: PathBuf,

    /// Auto-connect attempts on start
    #[clap(long, default_value = "3")]
    pub auto_connect_attempts: u32,

    /// Time each auto-connect attempt may take, in milliseconds
    #[clap(long, default_value = "5000")]
    pub auto_connect_timeout_ms: u64,

    /// Pause between auto-connect attempts, in milliseconds
    #[clap(long, default_value = "2000")]
    pub auto_connect_delay_ms: u64,

    /// Do not reconnect to the saved network on start
    #[clap(long)]
    pub no_auto_connect: bool,

    /// Enable Unix socket transport
    #[clap(long)]
    pub enable_unix_socket: bool,

    /// Path for Unix socket
    #[clap(long, default_value = "/run/halow-link-manager.sock")]
    pub socket_path: String,

    /// Socket file permissions (octal, e.g., 660)
    #[clap(long, default_value = "660")]
    pub socket_mode: String,

    /// JSON file listing the access points of the simulated radio
    #[clap(long)]
    pub sim_networks: Option<PathBuf>,
}
