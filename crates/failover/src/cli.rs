use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Keep exactly one Pi-hole in a Primary/Secondary/Tertiary pool serving DHCP.
///
/// Appliances are configured through environment variables
/// (PRIMARY_PIHOLE_IP, PRIMARY_PIHOLE_TOKEN, SECONDARY_..., optional
/// TERTIARY_...) or a TOML file with the same keys in lowercase.
#[derive(Parser, Debug)]
#[command(name = "dhcp-failover", version, about, long_about)]
pub struct Cli {
    /// TOML config file (keys match the environment variable names, lowercased)
    #[arg(short, long, env = "DHCP_FAILOVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run a single check cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Log the enable/disable calls that would be made without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
