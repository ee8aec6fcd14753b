//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// Some records or donors failed
    pub const PARTIAL: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const CONNECTION: i32 = 4;
    pub const FATAL: i32 = 5;
    /// Stopped by SIGINT/SIGTERM before every batch was dispatched
    pub const INTERRUPTED: i32 = 130;
}

/// donorvault - donor personal data lifecycle
#[derive(Parser, Debug)]
#[command(name = "donorvault")]
#[command(version, about, long_about = None)]
#[command(author = "Redirectioneaza Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "donorvault.toml", env = "DONORVAULT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DONORVAULT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite legacy encrypted addresses in the canonical format
    RepairAddresses(commands::repair::RepairArgs),

    /// Remove the personal data of specific donors
    RemovePersonalData(commands::remove::RemoveArgs),

    /// Remove the personal data of donors past the retention period
    RemoveOldDonations(commands::retention::RetentionArgs),

    /// Re-encrypt data sealed under previous keys with the primary key
    RotateKey(commands::rotate::RotateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
