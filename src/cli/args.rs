//! CLI argument definitions using clap
//!
//! Commands:
//! - kallbazdb init --config <path> [--data-dir <dir>]
//! - kallbazdb get <key> --config <path>
//! - kallbazdb put <key> <value> --config <path>
//! - kallbazdb delete <key> --config <path>
//! - kallbazdb scan --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kallbazdb - A minimal append-only log key-value store
#[derive(Parser, Debug)]
#[command(name = "kallbazdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config (if missing) and create the log file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./kallbazdb.json")]
        config: PathBuf,

        /// Data directory written into a new config
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Print the value stored under a key
    Get {
        key: String,

        /// Path to configuration file
        #[arg(long, default_value = "./kallbazdb.json")]
        config: PathBuf,
    },

    /// Store a UTF-8 value under a key
    Put {
        key: String,
        value: String,

        /// Path to configuration file
        #[arg(long, default_value = "./kallbazdb.json")]
        config: PathBuf,
    },

    /// Delete a key
    Delete {
        key: String,

        /// Path to configuration file
        #[arg(long, default_value = "./kallbazdb.json")]
        config: PathBuf,
    },

    /// List every frame in the log
    Scan {
        /// Path to configuration file
        #[arg(long, default_value = "./kallbazdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
