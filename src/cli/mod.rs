//! CLI module for kallbazdb
//!
//! Provides command-line interface for:
//! - init: Write a default config and create the log file
//! - get / put / delete: One-shot store operations
//! - scan: Frame-by-frame listing of the append log

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{delete, get, init, put, run, run_command, scan};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
