//! kallbazdb CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, prints failures as a JSON
//! error object and exits non-zero.

use kallbazdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::write_error(e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
