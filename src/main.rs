//! `acro`: render acronym references in Pandoc-style documents.

use std::process::ExitCode;

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    match Cli::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            use cli::Colorize;

            // Fatal: the whole conversion is abandoned.
            eprintln!("{}", format!("error: {e:#}").error());
            ExitCode::FAILURE
        }
    }
}
