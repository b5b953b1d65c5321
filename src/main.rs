//! t - a build front-end
//!
//! Finds the build system that owns the current directory and runs it:
//!
//! ```text
//! t build [SRCS...] → git build.command | compile_commands.json | ninja | make | cmake
//! ```

mod cli;
mod commands;
mod config;
mod dispatch;
mod error;
mod exec;
mod utils;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use error::BuildError;
use utils::terminal;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<BuildError>() {
            Some(build_error) => {
                build_error.display_with_hints();
                ExitCode::from(build_error.exit_code())
            }
            None => {
                terminal::print_error(&format!("{:#}", err));
                ExitCode::FAILURE
            }
        },
    }
}
