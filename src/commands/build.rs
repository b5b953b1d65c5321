//! Build command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Settings;
use crate::dispatch::{BuildDispatcher, DispatchOptions, Dispatched};
use crate::exec::Launcher;
use crate::utils::terminal;

/// Build sources with the build system that owns the current directory
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Source files to build; with none, the whole project is built
    pub srcs: Vec<PathBuf>,

    /// Print the commands without running them
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Also run `cmake --install` when building a CMake project
    #[arg(long)]
    pub install: bool,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(self, settings: &Settings, verbose: bool) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let launcher = Launcher::new(self.dry_run, verbose);
        let options = DispatchOptions {
            install: self.install,
            verbose,
        };

        let outcome = BuildDispatcher::new(&launcher, settings, cwd, options).dispatch(&self.srcs)?;

        if verbose {
            match outcome {
                Dispatched::Override { top_dir } => terminal::print_info(&format!(
                    "Built with build.command in {}",
                    top_dir.display()
                )),
                Dispatched::Built {
                    root,
                    marker,
                    handler,
                } => terminal::print_info(&format!(
                    "Built {} with {} ({})",
                    root.display(),
                    handler,
                    marker.display()
                )),
            }
        }
        Ok(())
    }
}
