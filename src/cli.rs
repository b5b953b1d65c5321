//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::build::BuildCommand;
use crate::config::Settings;
use crate::utils::terminal;

/// t - build whatever owns the current directory
///
/// Walks up from the current directory to the nearest compile database,
/// Ninja file, Makefile or CMake project and runs it at low priority.
#[derive(Parser, Debug)]
#[command(name = "t")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Settings file (default: <config dir>/t/config.toml)
    #[arg(long, global = true, env = "T_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build sources, or the whole enclosing project
    Build(BuildCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        if self.no_color {
            terminal::disable_colors();
        }

        let settings = Settings::load(self.config.as_deref())?;
        if self.verbose {
            if let Some(source) = &settings.source {
                terminal::print_info(&format!("Using settings from {}", source.display()));
            }
        }

        match self.command {
            Commands::Build(cmd) => cmd.execute(&settings, self.verbose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_without_sources() {
        let cli = Cli::try_parse_from(["t", "build"]).unwrap();
        let Commands::Build(cmd) = cli.command;
        assert!(cmd.srcs.is_empty());
        assert!(!cmd.dry_run);
    }

    #[test]
    fn test_build_with_flags() {
        let cli =
            Cli::try_parse_from(["t", "-v", "build", "--dry-run", "--install", "a.c", "src/b.cc"])
                .unwrap();
        assert!(cli.verbose);
        let Commands::Build(cmd) = cli.command;
        assert!(cmd.dry_run);
        assert!(cmd.install);
        assert_eq!(cmd.srcs, [PathBuf::from("a.c"), PathBuf::from("src/b.cc")]);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["t"]).is_err());
    }
}
