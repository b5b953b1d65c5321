//! Subprocess execution
//!
//! Every command is echoed before it runs. Children inherit stdio and the
//! parent's environment plus the invocation's overrides; the parent blocks
//! until they exit.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};

use super::invocation::Invocation;
use crate::error::BuildError;
use crate::utils::terminal;

/// Executes invocations on behalf of the dispatcher
pub trait Runner {
    /// Run a command to completion; a non-zero exit is an error
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Run a command and return its stdout without trailing whitespace.
    /// Any failure, including a missing executable, yields `None`.
    fn query(&self, invocation: &Invocation) -> Option<String>;
}

/// Runner backed by real processes
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    /// Echo commands without spawning them
    dry_run: bool,
    /// Also echo queries
    verbose: bool,
}

impl Launcher {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }

    /// Make sure the launched programs exist before spawning, so a missing
    /// tool gets a hint instead of a bare OS error
    fn check_tools(invocation: &Invocation) -> Result<()> {
        let cwd = invocation.cwd().unwrap_or_else(|| Path::new("."));
        let path = std::env::var_os("PATH");
        let mut programs = vec![invocation.tool()];
        if let Some(first) = invocation.prefix().first() {
            programs.push(first.as_str());
        }
        for program in programs {
            if which::which_in(program, path.clone(), cwd).is_err() {
                return Err(BuildError::missing_tool(program).into());
            }
        }
        Ok(())
    }
}

impl Runner for Launcher {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        if invocation.tool().is_empty() {
            bail!("Refusing to run an empty command");
        }

        let line = invocation.display_line();
        terminal::print_command(&line);
        if self.dry_run {
            return Ok(());
        }

        Self::check_tools(invocation)?;

        let status = invocation
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute {}", invocation.tool()))?;

        if !status.success() {
            return Err(BuildError::SubprocessFailed {
                command: line,
                code: status.code(),
            }
            .into());
        }

        Ok(())
    }

    fn query(&self, invocation: &Invocation) -> Option<String> {
        if self.verbose {
            terminal::print_command(&invocation.display_line());
        }
        if invocation.tool().is_empty() {
            return None;
        }

        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}
