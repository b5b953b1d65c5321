// Git queries for the repository build override
//
// A repository can pin its build with `git config build.command '<cmd>'`.
// Git failing for any reason (no repository, no such key, no git binary)
// just means there is no override.

use std::path::{Path, PathBuf};

use super::invocation::Invocation;
use super::launcher::Runner;
use crate::utils::paths::absolutize;

/// A configured build command and the repository it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOverride {
    /// Repository top-level directory
    pub top_dir: PathBuf,
    /// Raw `build.command` value, not yet split into words
    pub command: String,
}

fn git<'a>(cwd: &Path, args: impl IntoIterator<Item = &'a str>) -> Invocation {
    Invocation::new(std::iter::once("git").chain(args)).current_dir(cwd)
}

/// Top-level directory of the repository containing `cwd`
pub fn repository_top(runner: &dyn Runner, cwd: &Path) -> Option<PathBuf> {
    // `--show-cdup` prints the path up to the top, empty when already there
    let cdup = runner.query(&git(cwd, ["rev-parse", "--show-cdup"]))?;
    Some(absolutize(cwd, Path::new(&cdup)))
}

/// Value of `build.command` in the git config visible from `cwd`
pub fn configured_build_command(runner: &dyn Runner, cwd: &Path) -> Option<String> {
    runner.query(&git(cwd, ["config", "build.command"]))
}

/// The override, when both the repository and the command are known
pub fn build_override(runner: &dyn Runner, cwd: &Path) -> Option<BuildOverride> {
    let top_dir = repository_top(runner, cwd)?;
    let command = configured_build_command(runner, cwd)?;
    Some(BuildOverride { top_dir, command })
}
