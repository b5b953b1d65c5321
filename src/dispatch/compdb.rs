//! Compile database (`compile_commands.json`) handler
//!
//! Each requested source is compiled with exactly the command the database
//! records for it, in the directory the database records. The handler only
//! succeeds when every requested source had an entry.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use super::HandlerContext;
use crate::error::BuildError;
use crate::exec::Invocation;
use crate::utils::paths::absolutize;
use crate::utils::terminal;

/// One record of a compile database
#[derive(Debug, Clone, Deserialize)]
pub struct CompileDatabaseEntry {
    /// Working directory of the compile
    pub directory: PathBuf,
    /// Source file, relative to `directory` or absolute
    pub file: PathBuf,
    /// Pre-split command line
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    /// Shell-quoted command line, used when `arguments` is absent
    #[serde(default)]
    pub command: Option<String>,
}

impl CompileDatabaseEntry {
    /// Absolute working directory; a relative one is taken relative to `cwd`
    pub fn resolved_directory(&self, cwd: &Path) -> PathBuf {
        absolutize(cwd, &self.directory)
    }

    /// Absolute, normalized path of the source this entry compiles
    pub fn resolved_path(&self, cwd: &Path) -> PathBuf {
        absolutize(cwd, &self.directory.join(&self.file))
    }

    /// The compile command as argv
    pub fn command_line(&self, database: &Path) -> Result<Vec<String>> {
        let argv = match (&self.arguments, &self.command) {
            (Some(arguments), _) => arguments.clone(),
            (None, Some(command)) => shell_words::split(command).map_err(|e| {
                BuildError::malformed_database(
                    database,
                    format!("cannot split command for {}", self.file.display()),
                    Some(e.into()),
                )
            })?,
            (None, None) => {
                return Err(BuildError::malformed_database(
                    database,
                    format!("entry for {} has neither `arguments` nor `command`", self.file.display()),
                    None,
                )
                .into())
            }
        };

        if argv.is_empty() {
            return Err(BuildError::malformed_database(
                database,
                format!("entry for {} has an empty command", self.file.display()),
                None,
            )
            .into());
        }
        Ok(argv)
    }
}

/// Read and parse a compile database
pub fn load(path: &Path) -> Result<Vec<CompileDatabaseEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BuildError::malformed_database(path, "cannot read file", Some(e.into()))
    })?;
    let entries = serde_json::from_str(&content).map_err(|e| {
        BuildError::malformed_database(path, "invalid JSON", Some(e.into()))
    })?;
    Ok(entries)
}

pub fn attempt(
    ctx: &HandlerContext<'_>,
    sources: &[PathBuf],
    _dir: &Path,
    marker: &Path,
) -> Result<bool> {
    if sources.is_empty() {
        return Ok(false);
    }

    let mut pending: BTreeSet<&Path> = sources.iter().map(PathBuf::as_path).collect();

    for entry in load(marker)? {
        let path = entry.resolved_path(ctx.cwd);
        if !pending.remove(path.as_path()) {
            continue;
        }

        let argv = entry.command_line(marker)?;
        let directory = entry.resolved_directory(ctx.cwd);
        println!("t build: Entering directory `{}'", directory.display());
        ctx.runner.run(
            &Invocation::new(argv)
                .throttled(&ctx.settings.launcher_prefix)
                .current_dir(directory),
        )?;
    }

    if ctx.options.verbose {
        for source in &pending {
            terminal::print_warning(&format!(
                "{} has no entry in {}",
                source.display(),
                marker.display()
            ));
        }
    }

    Ok(pending.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::dispatch::DispatchOptions;
    use crate::exec::recording::RecordingRunner;
    use std::fs;
    use tempfile::TempDir;

    fn write_database(dir: &Path, value: serde_json::Value) -> PathBuf {
        let path = dir.join("compile_commands.json");
        fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    fn run_attempt(runner: &RecordingRunner, cwd: &Path, sources: &[PathBuf], marker: &Path) -> Result<bool> {
        let settings = Settings::default();
        let ctx = HandlerContext {
            runner,
            settings: &settings,
            cwd,
            options: DispatchOptions::default(),
        };
        attempt(&ctx, sources, cwd, marker)
    }

    #[test]
    fn test_resolved_path_normalizes() {
        let entry: CompileDatabaseEntry = serde_json::from_value(serde_json::json!({
            "directory": "/repo/build",
            "file": "../src/./main.c",
            "command": "cc -c ../src/main.c"
        }))
        .unwrap();
        assert_eq!(entry.resolved_path(Path::new("/")), PathBuf::from("/repo/src/main.c"));

        let absolute: CompileDatabaseEntry = serde_json::from_value(serde_json::json!({
            "directory": "/repo/build",
            "file": "/repo/src/main.c",
            "arguments": ["cc"]
        }))
        .unwrap();
        assert_eq!(absolute.resolved_path(Path::new("/")), PathBuf::from("/repo/src/main.c"));
    }

    #[test]
    fn test_relative_directory_uses_cwd() {
        let entry: CompileDatabaseEntry = serde_json::from_value(serde_json::json!({
            "directory": "build",
            "file": "../src/main.c",
            "arguments": ["cc"]
        }))
        .unwrap();
        let cwd = Path::new("/repo");
        assert_eq!(entry.resolved_directory(cwd), PathBuf::from("/repo/build"));
        assert_eq!(entry.resolved_path(cwd), PathBuf::from("/repo/src/main.c"));
    }

    #[test]
    fn test_arguments_preferred_over_command() {
        let entry: CompileDatabaseEntry = serde_json::from_value(serde_json::json!({
            "directory": "/repo",
            "file": "a.c",
            "arguments": ["clang", "-DX=\"a b\"", "-c", "a.c"],
            "command": "gcc -c a.c"
        }))
        .unwrap();
        let argv = entry.command_line(Path::new("db.json")).unwrap();
        assert_eq!(argv, ["clang", "-DX=\"a b\"", "-c", "a.c"]);
    }

    #[test]
    fn test_command_is_shell_split() {
        let entry: CompileDatabaseEntry = serde_json::from_value(serde_json::json!({
            "directory": "/repo",
            "file": "a.c",
            "command": "cc -DNAME='\"x y\"' -c a.c"
        }))
        .unwrap();
        let argv = entry.command_line(Path::new("db.json")).unwrap();
        assert_eq!(argv, ["cc", "-DNAME=\"x y\"", "-c", "a.c"]);
    }

    #[test]
    fn test_entry_without_command_is_malformed() {
        let entry: CompileDatabaseEntry = serde_json::from_value(serde_json::json!({
            "directory": "/repo",
            "file": "a.c"
        }))
        .unwrap();
        let err = entry.command_line(Path::new("db.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedCompileDatabase { .. })
        ));
    }

    #[test]
    fn test_no_sources_declines() {
        let temp_dir = TempDir::new().unwrap();
        let marker = write_database(temp_dir.path(), serde_json::json!([]));
        let runner = RecordingRunner::default();
        assert!(!run_attempt(&runner, temp_dir.path(), &[], &marker).unwrap());
        assert!(runner.runs().is_empty());
    }

    #[test]
    fn test_partial_match_is_failure() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let marker = write_database(
            root,
            serde_json::json!([
                { "directory": root, "file": "a.c", "arguments": ["cc", "-c", "a.c"] }
            ]),
        );
        let runner = RecordingRunner::default();
        let sources = vec![root.join("a.c"), root.join("b.c")];
        assert!(!run_attempt(&runner, root, &sources, &marker).unwrap());
        // the matched source was still compiled
        assert_eq!(runner.runs().len(), 1);
    }

    #[test]
    fn test_all_sources_matched() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let build = root.join("build");
        let marker = write_database(
            root,
            serde_json::json!([
                { "directory": build, "file": "../a.c", "command": "cc -c ../a.c" },
                { "directory": build, "file": "../a.c", "command": "cc -O0 -c ../a.c" },
                { "directory": build, "file": "../b.c", "arguments": ["cc", "-c", "../b.c"] }
            ]),
        );
        let runner = RecordingRunner::default();
        let sources = vec![root.join("b.c"), root.join("a.c")];
        assert!(run_attempt(&runner, root, &sources, &marker).unwrap());

        let runs = runner.runs();
        // database order, and the duplicate entry for a.c is not run again
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].args(), ["-c", "../a.c"]);
        assert_eq!(runs[1].args(), ["-c", "../b.c"]);
        assert!(runs.iter().all(|r| r.cwd() == Some(build.as_path())));
        assert!(runs.iter().all(|r| r.prefix().first().map(String::as_str) == Some("nice")));
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join("compile_commands.json");
        fs::write(&marker, "{ not json").unwrap();
        let runner = RecordingRunner::default();
        let err = run_attempt(&runner, temp_dir.path(), &[temp_dir.path().join("a.c")], &marker)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MalformedCompileDatabase { .. })
        ));
    }
}
