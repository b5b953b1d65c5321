//! A single subprocess request

use std::path::{Path, PathBuf};
use std::process::Command;

/// Command line plus the context it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Launcher words placed before `argv` (empty when not throttled)
    prefix: Vec<String>,
    argv: Vec<String>,
    cwd: Option<PathBuf>,
    /// Overrides on top of the inherited environment
    env: Vec<(String, String)>,
}

impl Invocation {
    /// Create an invocation of `argv`; the first word is the tool
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: Vec::new(),
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Run behind the given launcher prefix
    pub fn throttled(mut self, prefix: &[String]) -> Self {
        self.prefix = prefix.to_vec();
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Override one environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The tool being launched, ignoring the prefix
    pub fn tool(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments after the tool
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.env
    }

    /// Prefix followed by the command
    pub fn full_argv(&self) -> Vec<String> {
        self.prefix.iter().chain(&self.argv).cloned().collect()
    }

    /// The command as it would be typed, e.g.
    /// `env -C /repo/build NINJA_STATUS='[%u/%r/%f] ' -- nice -n19 -- ninja`
    pub fn display_line(&self) -> String {
        let mut words: Vec<String> = Vec::new();
        if self.cwd.is_some() || !self.env.is_empty() {
            words.push("env".to_string());
            if let Some(cwd) = &self.cwd {
                words.push("-C".to_string());
                words.push(cwd.display().to_string());
            }
            for (key, value) in &self.env {
                words.push(format!("{}={}", key, value));
            }
            words.push("--".to_string());
        }
        words.extend(self.full_argv());
        shell_words::join(words)
    }

    /// Build the `std::process::Command` for this invocation
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = match self.prefix.split_first() {
            Some((launcher, rest)) => {
                let mut cmd = Command::new(launcher);
                cmd.args(rest).arg(self.tool());
                cmd
            }
            None => Command::new(self.tool()),
        };
        cmd.args(self.args());
        if let Some(cwd) = self.cwd() {
            cmd.current_dir(cwd);
        }
        cmd.envs(self.envs().iter().map(|(k, v)| (k, v)));
        cmd
    }
}
