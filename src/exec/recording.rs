//! Runner that records invocations instead of spawning them

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::Result;

use super::invocation::Invocation;
use super::launcher::Runner;
use crate::error::BuildError;

#[derive(Debug, Default)]
pub struct RecordingRunner {
    /// Canned stdout for queries, keyed by the command line
    answers: HashMap<String, String>,
    /// Tool whose runs fail with the given exit code
    failure: Option<(String, i32)>,
    runs: RefCell<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn answer(mut self, line: &str, stdout: &str) -> Self {
        self.answers.insert(line.to_string(), stdout.to_string());
        self
    }

    pub fn failing(mut self, tool: &str, code: i32) -> Self {
        self.failure = Some((tool.to_string(), code));
        self
    }

    /// Everything passed to `run`, in order
    pub fn runs(&self) -> Vec<Invocation> {
        self.runs.borrow().clone()
    }
}

impl Runner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.runs.borrow_mut().push(invocation.clone());
        match &self.failure {
            Some((tool, code)) if tool == invocation.tool() => Err(BuildError::SubprocessFailed {
                command: invocation.display_line(),
                code: Some(*code),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn query(&self, invocation: &Invocation) -> Option<String> {
        let line = shell_words::join(invocation.full_argv());
        self.answers.get(&line).cloned()
    }
}
