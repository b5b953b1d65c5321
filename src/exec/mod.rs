//! Process execution: invocations, the launcher and git queries

pub mod git;
pub mod invocation;
pub mod launcher;
#[cfg(test)]
pub mod recording;

pub use invocation::Invocation;
pub use launcher::{Launcher, Runner};
