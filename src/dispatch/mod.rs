//! Build system detection and dispatch
//!
//! Starting at the working directory and moving up, each directory is probed
//! for the marker files below in order. The first marker whose handler
//! accepts the build ends the search:
//!
//! ```text
//! build/compile_commands.json  → compile the given sources directly
//! build/build.ninja            → ninja -C build <source>^…
//! build.ninja                  → ninja -C . <source>^…
//! build/Makefile               → make -C build
//! Makefile                     → make -C .
//! CMakeLists.txt               → cmake configure + build (top-level projects only)
//! ```
//!
//! A repository with `git config build.command` set skips all of this and
//! runs that command from its top-level directory.

pub mod cmake;
pub mod compdb;
pub mod make;
pub mod ninja;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Settings;
use crate::error::BuildError;
use crate::exec::git::{self, BuildOverride};
use crate::exec::{Invocation, Runner};
use crate::utils::paths::{absolutize, ancestors};
use crate::utils::terminal;

/// Build system behind a marker file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    CompileDatabase,
    Ninja,
    Make,
    CMake,
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::CompileDatabase => write!(f, "compile database"),
            Handler::Ninja => write!(f, "ninja"),
            Handler::Make => write!(f, "make"),
            Handler::CMake => write!(f, "cmake"),
        }
    }
}

impl Handler {
    /// Try to build `sources` with the build system rooted at `dir`.
    ///
    /// `Ok(false)` means this marker does not apply and the search goes on;
    /// errors abort the whole dispatch.
    pub fn attempt(
        self,
        ctx: &HandlerContext<'_>,
        sources: &[PathBuf],
        dir: &Path,
        marker: &Path,
    ) -> Result<bool> {
        match self {
            Handler::CompileDatabase => compdb::attempt(ctx, sources, dir, marker),
            Handler::Ninja => ninja::attempt(ctx, sources, dir, marker),
            Handler::Make => make::attempt(ctx, sources, dir, marker),
            Handler::CMake => cmake::attempt(ctx, sources, dir, marker),
        }
    }
}

/// A marker file, relative to a candidate directory, and its handler
#[derive(Debug, Clone, Copy)]
pub struct BuildDescriptor {
    pub marker: &'static str,
    pub handler: Handler,
}

/// Markers in priority order
pub const BUILD_DESCRIPTORS: &[BuildDescriptor] = &[
    BuildDescriptor {
        marker: "build/compile_commands.json",
        handler: Handler::CompileDatabase,
    },
    BuildDescriptor {
        marker: "build/build.ninja",
        handler: Handler::Ninja,
    },
    BuildDescriptor {
        marker: "build.ninja",
        handler: Handler::Ninja,
    },
    BuildDescriptor {
        marker: "build/Makefile",
        handler: Handler::Make,
    },
    BuildDescriptor {
        marker: "Makefile",
        handler: Handler::Make,
    },
    BuildDescriptor {
        marker: "CMakeLists.txt",
        handler: Handler::CMake,
    },
];

/// Switches that change what handlers do
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Run `cmake --install` after a CMake build
    pub install: bool,
    /// Report probes and unmatched sources
    pub verbose: bool,
}

/// What handlers get to work with
pub struct HandlerContext<'a> {
    pub runner: &'a dyn Runner,
    pub settings: &'a Settings,
    /// Directory relative paths are resolved against
    pub cwd: &'a Path,
    pub options: DispatchOptions,
}

/// How a dispatch finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The repository's configured build command ran
    Override { top_dir: PathBuf },
    /// A handler accepted the build
    Built {
        root: PathBuf,
        marker: PathBuf,
        handler: Handler,
    },
}

/// Finds the build system owning the working directory and runs it
pub struct BuildDispatcher<'a> {
    runner: &'a dyn Runner,
    settings: &'a Settings,
    cwd: PathBuf,
    options: DispatchOptions,
}

impl<'a> BuildDispatcher<'a> {
    pub fn new(
        runner: &'a dyn Runner,
        settings: &'a Settings,
        cwd: impl Into<PathBuf>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            runner,
            settings,
            cwd: cwd.into(),
            options,
        }
    }

    /// Build `sources` (possibly none) with whatever owns the working directory
    pub fn dispatch(&self, sources: &[PathBuf]) -> Result<Dispatched> {
        if let Some(build_override) = git::build_override(self.runner, &self.cwd) {
            return self.run_override(&build_override);
        }

        let sources: Vec<PathBuf> = sources
            .iter()
            .map(|source| absolutize(&self.cwd, source))
            .collect();
        let ctx = HandlerContext {
            runner: self.runner,
            settings: self.settings,
            cwd: &self.cwd,
            options: self.options,
        };

        for dir in ancestors(&self.cwd) {
            for descriptor in BUILD_DESCRIPTORS {
                let marker = dir.join(descriptor.marker);
                if !marker.exists() {
                    continue;
                }
                if self.options.verbose {
                    terminal::print_info(&format!(
                        "Found {} ({})",
                        marker.display(),
                        descriptor.handler
                    ));
                }
                if descriptor.handler.attempt(&ctx, &sources, &dir, &marker)? {
                    return Ok(Dispatched::Built {
                        root: dir,
                        marker,
                        handler: descriptor.handler,
                    });
                }
            }
        }

        Err(BuildError::NoBuildRoot {
            start: self.cwd.clone(),
        }
        .into())
    }

    fn run_override(&self, build_override: &BuildOverride) -> Result<Dispatched> {
        let words = shell_words::split(&build_override.command).map_err(|e| {
            BuildError::config_error_with_hint(
                format!("Cannot parse build.command `{}`", build_override.command),
                Some(e.into()),
                "Fix the quoting with: git config build.command '<command>'",
            )
        })?;
        if words.is_empty() {
            return Err(BuildError::config_error("build.command is set but empty").into());
        }

        if self.options.verbose {
            terminal::print_info("Using git config build.command");
        }
        self.runner
            .run(&Invocation::new(words).current_dir(&build_override.top_dir))?;
        Ok(Dispatched::Override {
            top_dir: build_override.top_dir.clone(),
        })
    }
}
