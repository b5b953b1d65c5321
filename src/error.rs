//! Error types and helpers for user-friendly error messages
//!
//! Every fatal condition of a dispatch is one of these variants. They travel
//! inside `anyhow::Error` and are recovered in `main` to pick the process exit
//! code and print the hint.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal dispatch errors with hints
#[derive(Error, Debug)]
pub enum BuildError {
    /// No ancestor directory holds a marker whose handler accepted the build
    #[error("No build system found in {} or any parent directory", start.display())]
    NoBuildRoot { start: PathBuf },

    /// A launched tool exited unsuccessfully
    #[error("Command failed with {}: {command}", describe_code(*code))]
    SubprocessFailed {
        command: String,
        /// `None` when the child was terminated by a signal
        code: Option<i32>,
    },

    /// The executable of a command could not be found
    #[error("Missing tool: {tool}")]
    MissingTool { tool: String, hint: String },

    /// The compile database could not be used
    #[error("Malformed compile database {}: {message}", path.display())]
    MalformedCompileDatabase {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Settings or override command errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl BuildError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error, picking a hint for well-known tools
    pub fn missing_tool(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let hint = hints::for_tool(&tool).to_string();
        Self::MissingTool { tool, hint }
    }

    /// Create a malformed compile database error
    pub fn malformed_database(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::MalformedCompileDatabase {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Process exit code for this error
    ///
    /// A failed child passes its own code through; everything else is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::SubprocessFailed {
                code: Some(code), ..
            } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            BuildError::NoBuildRoot { .. } => Some(hints::no_build_root()),
            BuildError::SubprocessFailed { .. } => None,
            BuildError::MissingTool { hint, .. } => Some(hint.as_str()),
            BuildError::MalformedCompileDatabase { .. } => Some(hints::compile_database()),
            BuildError::Config { hint, .. } => hint.as_deref(),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            eprintln!("  {} {}", style("caused by:").dim(), err);
            cause = err.source();
        }

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Hint for a tool that is not on PATH
    pub fn for_tool(tool: &str) -> &'static str {
        match tool {
            "cmake" => cmake(),
            "ninja" => ninja(),
            "make" => make(),
            "nice" | "ionice" | "choom" => launcher(),
            _ => "Make sure the tool is installed and its directory is in your PATH.",
        }
    }

    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake"
    }

    /// Get hint for missing Ninja
    pub fn ninja() -> &'static str {
        "Install Ninja from https://ninja-build.org/ or use your package manager:\n\
         • macOS: brew install ninja\n\
         • Ubuntu: sudo apt install ninja-build"
    }

    /// Get hint for missing Make
    pub fn make() -> &'static str {
        "Install GNU Make with your package manager:\n\
         • macOS: xcode-select --install\n\
         • Ubuntu: sudo apt install make"
    }

    /// Get hint for missing niceness wrappers
    pub fn launcher() -> &'static str {
        "The launcher prefix needs nice, ionice and choom (util-linux).\n\
         Override it in the settings file:\n\
         \n\
         [launcher]\n\
         prefix = []"
    }

    /// Get hint when no marker was found
    pub fn no_build_root() -> &'static str {
        "Looked for build/compile_commands.json, build/build.ninja, build.ninja,\n\
         build/Makefile, Makefile and CMakeLists.txt (with a project() call).\n\
         \n\
         To always run a fixed command in this repository:\n\
         • Run: git config build.command '<command>'"
    }

    /// Get hint for compile database problems
    pub fn compile_database() -> &'static str {
        "compile_commands.json must be an array of objects with `directory`, `file`\n\
         and either `arguments` or `command`. Regenerate it with\n\
         -DCMAKE_EXPORT_COMPILE_COMMANDS=ON or `ninja -t compdb`."
    }
}
