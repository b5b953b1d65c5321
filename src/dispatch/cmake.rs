//! CMake configuration and execution
//!
//! Only a top-level `CMakeLists.txt` (one that declares a `project(...)`) is
//! built; a list file pulled in by `add_subdirectory`/`include` is passed over
//! so the search moves on to the parent directory.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::HandlerContext;
use crate::exec::Invocation;

/// Generator used for every configure
const GENERATOR: &str = "Ninja";

const BUILD_TYPE: &str = "RelWithDebInfo";

const C_COMPILER: &str = "clang";
const CXX_COMPILER: &str = "clang++";
const COMPILER_LAUNCHER: &str = "ccache";

const CFLAGS: &[&str] = &[
    "-ffunction-sections",
    "-fdata-sections",
    "-ffile-compilation-dir=.",
    "-march=native",
    "-Wall",
    "-Wextra",
    "-pedantic",
    "-Werror",
    "-Wglobal-constructors",
    "-Wexit-time-destructors",
];

const CFLAGS_DEBUG: &[&str] = &["-g", "-fsanitize=address"];

const CXXFLAGS: &[&str] = &["-fno-rtti"];

const LDFLAGS: &[&str] = &["-Wl,--gc-sections", "-Wl,--icf=all", "-Wl,--fatal-warnings"];

/// Whether a list file declares a project
pub fn is_project_root(cmake_file: &Path) -> Result<bool> {
    static PROJECT: OnceLock<Regex> = OnceLock::new();
    let pattern = PROJECT.get_or_init(|| Regex::new(r"^\W*project\W*\(").unwrap());

    let content = std::fs::read_to_string(cmake_file)
        .with_context(|| format!("Failed to read {}", cmake_file.display()))?;
    Ok(content.lines().any(|line| pattern.is_match(line)))
}

/// Directory layout of a CMake project: sources, build tree and install tree
#[derive(Debug, Clone)]
pub struct CMakeProject {
    /// Directory holding the top-level CMakeLists.txt
    source_dir: PathBuf,
    build_dir: PathBuf,
    install_prefix: PathBuf,
}

impl CMakeProject {
    /// Build into `<source>/build`, install into `<source>/out`
    pub fn new(source_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            build_dir: source_dir.join("build"),
            install_prefix: source_dir.join("out"),
        }
    }

    /// Arguments of the configure step
    pub fn configure_args(&self) -> Vec<String> {
        let cflags = CFLAGS.join(" ");
        let cxxflags = CFLAGS
            .iter()
            .chain(CXXFLAGS)
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let debug_flags = CFLAGS_DEBUG.join(" ");
        let ldflags = LDFLAGS.join(" ");

        let mut args: Vec<String> = [
            "cmake",
            "--fresh",
            "-G",
            GENERATOR,
            "-Wdev",
            "-Werror=dev",
            "-Wdeprecated",
            "-Werror=deprecated",
            "-S",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(path_arg(&self.source_dir));
        args.push("-B".to_string());
        args.push(path_arg(&self.build_dir));

        let variables = [
            ("CMAKE_EXPORT_COMPILE_COMMANDS", "ON".to_string()),
            ("CMAKE_INSTALL_PREFIX", path_arg(&self.install_prefix)),
            ("CMAKE_INSTALL_RPATH", "$ORIGIN/../lib".to_string()),
            ("CMAKE_INSTALL_LIBDIR", "lib".to_string()),
            ("BUILD_SHARED_LIBS", "ON".to_string()),
            ("CMAKE_POSITION_INDEPENDENT_CODE", "ON".to_string()),
            ("CMAKE_BUILD_TYPE", BUILD_TYPE.to_string()),
            ("CMAKE_C_COMPILER", C_COMPILER.to_string()),
            ("CMAKE_C_FLAGS", cflags),
            ("CMAKE_C_COMPILER_LAUNCHER", COMPILER_LAUNCHER.to_string()),
            ("CMAKE_C_FLAGS_DEBUG", debug_flags.clone()),
            ("CMAKE_CXX_COMPILER", CXX_COMPILER.to_string()),
            ("CMAKE_CXX_FLAGS", cxxflags),
            ("CMAKE_CXX_COMPILER_LAUNCHER", COMPILER_LAUNCHER.to_string()),
            ("CMAKE_CXX_FLAGS_DEBUG", debug_flags),
            ("CMAKE_SHARED_LINKER_FLAGS", ldflags.clone()),
            ("CMAKE_EXE_LINKER_FLAGS", ldflags),
        ];
        args.extend(
            variables
                .into_iter()
                .map(|(name, value)| format!("-D{}={}", name, value)),
        );
        args
    }

    /// Arguments of the build step
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "cmake".to_string(),
            "--build".to_string(),
            path_arg(&self.build_dir),
        ]
    }

    /// Arguments of the install step
    pub fn install_args(&self) -> Vec<String> {
        vec![
            "cmake".to_string(),
            "--install".to_string(),
            path_arg(&self.build_dir),
        ]
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Configure and build the project rooted at the marker's directory
pub fn attempt(
    ctx: &HandlerContext<'_>,
    _sources: &[PathBuf],
    dir: &Path,
    marker: &Path,
) -> Result<bool> {
    if !is_project_root(marker)? {
        return Ok(false);
    }

    let project = CMakeProject::new(marker.parent().unwrap_or(dir));
    let prefix = &ctx.settings.launcher_prefix;

    ctx.runner
        .run(&Invocation::new(project.configure_args()).throttled(prefix))?;
    ctx.runner
        .run(&Invocation::new(project.build_args()).throttled(prefix))?;
    if ctx.options.install {
        ctx.runner
            .run(&Invocation::new(project.install_args()).throttled(prefix))?;
    }

    Ok(true)
}
