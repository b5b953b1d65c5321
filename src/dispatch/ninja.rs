//! Ninja handler

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::HandlerContext;
use crate::exec::Invocation;

/// Environment variable controlling Ninja's progress line
pub const NINJA_STATUS: &str = "NINJA_STATUS";

/// Ninja target that builds the outputs of `source` (`foo.c^`)
pub fn target_for(source: &Path) -> String {
    format!("{}^", source.to_string_lossy())
}

/// Run `ninja -C <marker dir>` for the given sources, or the default targets
/// when there are none. A failing build surfaces as an error from the runner.
pub fn attempt(
    ctx: &HandlerContext<'_>,
    sources: &[PathBuf],
    dir: &Path,
    marker: &Path,
) -> Result<bool> {
    let build_dir = marker.parent().unwrap_or(dir);

    let mut argv = vec![
        "ninja".to_string(),
        "-C".to_string(),
        build_dir.to_string_lossy().into_owned(),
    ];
    argv.extend(sources.iter().map(|source| target_for(source)));

    ctx.runner.run(
        &Invocation::new(argv)
            .throttled(&ctx.settings.launcher_prefix)
            .env(NINJA_STATUS, ctx.settings.ninja_status.as_str()),
    )?;
    Ok(true)
}
