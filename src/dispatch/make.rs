//! Make handler

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::HandlerContext;
use crate::exec::Invocation;

/// Run `make -C <marker dir>` with its default goal. Sources are not passed
/// on; Make has no generic way to name the outputs of a source file.
pub fn attempt(
    ctx: &HandlerContext<'_>,
    _sources: &[PathBuf],
    dir: &Path,
    marker: &Path,
) -> Result<bool> {
    let build_dir = marker.parent().unwrap_or(dir);
    ctx.runner.run(
        &Invocation::new(["make".to_string(), "-C".to_string(), build_dir.to_string_lossy().into_owned()])
            .throttled(&ctx.settings.launcher_prefix),
    )?;
    Ok(true)
}
