//! Path utilities: ancestor walk and lexical normalization

use std::path::{Component, Path, PathBuf};

/// Iterator over a directory and each of its parents up to the filesystem root
#[derive(Debug)]
pub struct Ancestors {
    next: Option<PathBuf>,
}

impl Iterator for Ancestors {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let current = self.next.take()?;
        self.next = current.parent().map(Path::to_path_buf);
        Some(current)
    }
}

/// Walk upward from `start`, yielding `start` first and the root last
pub fn ancestors(start: &Path) -> Ancestors {
    Ancestors {
        next: Some(start.to_path_buf()),
    }
}

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// the preceding component. Symlinks are not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root; a leading `..` on a
                // relative path is kept.
                match out.components().next_back() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => out.push(".."),
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve `path` against `base` when relative, then normalize
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}
