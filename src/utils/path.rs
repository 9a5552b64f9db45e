//! ## path
//!
//! path utilities

use std::path::{Component, Path, PathBuf};

/// Absolutize `target` using `wrkdir` as base.
/// `.` and `..` components are resolved lexically.
pub fn absolutize(wrkdir: &Path, target: &Path) -> PathBuf {
    let joined = match target.is_absolute() {
        true => target.to_path_buf(),
        false => wrkdir.join(target),
    };
    let mut resolved = PathBuf::from("/");
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => resolved.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    resolved
}
