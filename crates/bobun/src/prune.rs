//! Removal of outputs that no declared entry accounts for.
//!
//! Bun writes a JavaScript file next to every declaration target and keeps
//! anything left over from earlier runs. After a build, every file under the
//! output directory that is not a declared entry is deleted, then any
//! directory left empty.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::build_config::OUT_DIR;
use crate::entry::{EntryPoint, normalize};
use crate::error::Result;

/// Delete stale files under `<cwd>/dist`.
///
/// Returns the removed files as normalized `dist/...` paths. A missing
/// output directory is not an error.
pub fn prune_stale_outputs(cwd: &Path, entries: &[EntryPoint]) -> Result<Vec<String>> {
    let out_dir = cwd.join(OUT_DIR);
    if !out_dir.is_dir() {
        return Ok(Vec::new());
    }

    let keep: HashSet<&str> = entries.iter().map(EntryPoint::as_str).collect();

    // Children come before their parent so directories are checked for
    // emptiness after their files are gone.
    let walked = WalkDir::new(&out_dir)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(std::io::Error::from)?;

    let mut removed = Vec::new();
    for entry in walked {
        let path = entry.path();

        if entry.file_type().is_dir() {
            if fs::read_dir(path)?.next().is_none() {
                debug!("Removing empty directory {}", path.display());
                fs::remove_dir(path)?;
            }
            continue;
        }

        let Some(relative) = relative_target(cwd, path) else {
            continue;
        };

        if !keep.contains(relative.as_str()) {
            debug!("Removing stale output {}", relative);
            fs::remove_file(path)?;
            removed.push(relative);
        }
    }

    Ok(removed)
}

/// `<cwd>/dist/a/b.js` as `dist/a/b.js`.
fn relative_target(cwd: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(cwd).ok()?;
    normalize(&relative.to_string_lossy())
}
