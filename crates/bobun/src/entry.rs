//! Entry point inference from manifest fields.
//!
//! Every path a package publishes (`types`, `main`, `module`, `bin`,
//! `exports`) is a build target. Targets are normalized and deduplicated,
//! keeping the first occurrence in this order:
//!
//! 1. `types`
//! 2. `exports["."].types`
//! 3. `main`
//! 4. `module`
//! 5. every `bin` value, in declaration order
//! 6. `exports.import`, `exports.require`
//! 7. `exports["."].import`, `exports["."].require`
//!
//! Declarations are listed first so that a `.d.ts` target claims its source
//! file before the JavaScript target built from the same source.

use indexmap::IndexSet;
use path_clean::PathClean;
use std::fmt;
use std::path::Path;

use crate::manifest::PackageManifest;

/// A normalized, relative target path such as `dist/index.js`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryPoint(String);

impl EntryPoint {
    /// Normalize `path` into an entry point. Returns `None` for paths that
    /// collapse to nothing (`""`, `"."`, `"./"`).
    pub fn new(path: &str) -> Option<Self> {
        normalize(path).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for TypeScript declaration targets.
    pub fn is_declaration(&self) -> bool {
        self.0.ends_with(".d.ts")
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryPoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lexically normalize a manifest path.
///
/// Collapses `.` segments and repeated separators and folds `..` into its
/// parent, without touching the filesystem: `./a//b.js` becomes `a/b.js`.
/// Separators are always `/` so results compare equal across platforms.
pub fn normalize(path: &str) -> Option<String> {
    let cleaned = Path::new(path).clean();
    let text = cleaned.to_string_lossy();

    if text.is_empty() || text == "." {
        return None;
    }

    Some(if std::path::MAIN_SEPARATOR == '\\' {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    })
}

/// Collect the deduplicated build targets declared by `pkg`.
///
/// An empty result means there is nothing to build; it is not an error.
pub fn resolve_entries(pkg: &PackageManifest) -> Vec<EntryPoint> {
    let exports = pkg.exports.as_ref();
    let root = exports.and_then(|e| e.root.as_ref());

    let leading = [
        pkg.types.as_deref(),
        root.and_then(|r| r.types.as_deref()),
        pkg.main.as_deref(),
        pkg.module.as_deref(),
    ];
    let trailing = [
        exports.and_then(|e| e.conditions.import.as_deref()),
        exports.and_then(|e| e.conditions.require.as_deref()),
        root.and_then(|r| r.import.as_deref()),
        root.and_then(|r| r.require.as_deref()),
    ];

    let unique: IndexSet<EntryPoint> = leading
        .into_iter()
        .chain(pkg.bin_paths().into_iter().map(Some))
        .chain(trailing)
        .flatten()
        .filter_map(EntryPoint::new)
        .collect();

    unique.into_iter().collect()
}
