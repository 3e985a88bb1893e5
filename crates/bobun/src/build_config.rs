//! Mapping a build target back to its source and bundler options.

use std::fmt;

use crate::entry::EntryPoint;
use crate::error::BuildError;

/// Directory the bundler writes to, relative to the package root.
pub const OUT_DIR: &str = "dist";

/// Directory holding the TypeScript sources.
pub const SOURCE_DIR: &str = "src";

/// Output module format. Only ES modules are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Esm,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Esm => "esm",
        }
    }
}

/// How source maps are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapMode {
    None,
    /// Embedded in the output file as a data URL
    Inline,
}

impl SourceMapMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMapMode::None => "none",
            SourceMapMode::Inline => "inline",
        }
    }
}

/// Extra build steps attached to a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plugin {
    /// Emit a bundled `.d.ts` for the source instead of relying on the
    /// JavaScript output.
    Declarations { no_banner: bool },
}

/// Switches shared by every entry of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFlags {
    pub minify: bool,
    pub sourcemap: bool,
    /// Runtime the output targets, e.g. `bun`
    pub runtime: String,
}

impl Default for BuildFlags {
    fn default() -> Self {
        Self {
            minify: false,
            sourcemap: false,
            runtime: "bun".to_string(),
        }
    }
}

/// Everything the bundler needs to produce one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Declared target, e.g. `dist/index.js`
    pub entry: EntryPoint,
    /// Source file, e.g. `src/index.ts`
    pub source: String,
    pub out_dir: String,
    /// Directory `[dir]` in the naming template is relative to
    pub root: Option<String>,
    pub target: String,
    pub format: Format,
    /// Output naming template (`[dir]/[name].[ext]`)
    pub naming: String,
    pub external: Vec<String>,
    pub plugins: Vec<Plugin>,
    pub minify: bool,
    pub sourcemap: SourceMapMode,
}

impl BuildConfig {
    /// Build the config for one target path.
    ///
    /// # Errors
    ///
    /// `BuildError::UnsupportedFormat` when the target ends in `.cjs`.
    pub fn from_entry(
        entry: &EntryPoint,
        external: &[String],
        flags: &BuildFlags,
    ) -> Result<Self, BuildError> {
        let target = entry.as_str();

        if target.ends_with(".cjs") {
            return Err(BuildError::UnsupportedFormat(target.to_string()));
        }

        let mut plugins = Vec::new();
        if entry.is_declaration() {
            plugins.push(Plugin::Declarations { no_banner: true });
        }

        let naming = if target.ends_with(".mjs") {
            "[dir]/[name].mjs"
        } else {
            "[dir]/[name].[ext]"
        };

        let source = source_path(target);
        let root = source
            .starts_with(&format!("{SOURCE_DIR}/"))
            .then(|| format!("./{SOURCE_DIR}"));

        Ok(Self {
            entry: entry.clone(),
            source,
            out_dir: format!("./{OUT_DIR}"),
            root,
            target: flags.runtime.clone(),
            format: Format::Esm,
            naming: naming.to_string(),
            external: external.to_vec(),
            plugins,
            minify: flags.minify,
            sourcemap: if flags.sourcemap {
                SourceMapMode::Inline
            } else {
                SourceMapMode::None
            },
        })
    }

    pub fn wants_declarations(&self) -> bool {
        self.plugins
            .iter()
            .any(|p| matches!(p, Plugin::Declarations { .. }))
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.entry)
    }
}

/// Map a target path to the TypeScript file it is built from.
///
/// `dist/index.d.ts`, `dist/index.js` and `dist/index.mjs` all come from
/// `src/index.ts`. A leading `dist` (or `src`) segment is rewritten to `src`;
/// other prefixes are kept.
pub fn source_path(target: &str) -> String {
    let stem = [".d.ts", ".mjs", ".cjs", ".js"]
        .iter()
        .find_map(|ext| target.strip_suffix(ext));
    let with_ts = match stem {
        Some(stem) => format!("{stem}.ts"),
        None => target.to_string(),
    };

    match with_ts.split_once('/') {
        Some((first, rest)) if first == OUT_DIR || first == SOURCE_DIR => {
            format!("{SOURCE_DIR}/{rest}")
        }
        _ => with_ts,
    }
}
