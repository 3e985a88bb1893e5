//! Build orchestration.
//!
//! One run is:
//!
//! 1. Load `package.json` and resolve its entry points
//! 2. Turn every entry into a [`BuildConfig`]
//! 3. Delete the output directory
//! 4. Dispatch all configs to the bundler at once and wait for every result
//! 5. Post-process and report each result in entry order
//! 6. Prune outputs that no entry declares
//!
//! Steps 1 and 2 can fail the run; they happen before anything on disk is
//! touched. A failed entry in step 4 is reported and does not affect the
//! others.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use crate::banner::license_header;
use crate::build_config::{BuildConfig, OUT_DIR};
use crate::bundler::{BuildResult, Bundler};
use crate::config::BobunConfig;
use crate::entry::{EntryPoint, resolve_entries};
use crate::error::{BuildError, Result, ResultExt};
use crate::manifest::PackageManifest;
use crate::prune::prune_stale_outputs;
use crate::report::Reporter;
use crate::ui::{format_duration, format_size};

/// What a run did, per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Every resolved entry, in priority order
    pub entries: Vec<EntryPoint>,
    pub succeeded: Vec<EntryPoint>,
    pub failed: Vec<EntryPoint>,
    /// Files removed by the stale-output pass
    pub pruned: Vec<String>,
}

impl BuildSummary {
    /// `true` when there was nothing to build.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turn failed entries into `BuildError::Failed`.
    pub fn into_result(self) -> Result<Self> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(BuildError::Failed {
                failed: self.failed.len(),
                total: self.entries.len(),
            }
            .into())
        }
    }
}

/// Drives one build of the package in `cwd`.
pub struct Orchestrator<B, R> {
    cwd: PathBuf,
    bundler: B,
    reporter: R,
    config: BobunConfig,
}

impl<B: Bundler, R: Reporter> Orchestrator<B, R> {
    pub fn new(cwd: impl Into<PathBuf>, bundler: B, reporter: R, config: BobunConfig) -> Self {
        Self {
            cwd: cwd.into(),
            bundler,
            reporter,
            config,
        }
    }

    /// Build every entry point declared by the manifest.
    ///
    /// Failed entries are reported and listed in the summary; they are not
    /// an `Err`. See [`BuildSummary::into_result`].
    pub async fn run(&self) -> Result<BuildSummary> {
        let pkg = PackageManifest::load(&self.cwd).await?;
        let entries = resolve_entries(&pkg);

        if entries.is_empty() {
            self.reporter.warn("No entries found.");
            return Ok(BuildSummary::default());
        }

        let listed: Vec<&str> = entries.iter().map(EntryPoint::as_str).collect();
        self.reporter
            .info(&format!("Automatically detected entries: {}", listed.join(", ")));

        let external = pkg.externals();
        let flags = self.config.build_flags();
        let configs = entries
            .iter()
            .map(|entry| BuildConfig::from_entry(entry, &external, &flags))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.reporter
            .info(&format!("Cleaning dist directory: {OUT_DIR}"));
        clean_output_dir(&self.cwd.join(OUT_DIR)).await?;

        debug!("Dispatching {} builds", configs.len());
        let results = join_all(configs.iter().map(|config| self.build_one(config))).await;

        let bin_targets = pkg.bin_targets();
        let banner = self.config.banner.then(|| license_header(&pkg));
        let mut summary = BuildSummary {
            entries: entries.clone(),
            ..BuildSummary::default()
        };

        for (config, result) in configs.iter().zip(results) {
            if result.success {
                let is_bin = bin_targets.contains(config.entry.as_str());
                self.finish_output(config, is_bin, banner.as_deref()).await?;
                self.reporter.success(&success_line(config, &result));
                summary.succeeded.push(config.entry.clone());
            } else {
                self.reporter.error(&config.source);
                self.reporter.log(&format!("\t{}", result.joined_logs()));
                summary.failed.push(config.entry.clone());
            }
        }

        summary.pruned = prune_stale_outputs(&self.cwd, &entries)?;
        Ok(summary)
    }

    async fn build_one(&self, config: &BuildConfig) -> BuildResult {
        let started = Instant::now();
        let mut result = self.bundler.build(config).await;
        result.elapsed = started.elapsed();
        debug!(
            "{} finished in {} (success: {})",
            config,
            format_duration(result.elapsed),
            result.success
        );
        result
    }

    /// Add the shebang and banner to a produced file, rewriting it in place.
    async fn finish_output(
        &self,
        config: &BuildConfig,
        is_bin: bool,
        banner: Option<&str>,
    ) -> Result<()> {
        let banner = banner.filter(|_| !config.wants_declarations());
        if !is_bin && banner.is_none() {
            return Ok(());
        }

        let path = self.cwd.join(config.entry.as_str());
        let content = tokio::fs::read_to_string(&path).await.with_path(&path)?;
        let shebang = is_bin.then(|| shebang_line(&self.config.runtime));

        if let Some(updated) = insert_headers(&content, shebang.as_deref(), banner) {
            tokio::fs::write(&path, updated).await.with_path(&path)?;
        }

        Ok(())
    }
}

/// `#!/usr/bin/env <runtime>` followed by a newline.
pub fn shebang_line(runtime: &str) -> String {
    format!("#!/usr/bin/env {runtime}\n")
}

/// Prepend an interpreter line and/or banner to `content`.
///
/// A file that already starts with `#!` keeps its own interpreter line, and
/// the banner goes after whichever interpreter line ends up first. Returns
/// `None` when nothing changes.
pub fn insert_headers(content: &str, shebang: Option<&str>, banner: Option<&str>) -> Option<String> {
    let (existing, body) = if content.starts_with("#!") {
        match content.find('\n') {
            Some(end) => content.split_at(end + 1),
            None => (content, ""),
        }
    } else {
        ("", content)
    };

    let shebang = if existing.is_empty() { shebang } else { None };
    if shebang.is_none() && banner.is_none() {
        return None;
    }

    let mut out = String::with_capacity(content.len() + 256);
    match shebang {
        Some(line) => out.push_str(line),
        None => {
            out.push_str(existing);
            if !existing.is_empty() && !existing.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    if let Some(banner) = banner {
        out.push_str(banner);
    }
    out.push_str(body);
    Some(out)
}

fn success_line(config: &BuildConfig, result: &BuildResult) -> String {
    let size: u64 = result.outputs.iter().map(|o| o.size).sum();
    let timing = format_duration(result.elapsed);

    if result.outputs.is_empty() {
        format!("{} → {} ({})", config.source, config.entry, timing)
    } else {
        format!(
            "{} → {} ({}, {})",
            config.source,
            config.entry,
            timing,
            format_size(size)
        )
    }
}

async fn clean_output_dir(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .context(format!("Failed to clean {}", path.display()))
            .with_hint("Make sure dist is a directory bobun may delete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BuildMessage, OutputArtifact};
    use crate::error::{CliError, ManifestError};
    use crate::report::{Level, MemoryReporter};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    /// Writes `content` at the target path, plus a `.js` sibling for
    /// declaration targets the way `bun build` does.
    struct FakeBundler {
        cwd: PathBuf,
        content: String,
        fail: HashSet<String>,
        no_output: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBundler {
        fn new(cwd: &Path) -> Self {
            Self {
                cwd: cwd.to_path_buf(),
                content: "console.log(1);\n".to_string(),
                fail: HashSet::new(),
                no_output: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, entry: &str) -> Self {
            self.fail.insert(entry.to_string());
            self
        }

        /// Report success for `entry` without writing anything.
        fn without_output(mut self, entry: &str) -> Self {
            self.no_output.insert(entry.to_string());
            self
        }

        fn with_content(mut self, content: &str) -> Self {
            self.content = content.to_string();
            self
        }
    }

    #[async_trait]
    impl Bundler for FakeBundler {
        async fn build(&self, config: &BuildConfig) -> BuildResult {
            self.calls.lock().push(config.entry.to_string());

            if self.fail.contains(config.entry.as_str()) {
                return BuildResult::failure(vec![
                    BuildMessage::new("error: Could not resolve \"./missing\""),
                    BuildMessage::new("    at src/index.ts:1:8"),
                ]);
            }

            if self.no_output.contains(config.entry.as_str()) {
                return BuildResult::success(Vec::new());
            }

            let path = self.cwd.join(config.entry.as_str());
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, &self.content).unwrap();

            if let Some(stem) = config.entry.as_str().strip_suffix(".d.ts") {
                fs::write(self.cwd.join(format!("{stem}.js")), "export {};\n").unwrap();
            }

            BuildResult::success(vec![OutputArtifact {
                path,
                size: self.content.len() as u64,
            }])
        }
    }

    fn project(manifest: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), manifest).unwrap();
        temp
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join(rel)).unwrap()
    }

    #[tokio::test]
    async fn test_no_entries_leaves_dist_alone() {
        let temp = project(r#"{ "name": "empty", "dependencies": { "zod": "^3" } }"#);
        fs::create_dir_all(temp.path().join("dist")).unwrap();
        fs::write(temp.path().join("dist/keep.js"), "x").unwrap();

        let bundler = FakeBundler::new(temp.path());
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let summary = orchestrator.run().await.unwrap();

        assert!(summary.is_empty());
        assert_eq!(reporter.messages(Level::Warn), vec!["No entries found."]);
        assert!(bundler.calls.lock().is_empty());
        assert!(temp.path().join("dist/keep.js").exists());
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        let bundler = FakeBundler::new(temp.path());
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, CliError::Manifest(ManifestError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_commonjs_entry_aborts_before_cleaning() {
        let temp = project(r#"{ "main": "dist/index.js", "exports": { "require": "dist/index.cjs" } }"#);
        fs::create_dir_all(temp.path().join("dist")).unwrap();
        fs::write(temp.path().join("dist/old.js"), "x").unwrap();

        let bundler = FakeBundler::new(temp.path());
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, CliError::Build(BuildError::UnsupportedFormat(_))));
        assert!(temp.path().join("dist/old.js").exists());
        assert!(bundler.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_full_build() {
        let temp = project(
            r#"{
                "types": "dist/index.d.ts",
                "main": "dist/main.js",
                "bin": { "mytool": "./dist/cli.js" },
                "dependencies": { "zod": "^3" }
            }"#,
        );
        fs::create_dir_all(temp.path().join("dist")).unwrap();
        fs::write(temp.path().join("dist/removed-entry.js"), "x").unwrap();

        let bundler = FakeBundler::new(temp.path());
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let summary = orchestrator.run().await.unwrap();
        let root = temp.path();

        assert_eq!(summary.succeeded.len(), 3);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.pruned, vec!["dist/index.js"]);

        assert_eq!(read(root, "dist/cli.js"), "#!/usr/bin/env bun\nconsole.log(1);\n");
        assert_eq!(read(root, "dist/main.js"), "console.log(1);\n");
        assert_eq!(read(root, "dist/index.d.ts"), "console.log(1);\n");
        assert!(!root.join("dist/removed-entry.js").exists());
        assert!(!root.join("dist/index.js").exists());

        let successes = reporter.messages(Level::Success);
        assert_eq!(successes.len(), 3);
        assert!(successes[0].starts_with("src/index.ts → dist/index.d.ts ("));
        assert!(successes[1].starts_with("src/main.ts → dist/main.js ("));
        assert!(successes[2].starts_with("src/cli.ts → dist/cli.js ("));

        let info = reporter.messages(Level::Info);
        assert_eq!(
            info[0],
            "Automatically detected entries: dist/index.d.ts, dist/main.js, dist/cli.js"
        );
        assert_eq!(info[1], "Cleaning dist directory: dist");
    }

    #[tokio::test]
    async fn test_failed_entry_does_not_affect_others() {
        let temp = project(
            r#"{
                "main": "dist/a.js",
                "module": "dist/b.mjs",
                "bin": { "c": "dist/c.js" }
            }"#,
        );

        let bundler = FakeBundler::new(temp.path()).failing("dist/b.mjs");
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(bundler.calls.lock().len(), 3);
        assert_eq!(summary.failed, vec![EntryPoint::new("dist/b.mjs").unwrap()]);
        assert_eq!(summary.succeeded.len(), 2);
        assert!(read(temp.path(), "dist/c.js").starts_with("#!/usr/bin/env bun\n"));

        assert_eq!(reporter.messages(Level::Error), vec!["src/b.ts"]);
        assert_eq!(
            reporter.messages(Level::Log),
            vec!["\terror: Could not resolve \"./missing\"\n    at src/index.ts:1:8"]
        );

        let err = summary.into_result().unwrap_err();
        assert!(matches!(
            err,
            CliError::Build(BuildError::Failed { failed: 1, total: 3 })
        ));
    }

    #[tokio::test]
    async fn test_missing_bin_output_stops_the_run() {
        let temp = project(
            r#"{
                "main": "dist/a.js",
                "bin": { "t": "dist/cli.js" },
                "exports": { "import": "dist/z.mjs" }
            }"#,
        );

        let bundler = FakeBundler::new(temp.path()).without_output("dist/cli.js");
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let err = orchestrator.run().await.unwrap_err();
        match err {
            CliError::FileNotFound(path) => assert_eq!(path, temp.path().join("dist/cli.js")),
            other => panic!("unexpected error: {other}"),
        }

        let successes = reporter.messages(Level::Success);
        assert_eq!(successes.len(), 1);
        assert!(successes[0].starts_with("src/a.ts → dist/a.js ("));
        assert!(reporter.messages(Level::Error).is_empty());
    }

    #[tokio::test]
    async fn test_unremovable_dist_stops_before_building() {
        let temp = project(r#"{ "main": "dist/index.js" }"#);
        fs::write(temp.path().join("dist"), "not a directory").unwrap();

        let bundler = FakeBundler::new(temp.path());
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let message = orchestrator.run().await.unwrap_err().to_string();
        assert!(message.starts_with("Failed to clean"), "{message}");
        assert!(message.contains("Hint: Make sure dist is a directory"));
        assert!(bundler.calls.lock().is_empty());
        assert!(temp.path().join("dist").is_file());
    }

    #[tokio::test]
    async fn test_existing_shebang_is_not_duplicated() {
        let temp = project(r#"{ "bin": { "tool": "dist/cli.js", "alias": "dist/cli.js" } }"#);

        let bundler = FakeBundler::new(temp.path()).with_content("#!/usr/bin/env bun\nrun();\n");
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        orchestrator.run().await.unwrap();

        assert_eq!(read(temp.path(), "dist/cli.js"), "#!/usr/bin/env bun\nrun();\n");
        assert_eq!(bundler.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_banner_and_runtime_from_config() {
        let temp = project(
            r#"{
                "version": "2.0.0",
                "license": "MIT",
                "types": "dist/index.d.ts",
                "module": "dist/index.mjs",
                "bin": "dist/cli.mjs"
            }"#,
        );

        let bundler = FakeBundler::new(temp.path());
        let reporter = MemoryReporter::new();
        let config = BobunConfig {
            banner: true,
            runtime: "node".to_string(),
            ..BobunConfig::default()
        };
        let orchestrator = Orchestrator::new(temp.path(), &bundler, &reporter, config);

        orchestrator.run().await.unwrap();
        let root = temp.path();

        let module = read(root, "dist/index.mjs");
        assert!(module.starts_with("/*!\n * Version: 2.0.0\n * License: MIT\n * Date: "));
        assert!(module.ends_with(" */\nconsole.log(1);\n"));

        let cli = read(root, "dist/cli.mjs");
        assert!(cli.starts_with("#!/usr/bin/env node\n/*!\n * Version: 2.0.0"));

        assert_eq!(read(root, "dist/index.d.ts"), "console.log(1);\n");
    }

    #[tokio::test]
    async fn test_builds_are_dispatched_concurrently() {
        use std::time::Duration;
        use tokio::sync::Barrier;

        /// Every build waits until all of them have started.
        struct GatedBundler {
            gate: Barrier,
        }

        #[async_trait]
        impl Bundler for GatedBundler {
            async fn build(&self, _config: &BuildConfig) -> BuildResult {
                self.gate.wait().await;
                BuildResult::success(Vec::new())
            }
        }

        let temp = project(
            r#"{ "main": "dist/a.js", "module": "dist/b.mjs", "exports": { "import": "dist/c.mjs" } }"#,
        );
        let bundler = GatedBundler {
            gate: Barrier::new(3),
        };
        let reporter = MemoryReporter::new();
        let orchestrator =
            Orchestrator::new(temp.path(), &bundler, &reporter, BobunConfig::default());

        let summary = tokio::time::timeout(Duration::from_secs(10), orchestrator.run())
            .await
            .expect("builds were not dispatched concurrently")
            .unwrap();
        assert_eq!(summary.succeeded.len(), 3);
    }

    #[test]
    fn test_insert_shebang() {
        assert_eq!(
            insert_headers("run();\n", Some("#!/usr/bin/env bun\n"), None).as_deref(),
            Some("#!/usr/bin/env bun\nrun();\n")
        );
    }

    #[test]
    fn test_insert_keeps_existing_shebang() {
        assert_eq!(
            insert_headers("#!/usr/bin/env node\nrun();\n", Some("#!/usr/bin/env bun\n"), None),
            None
        );
        assert_eq!(
            insert_headers("#!/usr/bin/env node\nrun();\n", None, Some("/*! b */\n")).as_deref(),
            Some("#!/usr/bin/env node\n/*! b */\nrun();\n")
        );
    }

    #[test]
    fn test_insert_banner_only() {
        assert_eq!(
            insert_headers("run();\n", None, Some("/*! b */\n")).as_deref(),
            Some("/*! b */\nrun();\n")
        );
        assert_eq!(insert_headers("run();\n", None, None), None);
    }

    #[test]
    fn test_shebang_line() {
        assert_eq!(shebang_line("bun"), "#!/usr/bin/env bun\n");
    }
}
