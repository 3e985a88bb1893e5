//! The external bundler boundary.
//!
//! Bobun never compiles anything itself. Each [`BuildConfig`] is handed to a
//! [`Bundler`], which reports success with the produced artifacts or failure
//! with diagnostic messages. [`BunBundler`] drives the `bun build` CLI; tests
//! substitute their own implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::build_config::{BuildConfig, Plugin, SourceMapMode};

/// A file written by the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub size: u64,
}

/// One diagnostic line from the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMessage {
    pub message: String,
}

impl BuildMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of building one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub success: bool,
    pub outputs: Vec<OutputArtifact>,
    pub logs: Vec<BuildMessage>,
    /// Wall time of the build, filled in by the caller that timed it
    pub elapsed: Duration,
}

impl BuildResult {
    pub fn success(outputs: Vec<OutputArtifact>) -> Self {
        Self {
            success: true,
            outputs,
            logs: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn failure(logs: Vec<BuildMessage>) -> Self {
        Self {
            success: false,
            outputs: Vec::new(),
            logs,
            elapsed: Duration::ZERO,
        }
    }

    /// All diagnostic messages, one per line.
    pub fn joined_logs(&self) -> String {
        self.logs
            .iter()
            .map(|l| l.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Something that can turn a [`BuildConfig`] into output files.
///
/// Implementations must not panic on build errors; they report them through
/// [`BuildResult::failure`].
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn build(&self, config: &BuildConfig) -> BuildResult;
}

#[async_trait]
impl<T: Bundler + ?Sized> Bundler for &T {
    async fn build(&self, config: &BuildConfig) -> BuildResult {
        (**self).build(config).await
    }
}

/// Runs `bun build` (and `bun x dts-bundle-generator` for declaration
/// targets) inside the package directory.
#[derive(Debug, Clone)]
pub struct BunBundler {
    cwd: PathBuf,
    program: String,
}

impl BunBundler {
    /// `program` is looked up on `PATH` unless it is a path.
    pub fn new(cwd: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            program: program.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf, BuildMessage> {
        which::which(&self.program).map_err(|_| {
            BuildMessage::new(format!(
                "'{}' was not found\n\nHint: Install Bun from https://bun.sh or set BOBUN_BUNDLER to its path",
                self.program
            ))
        })
    }

    async fn run(&self, program: &Path, args: &[String]) -> Result<(), Vec<BuildMessage>> {
        debug!("{} {}", program.display(), args.join(" "));

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .await
            .map_err(|e| {
                vec![BuildMessage::new(format!(
                    "Failed to run {}: {e}",
                    program.display()
                ))]
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(failure_messages(&output))
        }
    }

    async fn collect_outputs(&self, config: &BuildConfig) -> Vec<OutputArtifact> {
        let path = self.cwd.join(config.entry.as_str());
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => vec![OutputArtifact {
                path,
                size: meta.len(),
            }],
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl Bundler for BunBundler {
    async fn build(&self, config: &BuildConfig) -> BuildResult {
        let program = match self.locate() {
            Ok(program) => program,
            Err(message) => return BuildResult::failure(vec![message]),
        };

        if let Err(logs) = self.run(&program, &bun_build_args(config)).await {
            return BuildResult::failure(logs);
        }

        for plugin in &config.plugins {
            let Plugin::Declarations { no_banner } = plugin;
            if let Err(logs) = self.run(&program, &declaration_args(config, *no_banner)).await {
                return BuildResult::failure(logs);
            }
        }

        BuildResult::success(self.collect_outputs(config).await)
    }
}

/// Arguments for `bun build` for one config.
pub fn bun_build_args(config: &BuildConfig) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        config.source.clone(),
        "--outdir".to_string(),
        config.out_dir.clone(),
        "--target".to_string(),
        config.target.clone(),
        "--format".to_string(),
        config.format.as_str().to_string(),
        "--entry-naming".to_string(),
        config.naming.clone(),
    ];

    if let Some(root) = &config.root {
        args.push("--root".to_string());
        args.push(root.clone());
    }

    for package in &config.external {
        args.push("--external".to_string());
        args.push(package.clone());
    }

    if config.minify {
        args.push("--minify".to_string());
    }

    if config.sourcemap != SourceMapMode::None {
        args.push(format!("--sourcemap={}", config.sourcemap.as_str()));
    }

    args
}

/// Arguments for generating a bundled declaration file at the entry path.
pub fn declaration_args(config: &BuildConfig, no_banner: bool) -> Vec<String> {
    let mut args = vec!["x".to_string(), "dts-bundle-generator".to_string()];
    if no_banner {
        args.push("--no-banner".to_string());
    }
    args.push("-o".to_string());
    args.push(config.entry.as_str().to_string());
    args.push(config.source.clone());
    args
}

fn failure_messages(output: &Output) -> Vec<BuildMessage> {
    let messages: Vec<BuildMessage> = String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(BuildMessage::new)
        .collect();

    if messages.is_empty() {
        vec![BuildMessage::new(format!("Bundler exited with {}", output.status))]
    } else {
        messages
    }
}
