//! Runtime configuration with multi-source loading.
//!
//! Priority: CLI flags > `BOBUN_*` environment variables > defaults.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::build_config::BuildFlags;
use crate::cli::Cli;
use crate::error::{ConfigError, Result};

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BobunConfig {
    /// Minify the output
    pub minify: bool,
    /// Embed inline source maps
    pub sourcemap: bool,
    /// Bundler executable, looked up on PATH
    pub bundler: String,
    /// Runtime the output targets, also used in the shebang line
    pub runtime: String,
    /// Prepend a license banner to JavaScript outputs
    pub banner: bool,
}

impl Default for BobunConfig {
    fn default() -> Self {
        Self {
            minify: false,
            sourcemap: false,
            bundler: "bun".to_string(),
            runtime: "bun".to_string(),
            banner: false,
        }
    }
}

/// Flags only override lower layers when they are actually passed.
#[derive(Debug, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    minify: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    sourcemap: bool,
}

impl BobunConfig {
    /// Load configuration for the parsed command line.
    pub fn load(args: &Cli) -> Result<Self> {
        let config: Self = Self::figment(args).extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: "Check BOBUN_* environment variables".to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn figment(args: &Cli) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("BOBUN_"))
            .merge(Serialized::defaults(CliOverrides {
                minify: args.minify,
                sourcemap: args.sourcemap,
            }))
    }

    /// Reject values that would produce a broken command line or shebang.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bundler.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "bundler".to_string(),
                value: format!("{:?}", self.bundler),
                hint: "Set BOBUN_BUNDLER to the bun executable or leave it unset".to_string(),
            });
        }

        if self.runtime.is_empty() || self.runtime.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "runtime".to_string(),
                value: format!("{:?}", self.runtime),
                hint: "The runtime is a single word such as 'bun' or 'node'".to_string(),
            });
        }

        Ok(())
    }

    /// Per-entry switches derived from this configuration.
    pub fn build_flags(&self) -> BuildFlags {
        BuildFlags {
            minify: self.minify,
            sourcemap: self.sourcemap,
            runtime: self.runtime.clone(),
        }
    }
}
