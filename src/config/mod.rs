//! Compile configuration from `tshtml.toml` and the command line.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [compiler], [output], [handlers], [build]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # CompileConfig (this file)
//! ```
//!
//! The config file is optional. Without one every section takes its
//! defaults; command-line flags override file values either way. The result
//! is immutable and shared by every document of a batch.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildConfig, CompilerConfig, HandlersConfig, OutputConfig};

use crate::cli::Cli;
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "tshtml.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing tshtml.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Config file the values came from (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths resolve against: the config file's parent,
    /// or the working directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub compiler: CompilerConfig,
    pub output: OutputConfig,
    pub handlers: HandlersConfig,
    pub build: BuildConfig,
}

impl CompileConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// An explicit `--config` must exist; otherwise `tshtml.toml` is searched
    /// upward from the working directory and defaults apply if none is found.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let config_path = match &cli.config {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => find_config_file(Path::new(CONFIG_FILE), &cwd),
        };

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        config.root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or(cwd, Path::to_path_buf);
        config.config_path = config_path;
        config.apply_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to load `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {} (ignored):", path.display());
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-line overrides. Switches only ever turn options on.
    fn apply_cli(&mut self, cli: &Cli) {
        let output = &mut self.output;
        output.remove_comments |= cli.remove_comments;
        output.minify |= cli.minify;
        output.keep_temp |= cli.keep_temp;
        Self::update_option(&mut output.name, cli.output.as_ref());

        let compiler = &mut self.compiler;
        if let Some(path) = &cli.tsc_path {
            compiler.path = Some(path.clone());
        }
        Self::update_option(&mut compiler.target, cli.target.as_ref());
        Self::update_option(&mut compiler.lib, cli.lib.as_ref());
        compiler.args.extend(cli.tsc_args.iter().cloned());

        Self::update_option(&mut self.handlers.mode, cli.handlers.as_ref());
        Self::update_option(&mut self.build.jobs, cli.jobs.as_ref());
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.output.name;
        if name.trim().is_empty() {
            return Err(ConfigError::Validation("[output] name is empty".into()));
        }
        if name.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "[output] name `{name}` must be a file name, not a path"
            )));
        }
        if self.compiler.lib.iter().any(|lib| lib.trim().is_empty()) {
            return Err(ConfigError::Validation("[compiler] lib has an empty entry".into()));
        }
        Ok(())
    }

    /// Concatenated prelude files, resolved against the config root.
    pub fn load_prelude(&self) -> Result<String> {
        let mut prelude = String::new();
        for path in &self.compiler.prelude {
            let path = self.root.join(path);
            let text = fs::read_to_string(&path)
                .map_err(|err| ConfigError::Io(path.clone(), err))
                .context("Failed to load [compiler] prelude")?;
            prelude.push_str(&text);
            if !text.ends_with('\n') {
                prelude.push('\n');
            }
        }
        Ok(prelude)
    }
}

/// Parse a config for tests, panicking on errors.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> CompileConfig {
    CompileConfig::from_str(content).expect("valid test config")
}

// ============================================================================
// tests
// ============================================================================
