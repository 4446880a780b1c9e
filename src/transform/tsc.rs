//! The TypeScript compiler as a [`Transformer`].

use super::Transformer;
use super::exec::Cmd;
use crate::config::CompilerConfig;
use crate::debug;
use crate::error::WeaveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DEFAULT_PROGRAM: &str = "tsc";

/// ECMAScript version passed as `--target`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum Target {
    Es3,
    Es5,
    Es6,
    Es2016,
    #[default]
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
    EsNext,
}

impl Target {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Es3 => "es3",
            Self::Es5 => "es5",
            Self::Es6 => "es6",
            Self::Es2016 => "es2016",
            Self::Es2017 => "es2017",
            Self::Es2018 => "es2018",
            Self::Es2019 => "es2019",
            Self::Es2020 => "es2020",
            Self::Es2021 => "es2021",
            Self::Es2022 => "es2022",
            Self::EsNext => "esnext",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `tsc` invocation settings.
#[derive(Debug, Clone)]
pub struct Tsc {
    program: PathBuf,
    target: Target,
    lib: Vec<String>,
    args: Vec<String>,
}

impl Tsc {
    /// Locate the compiler: the configured path (tilde-expanded, looked up
    /// on `PATH` when it is a bare name) or `tsc` on `PATH`.
    pub fn from_config(config: &CompilerConfig) -> Result<Self, WeaveError> {
        let requested = config
            .path
            .as_deref()
            .map_or_else(|| DEFAULT_PROGRAM.to_string(), |p| p.to_string_lossy().into_owned());
        let expanded = PathBuf::from(shellexpand::tilde(&requested).as_ref());

        let program = if expanded.components().count() > 1 {
            expanded.is_file().then_some(expanded)
        } else {
            which::which(&expanded).ok()
        }
        .ok_or(WeaveError::ToolNotFound { tool: requested })?;

        debug!("tsc"; "using {}", program.display());
        Ok(Self {
            program,
            target: config.target,
            lib: config.lib.clone(),
            args: config.args.clone(),
        })
    }

    fn command(&self, unit: &Path) -> Cmd {
        let mut cmd = Cmd::new(&self.program);
        cmd = match unit.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => cmd.arg(unit.file_name().unwrap_or(unit.as_os_str())).cwd(dir),
            None => cmd.arg(unit),
        };
        cmd = cmd.args(["--target", self.target.as_str()]);
        if !self.lib.is_empty() {
            cmd = cmd.arg("--lib").arg(self.lib.join(","));
        }
        cmd.args(&self.args)
    }
}

impl Transformer for Tsc {
    fn transform(&self, unit: &Path) -> Result<String, WeaveError> {
        self.command(unit).run()?;

        let emitted = unit.with_extension("js");
        fs::read_to_string(&emitted).map_err(|e| WeaveError::io("read", emitted, e))
    }
}

/// A [`Tsc`] located on its first use.
///
/// Documents without inline code never need the compiler, so they compile
/// even when it is missing; every document that does need it fails with
/// [`WeaveError::ToolNotFound`].
pub struct LazyTsc {
    config: CompilerConfig,
    /// The located compiler, or the name that could not be found.
    tsc: OnceLock<Result<Tsc, String>>,
}

impl LazyTsc {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            config: config.clone(),
            tsc: OnceLock::new(),
        }
    }

    fn get(&self) -> Result<&Tsc, WeaveError> {
        let located = self.tsc.get_or_init(|| {
            Tsc::from_config(&self.config).map_err(|e| match e {
                WeaveError::ToolNotFound { tool } => tool,
                other => other.to_string(),
            })
        });
        located
            .as_ref()
            .map_err(|tool| WeaveError::ToolNotFound { tool: tool.clone() })
    }
}

impl Transformer for LazyTsc {
    fn transform(&self, unit: &Path) -> Result<String, WeaveError> {
        self.get()?.transform(unit)
    }
}
