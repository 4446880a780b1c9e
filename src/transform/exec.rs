//! External command execution.
//!
//! # Examples
//!
//! ```ignore
//! let output = Cmd::new(&program)
//!     .arg(unit)
//!     .args(["--target", "es2017"])
//!     .cwd(dir)
//!     .run()?;
//! ```

use crate::error::WeaveError;
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::LazyLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Run to completion.
    ///
    /// Fails with the command's diagnostics if it exits non-zero or writes
    /// anything to stderr.
    pub fn run(self) -> Result<Output, WeaveError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WeaveError::ToolNotFound {
                tool: self.program.to_string_lossy().into_owned(),
            },
            _ => WeaveError::io("execute", PathBuf::from(&self.program), e),
        })?;

        if !output.status.success() || !output.stderr.iter().all(u8::is_ascii_whitespace) {
            return Err(WeaveError::TransformFailed {
                diagnostics: format_diagnostics(&output),
            });
        }
        Ok(output)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex")
    });
    RE.replace_all(s, "")
}

/// Diagnostics of a failed command: stdout then stderr, without colors.
fn format_diagnostics(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut msg = String::new();
    for stream in [stdout.trim(), stderr.trim()] {
        if stream.is_empty() {
            continue;
        }
        if !msg.is_empty() {
            msg.push('\n');
        }
        msg.push_str(&strip_ansi(stream));
    }

    if msg.is_empty() {
        msg = format!("exited with {}", output.status);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("tsc")
            .arg("unit.ts")
            .args(["--target", "es2017"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("tsc"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("tsc").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_missing_program() {
        let result = Cmd::new("tshtml-no-such-program-7f3a").run();
        assert!(matches!(result, Err(WeaveError::ToolNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_success() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_carries_diagnostics() {
        let result = Cmd::new("sh")
            .args(["-c", "echo 'x.ts(1,1): error TS1005'; exit 2"])
            .run();
        match result {
            Err(WeaveError::TransformFailed { diagnostics }) => {
                assert_eq!(diagnostics, "x.ts(1,1): error TS1005");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stderr_output_fails() {
        let result = Cmd::new("sh").args(["-c", "echo oops >&2"]).run();
        assert!(matches!(result, Err(WeaveError::TransformFailed { .. })));
    }
}
