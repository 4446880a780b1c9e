//! `[output]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [output]
//! name = "{stem}.html"     # Output file name, written next to the input
//! remove_comments = false  # Strip HTML and script comments
//! minify = false           # Collapse markup, minify scripts and styles
//! keep_temp = false        # Keep the generated .ts/.js unit files
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder for the input file stem in [`OutputConfig::name`].
const STEM: &str = "{stem}";

/// Output file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name pattern; `{stem}` is replaced by the input's file stem.
    pub name: String,

    pub remove_comments: bool,

    /// Implies `remove_comments`.
    pub minify: bool,

    /// Keep synthetic unit files after compilation.
    pub keep_temp: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: format!("{STEM}.html"),
            remove_comments: false,
            minify: false,
            keep_temp: false,
        }
    }
}

impl OutputConfig {
    /// Output path for `input`, in the same directory.
    ///
    /// ```ignore
    /// // name = "{stem}.html"
    /// output_path("pages/index.tshtml") -> "pages/index.html"
    /// ```
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        input.with_file_name(self.name.replace(STEM, &stem))
    }
}
