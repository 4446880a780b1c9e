//! Input discovery: globs, directories and file classification.

use crate::pipeline::InputKind;
use crate::{debug, log};
use jwalk::WalkDir;
use std::path::{Path, PathBuf};

/// A file to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: PathBuf,
    pub kind: InputKind,
}

/// Expand command-line paths into inputs, in argument order.
///
/// - Patterns are expanded with `glob`; a pattern matching nothing is
///   taken literally.
/// - Directories are walked for documents and `.ts` files.
/// - Explicit files with other extensions are skipped with a log line.
///
/// Duplicates are dropped, keeping the first occurrence.
pub fn collect_inputs(args: &[String]) -> Vec<Input> {
    let mut inputs: Vec<Input> = Vec::new();
    let mut push = |path: PathBuf, kind: InputKind| {
        if !inputs.iter().any(|i| i.path == path) {
            inputs.push(Input { path, kind });
        }
    };

    for arg in args {
        for path in expand(arg) {
            if path.is_dir() {
                for file in walk(&path) {
                    if let Some(kind) = InputKind::from_path(&file) {
                        push(file, kind);
                    }
                }
                continue;
            }
            match InputKind::from_path(&path) {
                Some(kind) => push(path, kind),
                None => log!("skip"; "{} (not a .tshtml or .ts file)", path.display()),
            }
        }
    }
    inputs
}

fn expand(arg: &str) -> Vec<PathBuf> {
    let matches: Vec<PathBuf> = match glob::glob(arg) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(e) => {
            debug!("inputs"; "`{}` is not a glob pattern: {}", arg, e);
            Vec::new()
        }
    };
    if matches.is_empty() {
        vec![PathBuf::from(arg)]
    } else {
        matches
    }
}

/// Files under `dir`, sorted, skipping hidden entries (temp units among them).
fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| !is_hidden(path.strip_prefix(dir).unwrap_or(path)))
        .collect();
    files.sort();
    files
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}
