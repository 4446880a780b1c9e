//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// # Example
/// ```text
/// /home/user/app/pages/blog/  ← start
/// /home/user/app/tshtml.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_config_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a/tshtml.toml"), "").unwrap();

        assert_eq!(
            find_config_file(Path::new("tshtml.toml"), &nested),
            Some(dir.path().join("a/tshtml.toml"))
        );
    }

    #[test]
    fn test_nearest_config_wins() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("tshtml.toml"), "").unwrap();
        fs::write(nested.join("tshtml.toml"), "").unwrap();

        assert_eq!(
            find_config_file(Path::new("tshtml.toml"), &nested),
            Some(nested.join("tshtml.toml"))
        );
    }

    #[test]
    fn test_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        assert_eq!(find_config_file(&path, dir.path()), None);

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }

    #[test]
    fn test_directory_is_not_a_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("tshtml.toml")).unwrap();
        assert_eq!(
            find_config_file(Path::new("tshtml.toml"), dir.path())
                .filter(|p| p.starts_with(dir.path())),
            None
        );
    }
}
