//! Entry point discovery
//!
//! Each entry argument is a file, a directory, or a glob pattern. Relative
//! arguments are taken from the current directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::constants::build::SKIPPED_DIRECTORIES;
use crate::error::DpdmError;

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn absolutize(path: &Path) -> Result<PathBuf, DpdmError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Expand entry arguments into candidate files, deduplicated, in argument
/// order
///
/// Plain paths are passed through even when they do not exist; the resolver
/// applies extension fallbacks to them.
pub fn expand(patterns: &[String], config: &BuildConfig) -> Result<Vec<PathBuf>, DpdmError> {
    let mut files = Vec::new();

    for pattern in patterns {
        let path = absolutize(Path::new(pattern))?;

        if is_glob(pattern) {
            files.extend(glob_files(&path.to_string_lossy(), config)?);
        } else if path.is_dir() {
            files.extend(walk_dir(&path, config));
        } else {
            files.push(path);
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|path| seen.insert(path.clone()));
    Ok(files)
}

fn glob_files(pattern: &str, config: &BuildConfig) -> Result<Vec<PathBuf>, DpdmError> {
    let paths = glob::glob(pattern).map_err(|e| DpdmError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    Ok(paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("cannot read {}: {e}", e.path().display());
                None
            }
        })
        .filter(|path| path.is_file() && config.is_js(path))
        .collect())
}

fn walk_dir(dir: &Path, config: &BuildConfig) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !SKIPPED_DIRECTORIES.contains(&name.as_ref())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && config.is_js(e.path()))
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::common::ConfigBuilder;

    fn project(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        temp
    }

    fn config(root: &Path) -> BuildConfig {
        BuildConfig::builder()
            .with_context(root.to_path_buf())
            .build()
            .unwrap()
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().display().to_string())
            .collect()
    }

    #[test]
    fn test_directory_entry_walks_js_files() {
        let temp = project(&[
            "src/b.ts",
            "src/a.js",
            "src/styles.css",
            "src/node_modules/dep/index.js",
            "src/nested/c.tsx",
        ]);
        let dir = temp.path().join("src").display().to_string();

        let files = expand(&[dir], &config(temp.path())).unwrap();
        assert_eq!(
            relative(temp.path(), files),
            vec!["src/a.js", "src/b.ts", "src/nested/c.tsx"]
        );
    }

    #[test]
    fn test_glob_entry() {
        let temp = project(&["lib/x.js", "lib/y.js", "lib/z.md"]);
        let pattern = temp.path().join("lib/*").display().to_string();

        let files = expand(&[pattern], &config(temp.path())).unwrap();
        assert_eq!(relative(temp.path(), files), vec!["lib/x.js", "lib/y.js"]);
    }

    #[test]
    fn test_plain_paths_pass_through_and_dedup() {
        let temp = project(&["a.js"]);
        let a = temp.path().join("a.js").display().to_string();
        let missing = temp.path().join("missing").display().to_string();

        let files = expand(&[a.clone(), missing, a], &config(temp.path())).unwrap();
        assert_eq!(relative(temp.path(), files), vec!["a.js", "missing"]);
    }

    #[test]
    fn test_invalid_glob() {
        let temp = project(&[]);
        let pattern = temp.path().join("[").display().to_string();

        assert!(matches!(
            expand(&[pattern], &config(temp.path())),
            Err(DpdmError::InvalidPattern { .. })
        ));
    }
}
