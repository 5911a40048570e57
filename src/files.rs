use eyre::WrapErr;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::Result;

/// Lists every file under `root` as a path relative to `root`, sorted.
///
/// Hidden files are included; `.gitignore` and `.ignore` rules are honored.
#[tracing::instrument(level = "debug", name = "files.walk", skip_all, fields(root = %root.display()))]
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|e| e.file_name() != ".git")
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();
    for entry in walker {
        let entry = entry.wrap_err_with(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    trace!("found {} files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_relative_paths_respecting_ignore_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("README.md"), "x").unwrap();
        fs::write(dir.path().join("docs/guide.md"), "x").unwrap();
        fs::write(dir.path().join("target/out.md"), "x").unwrap();
        fs::write(dir.path().join(".ignore"), "target/\n").unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from(".ignore"),
                PathBuf::from("README.md"),
                PathBuf::from("docs/guide.md"),
            ]
        );
    }
}
