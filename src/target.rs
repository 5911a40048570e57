use std::path::{Path, PathBuf};

/// A file under formatting: its declared path and the content the next step will see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub content: String,
}

impl Target {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Reads the content from `root.join(path)`, keeping `path` as declared.
    pub fn read(root: &Path, path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(root.join(&path))?;
        Ok(Self { path, content })
    }
}
