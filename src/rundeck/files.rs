//! Entry-id to local file resolution for script uploads.

use std::path::{Path, PathBuf};

/// Resolves an opaque file reference to a readable local path.
pub trait FileResolver {
    fn resolve(&self, entry_id: &str) -> Option<PathBuf>;
}

/// Resolves entry ids against a local directory.
///
/// An absolute entry id is used as-is. A relative one is joined onto the
/// store root (the working directory when no root is configured). Either
/// way the result must name an existing regular file.
#[derive(Debug, Clone, Default)]
pub struct LocalFileStore {
    root: Option<PathBuf>,
}

impl LocalFileStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl FileResolver for LocalFileStore {
    fn resolve(&self, entry_id: &str) -> Option<PathBuf> {
        let entry_id = entry_id.trim();
        if entry_id.is_empty() {
            return None;
        }
        let candidate = Path::new(entry_id);
        let path = match &self.root {
            Some(root) if candidate.is_relative() => root.join(candidate),
            _ => candidate.to_path_buf(),
        };
        path.is_file().then_some(path)
    }
}

/// Resolver for calls that carry no uploads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFiles;

impl FileResolver for NoFiles {
    fn resolve(&self, _entry_id: &str) -> Option<PathBuf> {
        None
    }
}

/// Fixed entry-id table, for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticFiles(std::collections::HashMap<String, PathBuf>);

#[cfg(test)]
impl StaticFiles {
    pub fn with(mut self, entry_id: &str, path: impl Into<PathBuf>) -> Self {
        self.0.insert(entry_id.to_string(), path.into());
        self
    }
}

#[cfg(test)]
impl FileResolver for StaticFiles {
    fn resolve(&self, entry_id: &str) -> Option<PathBuf> {
        self.0.get(entry_id).cloned()
    }
}
