//! In-memory runtime for tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Runtime, RuntimeError, RuntimeResult};

/// A runtime whose file system is a map held in memory.
///
/// Directories exist implicitly whenever a file lives below them. Bare package
/// specifiers resolve to `node_modules/<specifier>/index.js` in the importing
/// file's directory or any of its ancestors.
#[derive(Debug, Clone, Default)]
pub struct TestRuntime {
    files: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
    cwd: PathBuf,
}

impl TestRuntime {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            files: Arc::default(),
            cwd: cwd.into(),
        }
    }

    /// Add a file; relative paths are taken from the working directory.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.absolute(path.as_ref());
        self.files.write().insert(path, content.into());
    }

    /// Read back a file as text, e.g. to assert on written artifacts.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.absolute(path.as_ref());
        self.files
            .read()
            .get(&path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// All stored paths below `dir`, sorted.
    pub fn files_under(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = self.absolute(dir.as_ref());
        let mut paths: Vec<PathBuf> = self
            .files
            .read()
            .keys()
            .filter(|path| path.starts_with(&dir))
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.cwd.join(path).clean()
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.absolute(path);
        self.files
            .read()
            .keys()
            .any(|file| file != &path && file.starts_with(&path))
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files
            .read()
            .get(&self.absolute(path))
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        self.insert(path, content.to_vec());
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        let dir = self.absolute(path);
        self.files.write().retain(|file, _| !file.starts_with(&dir));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().contains_key(&self.absolute(path))
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        let from = self.absolute(from);
        for dir in from.ancestors().skip(1) {
            let candidate = dir.join("node_modules").join(specifier).join("index.js");
            if self.is_file(&candidate) {
                return Ok(candidate);
            }
        }

        Err(RuntimeError::ResolutionFailed {
            specifier: specifier.to_string(),
            from,
            reason: "package not installed".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directories_are_implicit() {
        let runtime = TestRuntime::new("/app").with_file("src/managers/db.ts", "export {}");

        assert!(runtime.exists(Path::new("/app/src/managers")));
        assert!(!runtime.is_file(Path::new("/app/src/managers")));
        assert!(runtime.exists(Path::new("src")));
        runtime.remove_dir_all(Path::new("src")).await.unwrap();
        assert!(!runtime.exists(Path::new("src/managers/db.ts")));
    }

    #[test]
    fn packages_resolve_from_ancestors() {
        let runtime = TestRuntime::new("/app")
            .with_file("node_modules/discord.js/index.js", "")
            .with_file("src/managers/bot.ts", "");

        let resolved = runtime
            .resolve("discord.js", Path::new("/app/src/managers/bot.ts"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/app/node_modules/discord.js/index.js"));
        assert!(runtime.resolve("missing", Path::new("/app/src/a.ts")).is_err());
    }
}
