//! File system and package resolution, behind a trait.
//!
//! The compiler reaches the outside world only through [`Runtime`]: reading
//! sources, writing artifacts, probing candidate files during import
//! resolution and looking up installed packages. Builds run against disk with
//! [`NativeRuntime`](native::NativeRuntime) and against a map in memory with
//! `TestRuntime` (feature `test-utils`).
//!
//! Reads and writes are async since whole batches of files move at once.
//! Probing and package lookup happen inside syntax-tree walks on blocking
//! workers, so those stay synchronous.

pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no such file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{0}")]
    Io(String),

    /// A bare specifier with no installed package behind it.
    #[error("cannot resolve package `{specifier}` from {}: {reason}", from.display())]
    ResolutionFailed {
        specifier: String,
        from: PathBuf,
        reason: String,
    },
}

#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Missing parent directories are created.
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Succeeds when `path` is already gone.
    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Entry file of the package `specifier` as seen from the file `from`.
    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf>;
}

/// Read a UTF-8 file.
pub async fn read_to_string(runtime: &dyn Runtime, path: &Path) -> RuntimeResult<String> {
    let bytes = runtime.read_file(path).await?;
    String::from_utf8(bytes)
        .map_err(|err| RuntimeError::Io(format!("{} is not UTF-8: {err}", path.display())))
}
