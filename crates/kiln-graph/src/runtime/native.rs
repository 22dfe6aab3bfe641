//! The real file system, with `oxc_resolver` for packages.

use async_trait::async_trait;
use oxc_resolver::{ResolveOptions, Resolver};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Disk-backed runtime. Relative paths are taken from the project root.
#[derive(Debug, Clone)]
pub struct NativeRuntime {
    root: PathBuf,
    packages: Arc<Resolver>,
}

impl NativeRuntime {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        // ESM conditions; bots are emitted as ES modules
        let options = ResolveOptions {
            condition_names: ["import", "module", "node", "default"]
                .map(String::from)
                .to_vec(),
            extensions: [".js", ".mjs", ".cjs", ".ts", ".d.ts", ".json"]
                .map(String::from)
                .to_vec(),
            ..ResolveOptions::default()
        };
        Self {
            root: root.into(),
            packages: Arc::new(Resolver::new(options)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn failed(verb: &str, path: &Path, err: io::Error) -> RuntimeError {
    match err.kind() {
        io::ErrorKind::NotFound => RuntimeError::FileNotFound(path.to_path_buf()),
        _ => RuntimeError::Io(format!("cannot {verb} {}: {err}", path.display())),
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.absolute(path);
        tokio::fs::read(&path).await.map_err(|err| failed("read", &path, err))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = self.absolute(path);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|err| failed("create", dir, err))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|err| failed("write", &path, err))
    }

    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        let path = self.absolute(path);
        match tokio::fs::remove_dir_all(&path).await {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(failed("remove", &path, err)),
            _ => Ok(()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.absolute(path).exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.absolute(path).is_file()
    }

    fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        let from = self.absolute(from);
        let dir = match from.parent() {
            Some(parent) if !from.is_dir() => parent,
            _ => from.as_path(),
        };
        match self.packages.resolve(dir, specifier) {
            Ok(resolution) => Ok(resolution.path().to_path_buf()),
            Err(err) => Err(RuntimeError::ResolutionFailed {
                specifier: specifier.to_owned(),
                from,
                reason: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, NativeRuntime) {
        let dir = TempDir::new().unwrap();
        let runtime = NativeRuntime::new(dir.path());
        (dir, runtime)
    }

    #[tokio::test]
    async fn artifacts_land_in_fresh_directories() {
        let (dir, runtime) = project();
        let artifact = dir.path().join(".kiln/managers/db.js");

        runtime.write_file(&artifact, b"export {};").await.unwrap();

        assert!(runtime.is_file(&artifact));
        assert_eq!(runtime.read_file(&artifact).await.unwrap(), b"export {};");
    }

    #[tokio::test]
    async fn relative_paths_start_at_the_root() {
        let (dir, runtime) = project();
        runtime
            .write_file(Path::new("src/bot.ts"), b"@Injectable class Bot {}")
            .await
            .unwrap();
        assert!(dir.path().join("src/bot.ts").is_file());
        assert!(runtime.exists(Path::new("src")));
    }

    #[tokio::test]
    async fn reading_a_missing_source() {
        let (dir, runtime) = project();
        let err = runtime.read_file(&dir.path().join("nope.ts")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn cleaning_an_absent_output_dir() {
        let (dir, runtime) = project();
        runtime.remove_dir_all(&dir.path().join(".kiln")).await.unwrap();
    }

    #[test]
    fn installed_packages_resolve_to_their_entry() {
        let (dir, runtime) = project();
        let package = dir.path().join("node_modules/discord.js");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(
            package.join("package.json"),
            r#"{"name":"discord.js","main":"index.js"}"#,
        )
        .unwrap();
        std::fs::write(package.join("index.js"), "export class Client {}").unwrap();
        std::fs::write(dir.path().join("bot.ts"), "").unwrap();

        let entry = runtime.resolve("discord.js", &dir.path().join("bot.ts")).unwrap();
        assert!(entry.ends_with("node_modules/discord.js/index.js"));

        let err = runtime.resolve("left-pad", &dir.path().join("bot.ts")).unwrap_err();
        assert!(matches!(err, RuntimeError::ResolutionFailed { .. }));
    }
}
