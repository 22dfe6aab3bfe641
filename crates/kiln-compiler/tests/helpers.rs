//! Shared test utilities for kiln-compiler tests
//!
//! Projects live in an in-memory [`TestRuntime`] rooted at `/app`, so every
//! test can lay out a small bot, build it and read back the artifacts without
//! touching the disk.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use kiln_compiler::discovery::is_source;
use kiln_compiler::{BuildError, BuildReport, Compiler, ErrorKind, OutputLayout, SourceFile};
use kiln_config::KilnConfig;
use kiln_graph::TestRuntime;

pub const ROOT: &str = "/app";

pub struct Project {
    pub runtime: TestRuntime,
    pub config: KilnConfig,
}

impl Project {
    /// An empty bot with a `package.json`, so package imports can resolve.
    pub fn new() -> Self {
        Self {
            runtime: TestRuntime::new(ROOT).with_file("package.json", "{}"),
            config: KilnConfig::for_root(ROOT),
        }
    }

    /// Add a file; paths are relative to the project root.
    pub fn file(self, path: &str, content: &str) -> Self {
        self.runtime.insert(path, content);
        self
    }

    /// Add a file below `src/`.
    pub fn src(self, path: &str, content: &str) -> Self {
        self.file(&format!("src/{path}"), content)
    }

    pub fn configure(mut self, f: impl FnOnce(&mut KilnConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::from_config(&self.config)
    }

    /// Source files below `src/`, classified the way discovery would.
    pub fn sources(&self) -> Vec<SourceFile> {
        let layout = self.layout();
        self.runtime
            .files_under(layout.src_dir())
            .into_iter()
            .filter(|path| is_source(path))
            .map(|path| {
                let kind = layout.classify(&path);
                SourceFile::new(path, kind)
            })
            .collect()
    }

    pub fn compiler(&self) -> Compiler {
        Compiler::new(Arc::new(self.runtime.clone()), self.config.clone())
    }

    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        self.compiler().build(self.sources()).await
    }

    pub async fn check(&self) -> Result<BuildReport, BuildError> {
        self.compiler().check(self.sources()).await
    }

    /// Build and expect failure; returns the error kinds in report order.
    pub async fn build_errors(&self) -> Vec<ErrorKind> {
        match self.build().await {
            Ok(_) => panic!("expected the build to fail"),
            Err(err) => err.errors.iter().map(|e| e.kind()).collect(),
        }
    }

    /// Text of an artifact below the output directory.
    pub fn output(&self, path: &str) -> String {
        let full = self.layout().out_dir().join(path);
        self.runtime
            .contents(&full)
            .unwrap_or_else(|| panic!("{} was not written", full.display()))
    }

    /// Everything written below the output directory.
    pub fn written(&self) -> Vec<PathBuf> {
        self.runtime.files_under(self.layout().out_dir())
    }
}

/// Drop whitespace and unify quotes so assertions do not depend on the
/// printer's formatting choices.
pub fn norm(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\'' { '"' } else { c })
        .collect()
}

/// Assert that `code` contains `expected`, ignoring formatting.
pub fn assert_contains(code: &str, expected: &str) {
    assert!(
        norm(code).contains(&norm(expected)),
        "expected output to contain `{expected}`\n--- output ---\n{code}"
    );
}

pub fn assert_not_contains(code: &str, unexpected: &str) {
    assert!(
        !norm(code).contains(&norm(unexpected)),
        "expected output NOT to contain `{unexpected}`\n--- output ---\n{code}"
    );
}
