//! Identity of the module that owns a symbol.

use std::fmt;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

/// The module a declaration lives in.
///
/// Project files are keyed by their cleaned absolute path. Declarations that
/// come from installed packages or framework-provided virtual modules are keyed
/// by the specifier they were imported with, because the generated manifests
/// import them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ModuleRef {
    /// A source file inside the project.
    File(PathBuf),
    /// A bare package specifier (`discord.js`, `@scope/pkg/sub`).
    Package(String),
    /// A framework-internal virtual module (`kiln:client`).
    Virtual(String),
}

impl ModuleRef {
    /// Create a file reference, normalizing `.` and `..` components.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf().clean())
    }

    /// Create a package reference.
    pub fn package(specifier: impl Into<String>) -> Self {
        Self::Package(specifier.into())
    }

    /// Create a virtual module reference.
    pub fn virtual_module(specifier: impl Into<String>) -> Self {
        Self::Virtual(specifier.into())
    }

    /// The file path, when this module is a project file.
    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }

    /// Whether this module is a project file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Package(specifier) | Self::Virtual(specifier) => f.write_str(specifier),
        }
    }
}
