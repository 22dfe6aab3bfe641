//! File-based config discovery
//!
//! Finds the project root and the file holding kiln's settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Where configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `kiln.toml` file
    Toml(PathBuf),
    /// The `kiln` field of a `package.json`
    PackageJson(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Toml(path) | Self::PackageJson(path) => path,
        }
    }
}

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let root = discovery.project_root();
/// let source = discovery.find();
/// ```
pub struct ConfigDiscovery {
    start: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(start: impl AsRef<Path>) -> Self {
        Self {
            start: start.as_ref().to_path_buf(),
        }
    }

    /// Nearest ancestor of the start directory (itself included) that holds a
    /// `kiln.toml` or a `package.json`; the start directory when none does.
    pub fn project_root(&self) -> PathBuf {
        self.start
            .ancestors()
            .find(|dir| dir.join("kiln.toml").is_file() || dir.join("package.json").is_file())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.start.clone())
    }

    /// Find the config source in the project root
    ///
    /// Searches in this order:
    /// 1. TOML config: kiln.toml
    /// 2. package.json (kiln field)
    pub fn find(&self) -> Option<ConfigSource> {
        Self::find_in(&self.project_root())
    }

    /// Look for a config source directly in `root`, without walking up.
    pub fn find_in(root: &Path) -> Option<ConfigSource> {
        let toml_path = root.join("kiln.toml");
        if toml_path.is_file() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let pkg_path = root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed: Value = serde_json::from_str(&content).ok()?;
        match parsed.get("kiln") {
            Some(value) if value.is_object() => Some(ConfigSource::PackageJson(pkg_path)),
            _ => None,
        }
    }
}
