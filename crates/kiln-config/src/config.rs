//! The configuration model.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Language of the emitted files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitTarget {
    /// Strip type annotations and write `.js` files.
    #[default]
    Js,
    /// Keep TypeScript syntax and write `.ts` files.
    Ts,
}

impl EmitTarget {
    /// File extension of emitted modules, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Ts => "ts",
        }
    }
}

impl fmt::Display for EmitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for EmitTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "js" => Ok(Self::Js),
            "ts" => Ok(Self::Ts),
            other => Err(ConfigError::InvalidValue(format!(
                "unknown emit target '{other}' (expected 'js' or 'ts')"
            ))),
        }
    }
}

/// Build configuration.
///
/// Relative paths are resolved against [`root`](Self::root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    /// Project root. Defaults to the nearest ancestor holding `kiln.toml` or
    /// `package.json`.
    pub root: PathBuf,
    /// Directory scanned for sources.
    pub src_dir: PathBuf,
    /// Directory receiving every artifact.
    pub out_dir: PathBuf,
    pub emit: EmitTarget,
    /// Module the generated entry imports `bootstrap` from.
    pub runtime_module: String,
    /// Specifier prefixes of framework-provided modules that never touch disk.
    pub virtual_prefixes: Vec<String>,
    /// tsconfig whose `compilerOptions.paths` feed the alias table.
    pub tsconfig: Option<PathBuf>,
    /// Extra path aliases, merged over the tsconfig ones.
    pub aliases: BTreeMap<String, String>,
    /// Directories under `src_dir` whose files are command files. Every other
    /// source file is a service/manager file.
    pub command_dirs: Vec<String>,
    /// Report every error instead of stopping at the first one.
    pub keep_going: bool,
    /// Remove `out_dir` before writing.
    pub clean: bool,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            src_dir: PathBuf::from("src"),
            out_dir: PathBuf::from(".kiln"),
            emit: EmitTarget::Js,
            runtime_module: String::from("@kiln/runtime"),
            virtual_prefixes: vec![String::from("kiln:")],
            tsconfig: None,
            aliases: BTreeMap::new(),
            command_dirs: vec![String::from("commands")],
            keep_going: false,
            clean: false,
        }
    }
}

impl KilnConfig {
    /// Default configuration rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    fn under_root(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Absolute source directory.
    pub fn source_root(&self) -> PathBuf {
        self.under_root(&self.src_dir)
    }

    /// Absolute output directory.
    pub fn output_root(&self) -> PathBuf {
        self.under_root(&self.out_dir)
    }

    /// Path of the tsconfig to read aliases from.
    pub fn tsconfig_path(&self) -> PathBuf {
        self.under_root(
            self.tsconfig
                .as_deref()
                .unwrap_or_else(|| Path::new("tsconfig.json")),
        )
    }

    /// Absolute command directories.
    pub fn command_roots(&self) -> Vec<PathBuf> {
        let src = self.source_root();
        self.command_dirs.iter().map(|dir| src.join(dir)).collect()
    }
}

/// Values given on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit: Option<EmitTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_going: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    /// Explicit config file; not a config key itself.
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}
