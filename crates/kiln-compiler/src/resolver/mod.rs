//! Module resolution for import specifiers.
//!
//! Maps a specifier written in a source file to the module it names, so the
//! dependency analyzer can key injected types by their defining module and the
//! command transform can point rewritten imports at emitted files.
//!
//! Resolution order:
//! 1. virtual prefixes (`kiln:client`), never touching disk
//! 2. relative and absolute paths
//! 3. path aliases (tsconfig `paths` including inherited ones, then kiln
//!    `aliases`)
//! 4. bare packages, through the runtime's resolver
//!
//! Everything here is synchronous: it runs inside a syntax-tree walk on a
//! blocking worker.

mod aliases;
mod tsconfig;
mod workspace;

pub use aliases::AliasTable;
pub use tsconfig::{Tsconfig, load_tsconfig};
pub use workspace::find_workspace_root;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::KilnConfig;
use kiln_graph::{ModuleRef, Runtime};
use path_clean::PathClean;

use crate::error::{CompileError, ErrorKind};

/// Extensions tried, in order, for extensionless local specifiers.
pub const EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "js", "jsx", "mjs"];

/// What a specifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A file inside the project.
    File(PathBuf),
    /// An installed package, keyed by the specifier as written.
    Package { specifier: String, entry: PathBuf },
    /// A framework-provided module.
    Virtual(String),
}

impl Resolved {
    /// The graph key for declarations in this module.
    pub fn module_ref(&self) -> ModuleRef {
        match self {
            Self::File(path) => ModuleRef::file(path),
            Self::Package { specifier, .. } => ModuleRef::package(specifier.as_str()),
            Self::Virtual(specifier) => ModuleRef::virtual_module(specifier.as_str()),
        }
    }

    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("cannot find module '{specifier}' imported from {}", from.display())]
    NotFound { specifier: String, from: PathBuf },

    #[error("cannot resolve package '{specifier}' from {}: {reason}", from.display())]
    Package {
        specifier: String,
        from: PathBuf,
        reason: String,
    },

    #[error("no package.json found above {}; cannot resolve package '{specifier}'", from.display())]
    NoWorkspaceRoot { specifier: String, from: PathBuf },
}

impl From<ResolveError> for CompileError {
    fn from(err: ResolveError) -> Self {
        let kind = match err {
            ResolveError::NoWorkspaceRoot { .. } => ErrorKind::WorkspaceRootNotFound,
            _ => ErrorKind::UnresolvedImport,
        };
        CompileError::new(kind, err.to_string())
    }
}

/// Resolves import specifiers against the project layout.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    runtime: Arc<dyn Runtime>,
    aliases: AliasTable,
    virtual_prefixes: Vec<String>,
}

impl ImportResolver {
    pub fn new(runtime: Arc<dyn Runtime>, aliases: AliasTable, virtual_prefixes: Vec<String>) -> Self {
        Self {
            runtime,
            aliases,
            virtual_prefixes,
        }
    }

    /// Build the resolver for a project: the tsconfig `paths` (when the file
    /// exists, following `extends`) overlaid with the configured aliases.
    pub async fn from_config(
        runtime: Arc<dyn Runtime>,
        config: &KilnConfig,
    ) -> Result<Self, CompileError> {
        let tsconfig = config.tsconfig_path();
        let mut aliases = if runtime.is_file(&tsconfig) {
            load_tsconfig(runtime.as_ref(), &tsconfig).await?.aliases()
        } else {
            AliasTable::new()
        };

        for (key, target) in &config.aliases {
            aliases.insert_prefix(key, target, &config.root);
        }
        tracing::debug!(aliases = aliases.len(), "alias table ready");

        Ok(Self::new(runtime, aliases, config.virtual_prefixes.clone()))
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    pub fn is_virtual(&self, specifier: &str) -> bool {
        self.virtual_prefixes
            .iter()
            .any(|prefix| specifier.starts_with(prefix.as_str()))
    }

    /// Whether the specifier names a local file (relative, absolute or aliased),
    /// as opposed to a package or virtual module.
    pub fn is_local(&self, specifier: &str) -> bool {
        is_path_like(specifier) || !self.aliases.candidates(specifier).is_empty()
    }

    /// Resolve `specifier` as imported from the file `from`.
    pub fn resolve(&self, specifier: &str, from: &Path) -> Result<Resolved, ResolveError> {
        if self.is_virtual(specifier) {
            return Ok(Resolved::Virtual(specifier.to_string()));
        }

        if is_path_like(specifier) {
            let dir = from.parent().unwrap_or(Path::new("/"));
            let base = dir.join(specifier).clean();
            return self
                .try_local(&base)
                .map(Resolved::File)
                .ok_or_else(|| ResolveError::NotFound {
                    specifier: specifier.to_string(),
                    from: from.to_path_buf(),
                });
        }

        let candidates = self.aliases.candidates(specifier);
        if let Some(found) = candidates.iter().find_map(|c| self.try_local(c)) {
            return Ok(Resolved::File(found));
        }
        if !candidates.is_empty() {
            tracing::debug!(specifier, "alias matched but no file found, trying packages");
        }

        if self.workspace_root(from).is_none() {
            return Err(ResolveError::NoWorkspaceRoot {
                specifier: specifier.to_string(),
                from: from.to_path_buf(),
            });
        }

        self.runtime
            .resolve(specifier, from)
            .map(|entry| Resolved::Package {
                specifier: specifier.to_string(),
                entry,
            })
            .map_err(|e| ResolveError::Package {
                specifier: specifier.to_string(),
                from: from.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Nearest ancestor of `from` holding a `package.json`.
    pub fn workspace_root(&self, from: &Path) -> Option<PathBuf> {
        find_workspace_root(self.runtime.as_ref(), from)
    }

    fn try_local(&self, base: &Path) -> Option<PathBuf> {
        if self.runtime.is_file(base) {
            return Some(base.to_path_buf());
        }

        // `./db.js` written for a `db.ts` source (TypeScript ESM style)
        if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
            let alternatives: &[&str] = match ext {
                "js" => &["ts", "tsx"],
                "mjs" => &["mts"],
                "jsx" => &["tsx"],
                _ => &[],
            };
            for alt in alternatives {
                let candidate = base.with_extension(alt);
                if self.runtime.is_file(&candidate) {
                    return Some(candidate);
                }
            }
        }

        for ext in EXTENSIONS {
            let mut candidate = base.as_os_str().to_owned();
            candidate.push(".");
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            if self.runtime.is_file(&candidate) {
                return Some(candidate);
            }
        }

        EXTENSIONS
            .iter()
            .map(|ext| base.join(format!("index.{ext}")))
            .find(|index| self.runtime.is_file(index))
    }
}

fn is_path_like(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}
