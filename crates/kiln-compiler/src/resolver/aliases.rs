//! Path alias handling for module resolution.
//!
//! Aliases come from two places: `compilerOptions.paths` of the project's
//! tsconfig (TypeScript pattern semantics, `*` wildcard, read by
//! [`super::tsconfig`]) and the `aliases` table of the kiln configuration (a plain prefix, e.g. `"@db"` maps both
//! `@db` and `@db/models`).

use std::path::{Path, PathBuf};

use path_clean::PathClean;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// `"@config"`: only this exact specifier.
    Exact(String),
    /// `"@/*"`, `"~/*.js"`: prefix and suffix around one wildcard.
    Wildcard { prefix: String, suffix: String },
    /// A config alias: the key itself or the key followed by `/...`.
    Prefix(String),
}

impl Pattern {
    /// The text the alias replaces, or `None` when `specifier` does not match.
    fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match self {
            Self::Exact(exact) => (specifier == exact).then_some(""),
            Self::Wildcard { prefix, suffix } => {
                if specifier.len() < prefix.len() + suffix.len() {
                    return None;
                }
                specifier
                    .strip_prefix(prefix.as_str())?
                    .strip_suffix(suffix.as_str())
            }
            Self::Prefix(key) => {
                let rest = specifier.strip_prefix(key.as_str())?;
                if rest.is_empty() {
                    Some("")
                } else {
                    rest.strip_prefix('/')
                }
            }
        }
    }

    /// Specificity used to order candidates: longer literal prefixes first.
    fn weight(&self) -> (bool, usize) {
        match self {
            Self::Exact(exact) => (true, exact.len()),
            Self::Wildcard { prefix, .. } => (false, prefix.len()),
            Self::Prefix(key) => (false, key.len()),
        }
    }
}

#[derive(Debug, Clone)]
struct AliasEntry {
    pattern: Pattern,
    /// Absolute target paths; a `*` in them receives the captured text.
    targets: Vec<PathBuf>,
}

/// Ordered alias table.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tsconfig-style pattern; `targets` are resolved against `base`.
    pub fn insert_pattern(&mut self, pattern: &str, targets: &[String], base: &Path) {
        let pattern = match pattern.split_once('*') {
            Some((prefix, suffix)) => Pattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => Pattern::Exact(pattern.to_string()),
        };
        self.push(pattern, targets, base);
    }

    /// Add a config alias: `key` and everything below `key/` map to `target`.
    pub fn insert_prefix(&mut self, key: &str, target: &str, base: &Path) {
        if key.contains('*') {
            self.insert_pattern(key, &[target.to_string()], base);
            return;
        }
        let key = key.trim_end_matches('/');
        let target = format!("{}/*", target.trim_end_matches('/'));
        self.push(Pattern::Prefix(key.to_string()), &[target], base);
    }

    fn push(&mut self, pattern: Pattern, targets: &[String], base: &Path) {
        // A later definition of the same pattern replaces the earlier one.
        self.entries.retain(|entry| entry.pattern != pattern);
        self.entries.push(AliasEntry {
            pattern,
            targets: targets.iter().map(|t| base.join(t)).collect(),
        });
        self.entries
            .sort_by(|a, b| b.pattern.weight().cmp(&a.pattern.weight()));
    }

    /// Candidate paths for `specifier`, most specific alias first. Empty when
    /// no alias matches.
    pub fn candidates(&self, specifier: &str) -> Vec<PathBuf> {
        for entry in &self.entries {
            if let Some(captured) = entry.pattern.capture(specifier) {
                return entry
                    .targets
                    .iter()
                    .map(|target| {
                        let target = target.to_string_lossy();
                        let replaced = target.replacen('*', captured, 1);
                        PathBuf::from(replaced.trim_end_matches('/')).clean()
                    })
                    .collect();
            }
        }
        Vec::new()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_prefix_aliases() {
        let mut table = AliasTable::new();
        table.insert_prefix("@db", "src/services/db", Path::new("/app"));

        assert_eq!(
            table.candidates("@db"),
            vec![PathBuf::from("/app/src/services/db")]
        );
        assert_eq!(
            table.candidates("@db/models"),
            vec![PathBuf::from("/app/src/services/db/models")]
        );
        assert!(table.candidates("@dbx").is_empty());
    }
}
