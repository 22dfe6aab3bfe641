//! Deduplicated import declarations for generated modules.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::literal::{is_identifier, string_literal, to_identifier};

/// What a generated import binds from its module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import X from "m"`
    Default,
    /// `import { name as X } from "m"`
    Named(String),
    /// `import * as X from "m"`
    Namespace,
}

impl ImportKind {
    /// Map an export name to the import that binds it (`default` is the
    /// default export).
    pub fn for_export(name: &str) -> Self {
        if name == "default" {
            Self::Default
        } else {
            Self::Named(name.to_string())
        }
    }
}

/// Collects imports for a generated module.
///
/// Importing the same `(specifier, kind)` twice returns the first alias, so a
/// class referenced by several manifest entries is imported once. Aliases
/// never collide with each other or with names passed to [`reserve`].
///
/// [`reserve`]: ImportTable::reserve
#[derive(Debug, Default)]
pub struct ImportTable {
    modules: IndexMap<String, IndexMap<ImportKind, String>>,
    taken: FxHashSet<String>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` free for the module's own declarations.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Import `kind` from `specifier` and return the local name bound to it.
    pub fn import(&mut self, specifier: &str, kind: ImportKind, preferred_local: &str) -> String {
        if let Some(alias) = self
            .modules
            .get(specifier)
            .and_then(|bindings| bindings.get(&kind))
        {
            return alias.clone();
        }

        let alias = self.fresh_alias(preferred_local);
        self.modules
            .entry(specifier.to_string())
            .or_default()
            .insert(kind, alias.clone());
        alias
    }

    fn fresh_alias(&mut self, preferred: &str) -> String {
        let base = if is_identifier(preferred) {
            preferred.to_string()
        } else {
            to_identifier(preferred)
        };

        let mut alias = base.clone();
        let mut n = 2;
        while self.taken.contains(&alias) {
            alias = format!("{base}{n}");
            n += 1;
        }
        self.taken.insert(alias.clone());
        alias
    }

    /// Number of distinct modules imported.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Render one declaration per module (plus one per namespace binding), in
    /// first-use order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (specifier, bindings) in &self.modules {
            let from = string_literal(specifier);
            let mut default = None;
            let mut named = Vec::new();

            for (kind, alias) in bindings {
                match kind {
                    ImportKind::Default => default = Some(alias.as_str()),
                    ImportKind::Named(name) if name == alias => named.push(alias.clone()),
                    ImportKind::Named(name) => {
                        let imported = if is_identifier(name) {
                            name.clone()
                        } else {
                            string_literal(name)
                        };
                        named.push(format!("{imported} as {alias}"));
                    }
                    ImportKind::Namespace => {
                        out.push_str(&format!("import * as {alias} from {from};\n"));
                    }
                }
            }

            let mut clause = Vec::new();
            if let Some(default) = default {
                clause.push(default.to_string());
            }
            if !named.is_empty() {
                clause.push(format!("{{ {} }}", named.join(", ")));
            }
            if !clause.is_empty() {
                out.push_str(&format!("import {} from {from};\n", clause.join(", ")));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_binding_is_imported_once() {
        let mut table = ImportTable::new();
        let a = table.import("./users.js", ImportKind::Default, "Users");
        let b = table.import("./users.js", ImportKind::Default, "Users");
        assert_eq!(a, b);
        assert_eq!(table.render().matches("import").count(), 1);
    }

    #[test]
    fn colliding_names_get_suffixes() {
        let mut table = ImportTable::new();
        table.reserve("routes");
        let a = table.import("./a.js", ImportKind::for_export("Store"), "Store");
        let b = table.import("./b.js", ImportKind::for_export("Store"), "Store");
        let c = table.import("./c.js", ImportKind::Default, "routes");
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("Store", "Store2", "routes2"));

        let code = table.render();
        assert!(code.contains("import { Store } from \"./a.js\";"));
        assert!(code.contains("import { Store as Store2 } from \"./b.js\";"));
        assert!(code.contains("import routes2 from \"./c.js\";"));
    }

    #[test]
    fn default_and_named_share_a_declaration() {
        let mut table = ImportTable::new();
        table.import("discord.js", ImportKind::Default, "Discord");
        table.import("discord.js", ImportKind::Named("Client".into()), "Client");
        table.import("discord.js", ImportKind::Namespace, "djs");

        let code = table.render();
        assert!(code.contains("import Discord, { Client } from \"discord.js\";"));
        assert!(code.contains("import * as djs from \"discord.js\";"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn invalid_preferred_names_are_sanitized() {
        let mut table = ImportTable::new();
        let alias = table.import("./x.js", ImportKind::Default, "default");
        assert_eq!(alias, "Default");
    }
}
