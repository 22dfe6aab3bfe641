//! Symbols: deduplicated handles for traceable declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModuleRef;

/// Handle of a symbol inside one [`SymbolGraph`](crate::SymbolGraph).
///
/// Two handles are equal exactly when they name the same `(module, name)`
/// pair, which is what later phases rely on to deduplicate imports and compare
/// dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(u32);

impl SymbolId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Position of the symbol in its graph's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Syntactic category of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A class, referenced by the name its module exports it under.
    Class,
    /// A method, owned by a class symbol.
    Method,
    /// A `static` method, named `Class::member` so it never shares a symbol
    /// with an instance method of the same name.
    StaticMethod,
}

/// One traceable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Handle of this symbol in the graph that created it.
    pub id: SymbolId,
    /// Declared name. Classes use their export name (`default` for default
    /// exports); methods use `Class.method` and static methods
    /// `Class::method`.
    pub name: String,
    /// Module that owns the declaration.
    pub module: ModuleRef,
    pub kind: SymbolKind,
    /// Enclosing symbol, e.g. a method's class.
    pub parent: Option<SymbolId>,
}

impl Symbol {
    /// Whether the owning module exports this symbol as its default export.
    pub fn is_default_export(&self) -> bool {
        self.kind == SymbolKind::Class && self.name == "default"
    }

    /// The member part of a method symbol's name (`OnReady` for `Bot.OnReady`).
    ///
    /// Class names are identifiers, so the first separator ends the class
    /// part even when the member is a string key like `"a.b"`.
    pub fn member_name(&self) -> &str {
        let split = match self.kind {
            SymbolKind::Method => self.name.split_once('.'),
            SymbolKind::StaticMethod => self.name.split_once("::"),
            SymbolKind::Class => None,
        };
        split.map_or(self.name.as_str(), |(_, member)| member)
    }

    pub fn is_static(&self) -> bool {
        self.kind == SymbolKind::StaticMethod
    }
}
