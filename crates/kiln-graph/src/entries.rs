//! Facts recorded by the decorator handlers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{SourceLocation, SymbolId};

/// How a source file is compiled, decided by its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// `commands/**`: merged into the commands bundle under stricter rules.
    Command,
    /// `managers/**`, `services/**` and every other module.
    Service,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("command"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// A source file that took part in the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModule {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// A class participating in dependency injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectableEntry {
    pub symbol: SymbolId,
    /// Constructor parameter types, in constructor argument order.
    pub dependencies: Vec<SymbolId>,
    pub location: SourceLocation,
}

/// An HTTP- or IPC-style route bound to a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// The decorated method.
    pub symbol: SymbolId,
    pub endpoint: String,
    pub method: HttpMethod,
    /// `true` for `@Api.*`, `false` for `@Http.*`.
    pub ipc: bool,
    pub location: SourceLocation,
}

/// An event handler method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    /// The decorated method.
    pub symbol: SymbolId,
    /// Event name, e.g. `messageCreate`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub once: bool,
    pub location: SourceLocation,
}

/// Verbs accepted by the `Http` and `Api` decorator namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Connect,
        HttpMethod::Options,
        HttpMethod::Trace,
        HttpMethod::Patch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Head => "head",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Connect => "connect",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
            HttpMethod::Patch => "patch",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| format!("unknown HTTP method: {s}"))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_methods_parse_lowercase_only() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("GET".parse::<HttpMethod>().is_err());
    }
}
