//! `compilerOptions.paths` from a tsconfig and everything it `extends`.
//!
//! tsconfig files are JSON with comments and trailing commas, which is what a
//! JavaScript object literal accepts, so they are read with the same OXC
//! parser as the sources. Files are loaded through the [`Runtime`], like every
//! other read of the build.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use kiln_gen::{Allocator, ParseOptions, parse};
use kiln_graph::Runtime;
use kiln_graph::runtime::read_to_string;
use oxc_ast::ast::{Expression, ObjectPropertyKind, Statement};
use path_clean::PathClean;
use serde_json::{Map, Number, Value};

use super::AliasTable;
use crate::error::{CompileError, ErrorKind};

/// The alias-relevant options of one tsconfig, after inheritance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tsconfig {
    /// `extends` entries as written, in order.
    pub extends: Vec<String>,
    /// Absolute `baseUrl`.
    base_url: Option<PathBuf>,
    /// Patterns and targets, with the directory of the file declaring them.
    paths: Option<(Vec<(String, Vec<String>)>, PathBuf)>,
}

impl Tsconfig {
    /// Read one file's options; `dir` is the directory holding it.
    pub fn parse(text: &str, dir: &Path) -> Result<Self, String> {
        let value = parse_jsonc(text)?;

        let extends = match value.get("extends") {
            Some(Value::String(base)) => vec![base.clone()],
            Some(Value::Array(bases)) => bases
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        let options = value.get("compilerOptions");
        let base_url = options
            .and_then(|o| o.get("baseUrl"))
            .and_then(Value::as_str)
            .map(|base_url| dir.join(base_url).clean());
        let paths = options
            .and_then(|o| o.get("paths"))
            .and_then(Value::as_object)
            .map(|paths| {
                let entries = paths
                    .iter()
                    .map(|(pattern, targets)| {
                        let targets = targets
                            .as_array()
                            .map(|list| {
                                list.iter()
                                    .filter_map(Value::as_str)
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default();
                        (pattern.clone(), targets)
                    })
                    .collect();
                (entries, dir.to_path_buf())
            });

        Ok(Self {
            extends,
            base_url,
            paths,
        })
    }

    /// Take every option this file leaves unset from `base`. `paths` is
    /// inherited as a whole, never merged entry by entry.
    pub fn inherit(&mut self, base: Tsconfig) {
        if self.base_url.is_none() {
            self.base_url = base.base_url;
        }
        if self.paths.is_none() {
            self.paths = base.paths;
        }
    }

    /// Targets resolve against `baseUrl` when one is in effect, otherwise
    /// against the file that declared `paths`.
    pub fn aliases(&self) -> AliasTable {
        let mut table = AliasTable::new();
        let Some((entries, declared_in)) = &self.paths else {
            return table;
        };
        let base = self.base_url.as_deref().unwrap_or(declared_in);
        for (pattern, targets) in entries {
            if !targets.is_empty() {
                table.insert_pattern(pattern, targets, base);
            }
        }
        table
    }
}

/// Load `path` and resolve its `extends` chain.
pub async fn load_tsconfig(runtime: &dyn Runtime, path: &Path) -> Result<Tsconfig, CompileError> {
    load(runtime, path.to_path_buf(), Vec::new()).await
}

type Loading<'r> = Pin<Box<dyn Future<Output = Result<Tsconfig, CompileError>> + Send + 'r>>;

fn load(runtime: &dyn Runtime, path: PathBuf, mut chain: Vec<PathBuf>) -> Loading<'_> {
    Box::pin(async move {
        if chain.contains(&path) {
            return Err(invalid(&path, "`extends` refers back to this file"));
        }
        let text = read_to_string(runtime, &path)
            .await
            .map_err(|err| CompileError::io(&path, err))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut config = Tsconfig::parse(&text, &dir).map_err(|err| invalid(&path, err))?;
        chain.push(path.clone());

        // later entries of an `extends` array override earlier ones
        let mut inherited: Option<Tsconfig> = None;
        for specifier in &config.extends {
            let Some(base_path) = locate_base(runtime, specifier, &dir) else {
                return Err(invalid(
                    &path,
                    format!("cannot find `{specifier}` named in `extends`"),
                ));
            };
            let mut base = load(runtime, base_path, chain.clone()).await?;
            if let Some(earlier) = inherited.take() {
                base.inherit(earlier);
            }
            inherited = Some(base);
        }
        if let Some(base) = inherited {
            config.inherit(base);
        }
        tracing::trace!(tsconfig = %path.display(), "loaded tsconfig");
        Ok(config)
    })
}

/// `./base`, `./base.json`, `../configs/tsconfig.json`, or a package such as
/// `@tsconfig/node20/tsconfig.json` looked up in `node_modules` above `dir`.
fn locate_base(runtime: &dyn Runtime, specifier: &str, dir: &Path) -> Option<PathBuf> {
    let candidates = |path: PathBuf| -> Vec<PathBuf> {
        if path.extension().is_some_and(|ext| ext == "json") {
            return vec![path];
        }
        let mut with_extension = path.clone().into_os_string();
        with_extension.push(".json");
        vec![PathBuf::from(with_extension), path.join("tsconfig.json")]
    };

    let relative = specifier.starts_with('.') || Path::new(specifier).is_absolute();
    let mut found = if relative {
        candidates(dir.join(specifier).clean())
    } else {
        dir.ancestors()
            .flat_map(|ancestor| candidates(ancestor.join("node_modules").join(specifier)))
            .collect()
    };
    found.retain(|candidate| runtime.is_file(candidate));
    found.into_iter().next()
}

fn invalid(path: &Path, reason: impl std::fmt::Display) -> CompileError {
    CompileError::new(
        ErrorKind::Parse,
        format!("{}: invalid tsconfig: {reason}", path.display()),
    )
}

fn parse_jsonc(text: &str) -> Result<Value, String> {
    let allocator = Allocator::default();
    // the newline keeps a trailing `//` comment from swallowing the paren
    let source = format!("(\n{text}\n)");
    let parsed = parse(&allocator, "tsconfig.json", &source, &ParseOptions::default())
        .map_err(|err| err.to_string())?;
    match parsed.program.body.first() {
        Some(Statement::ExpressionStatement(statement)) => Ok(to_json(&statement.expression)),
        _ => Err(String::from("expected a JSON object")),
    }
}

/// Literal values only; anything else becomes `null`.
fn to_json(expression: &Expression<'_>) -> Value {
    match expression {
        Expression::ParenthesizedExpression(it) => to_json(&it.expression),
        Expression::ObjectExpression(object) => {
            let mut map = Map::new();
            for property in &object.properties {
                let ObjectPropertyKind::ObjectProperty(property) = property else {
                    continue;
                };
                if let Some(key) = property.key.static_name() {
                    map.insert(key.into_owned(), to_json(&property.value));
                }
            }
            Value::Object(map)
        }
        Expression::ArrayExpression(array) => Value::Array(
            array
                .elements
                .iter()
                .map(|element| element.as_expression().map_or(Value::Null, to_json))
                .collect(),
        ),
        Expression::StringLiteral(it) => Value::String(it.value.to_string()),
        Expression::NumericLiteral(it) => Number::from_f64(it.value).map_or(Value::Null, Value::Number),
        Expression::BooleanLiteral(it) => Value::Bool(it.value),
        _ => Value::Null,
    }
}
