//! Generated modules: the manifests, the commands bundle and the entry.
//!
//! Every artifact is assembled as source text, parsed back into an arena with
//! [`ProgramBuilder`] and printed, so malformed output is caught here rather
//! than at bot start-up. Entries are sorted by module path, then symbol name,
//! then endpoint or event type, which keeps the output identical across runs
//! regardless of the order files finished in.

use std::path::{Path, PathBuf};

use kiln_gen::{
    Allocator, GenError, ImportKind, ImportTable, ProgramBuilder, SourceType, string_literal,
    to_identifier,
};
use kiln_graph::{ModuleRef, Symbol, SymbolGraph, SymbolId};

use crate::error::{CompileError, ErrorKind, Result};
use crate::layout::OutputLayout;

pub const DEPENDENCIES: &str = "dependencies";
pub const ROUTES: &str = "routes";
pub const EVENTS: &str = "events";
pub const COMMANDS: &str = "commands";
pub const ENTRY: &str = "index";

/// A file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub code: String,
}

/// A compiled command file, ready to be bundled.
#[derive(Debug, Clone)]
pub struct CommandModule {
    /// Registration name, e.g. `admin/ban`.
    pub name: String,
    /// Transformed file body; ends in `return <command>`.
    pub body: String,
}

pub struct ManifestEmitter<'g> {
    graph: &'g SymbolGraph,
    layout: &'g OutputLayout,
    source_type: SourceType,
}

impl<'g> ManifestEmitter<'g> {
    pub fn new(graph: &'g SymbolGraph, layout: &'g OutputLayout, source_type: SourceType) -> Self {
        Self {
            graph,
            layout,
            source_type,
        }
    }

    /// All generated modules: three manifests, the bundle and the entry.
    pub fn emit_all(&self, commands: &[CommandModule], runtime_module: &str) -> Result<Vec<Artifact>> {
        Ok(vec![
            self.dependencies()?,
            self.routes()?,
            self.events()?,
            self.commands(commands)?,
            self.entry(runtime_module)?,
        ])
    }

    /// `[{ entity, dependencies }]`, one entry per injectable class.
    pub fn dependencies(&self) -> Result<Artifact> {
        let mut imports = ImportTable::new();
        let mut rows = Vec::new();

        let mut injectables = self.graph.injectables();
        injectables.sort_by_cached_key(|entry| self.sort_key(entry.symbol));
        for entry in &injectables {
            let entity = self.class_binding(&mut imports, entry.symbol)?;
            let dependencies = entry
                .dependencies
                .iter()
                .map(|dep| self.class_binding(&mut imports, *dep))
                .collect::<Result<Vec<_>>>()?;
            rows.push(format!(
                "{{ entity: {entity}, dependencies: [{}] }}",
                dependencies.join(", ")
            ));
        }

        self.artifact(DEPENDENCIES, &imports, &list_export(&rows))
    }

    /// `[{ endpoint, method, ipc, handler, entity }]`.
    pub fn routes(&self) -> Result<Artifact> {
        let mut imports = ImportTable::new();
        let mut routes = self.graph.routes();
        routes.sort_by_cached_key(|route| {
            (
                self.sort_key(route.symbol),
                route.endpoint.clone(),
                route.method,
                route.ipc,
                route.location.clone(),
            )
        });

        let mut rows = Vec::new();
        for route in &routes {
            let handler = self.handler_binding(&mut imports, route.symbol)?;
            rows.push(format!(
                "{{ endpoint: {}, method: {}, ipc: {}, {handler} }}",
                string_literal(&route.endpoint),
                string_literal(route.method.as_str()),
                route.ipc,
            ));
        }

        self.artifact(ROUTES, &imports, &list_export(&rows))
    }

    /// `[{ type, once, handler, entity }]`.
    pub fn events(&self) -> Result<Artifact> {
        let mut imports = ImportTable::new();
        let mut events = self.graph.events();
        events.sort_by_cached_key(|event| {
            (
                self.sort_key(event.symbol),
                event.event_type.clone(),
                event.location.clone(),
            )
        });

        let mut rows = Vec::new();
        for event in &events {
            let handler = self.handler_binding(&mut imports, event.symbol)?;
            rows.push(format!(
                "{{ type: {}, once: {}, {handler} }}",
                string_literal(&event.event_type),
                event.once,
            ));
        }

        self.artifact(EVENTS, &imports, &list_export(&rows))
    }

    /// A `Map` from command name to an async function running the command
    /// file's body and returning its default export.
    pub fn commands(&self, commands: &[CommandModule]) -> Result<Artifact> {
        let mut sorted: Vec<&CommandModule> = commands.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut body = String::from("const commands = new Map();\n");
        for command in sorted {
            body.push_str(&format!(
                "commands.set({}, async () => {{\n{}\n}});\n",
                string_literal(&command.name),
                command.body
            ));
        }
        body.push_str("export default commands;\n");

        self.artifact(COMMANDS, &ImportTable::new(), &body)
    }

    /// Imports the manifests and hands them to the runtime's `bootstrap`.
    pub fn entry(&self, runtime_module: &str) -> Result<Artifact> {
        let mut imports = ImportTable::new();
        let bootstrap = imports.import(
            runtime_module,
            ImportKind::Named(String::from("bootstrap")),
            "bootstrap",
        );
        let parts: Vec<String> = [DEPENDENCIES, ROUTES, EVENTS, COMMANDS]
            .into_iter()
            .map(|name| {
                let local = imports.import(&self.layout.artifact_specifier(name), ImportKind::Default, name);
                if local == name {
                    local
                } else {
                    format!("{name}: {local}")
                }
            })
            .collect();

        let body = format!(
            "export default await {bootstrap}({{ {} }});\n",
            parts.join(", ")
        );
        self.artifact(ENTRY, &imports, &body)
    }

    fn artifact(&self, name: &str, imports: &ImportTable, body: &str) -> Result<Artifact> {
        let allocator = Allocator::default();
        let mut builder = ProgramBuilder::with_source_type(&allocator, self.source_type);
        builder
            .push_source(&imports.render())
            .map_err(|err| generation_error(name, err))?;
        builder
            .push_source(body)
            .map_err(|err| generation_error(name, err))?;
        let code = builder
            .generate()
            .map_err(|err| generation_error(name, err))?;

        Ok(Artifact {
            path: self.layout.artifact_path(name),
            code,
        })
    }

    fn symbol(&self, id: SymbolId) -> Result<std::sync::Arc<Symbol>> {
        self.graph
            .symbol(id)
            .map_err(|err| CompileError::new(ErrorKind::Codegen, err.to_string()))
    }

    fn sort_key(&self, id: SymbolId) -> (Option<ModuleRef>, String) {
        match self.graph.symbol(id) {
            Ok(symbol) => (Some(symbol.module.clone()), symbol.name.clone()),
            Err(_) => (None, String::new()),
        }
    }

    /// Import the class `id` and return its local name.
    fn class_binding(&self, imports: &mut ImportTable, id: SymbolId) -> Result<String> {
        let symbol = self.symbol(id)?;
        let specifier = match &symbol.module {
            ModuleRef::File(path) => self.layout.specifier_for(path),
            ModuleRef::Package(specifier) | ModuleRef::Virtual(specifier) => specifier.clone(),
        };
        let preferred = if symbol.is_default_export() {
            default_import_name(&symbol.module)
        } else {
            symbol.name.clone()
        };
        Ok(imports.import(&specifier, ImportKind::for_export(&symbol.name), &preferred))
    }

    /// Import the class owning method `id` and render the `handler` and
    /// `entity` fields of its manifest row. Static handlers get `static: true`.
    fn handler_binding(&self, imports: &mut ImportTable, id: SymbolId) -> Result<String> {
        let method = self.symbol(id)?;
        let Some(class) = method.parent else {
            return Err(CompileError::new(
                ErrorKind::Codegen,
                format!("handler `{}` has no owning class", method.name),
            ));
        };
        let entity = self.class_binding(imports, class)?;
        let handler = string_literal(method.member_name());
        Ok(if method.is_static() {
            format!("handler: {handler}, static: true, entity: {entity}")
        } else {
            format!("handler: {handler}, entity: {entity}")
        })
    }
}

fn default_import_name(module: &ModuleRef) -> String {
    let stem = match module {
        ModuleRef::File(path) => file_stem(path),
        ModuleRef::Package(specifier) | ModuleRef::Virtual(specifier) => specifier
            .rsplit(['/', ':'])
            .next()
            .unwrap_or(specifier)
            .to_string(),
    };
    to_identifier(&stem)
}

fn file_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == "index" {
        if let Some(dir) = path.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

fn list_export(rows: &[String]) -> String {
    if rows.is_empty() {
        return String::from("export default [];\n");
    }
    format!("export default [\n  {},\n];\n", rows.join(",\n  "))
}

fn generation_error(artifact: &str, err: GenError) -> CompileError {
    CompileError::new(
        ErrorKind::Codegen,
        format!("failed to generate `{artifact}`: {err}"),
    )
}
