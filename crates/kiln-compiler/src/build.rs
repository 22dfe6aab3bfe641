//! Build orchestration.
//!
//! A build reads every source file concurrently, compiles each one on a
//! blocking worker (the syntax-tree walk is CPU-bound and synchronous), checks
//! the collected facts for conflicts, and only then generates and writes the
//! output. A failed build writes nothing.

use std::path::PathBuf;
use std::sync::Arc;

use kiln_config::{EmitTarget, KilnConfig};
use kiln_gen::SourceType;
use kiln_graph::{FileKind, GraphStatistics, Runtime, SymbolGraph};
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::bus::ObserverBus;
use crate::compile::{CompiledFile, SourceFile, compile_source};
use crate::consistency::check_graph;
use crate::context::CompileEnv;
use crate::decorators::DecoratorTable;
use crate::discovery::discover_sources;
use crate::emit::{Artifact, CommandModule, ManifestEmitter};
use crate::error::{BuildError, CompileError, ErrorKind, Warning};
use crate::layout::OutputLayout;
use crate::resolver::ImportResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Write,
    Check,
}

/// What a successful build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Source files compiled.
    pub modules: usize,
    pub commands: usize,
    pub injectables: usize,
    pub routes: usize,
    pub events: usize,
    pub statistics: GraphStatistics,
    pub warnings: Vec<Warning>,
    /// Files written, in write order. Empty for checks.
    pub written: Vec<PathBuf>,
}

pub struct Compiler {
    runtime: Arc<dyn Runtime>,
    config: KilnConfig,
    table: Arc<DecoratorTable>,
}

impl Compiler {
    pub fn new(runtime: Arc<dyn Runtime>, config: KilnConfig) -> Self {
        Self {
            runtime,
            config,
            table: Arc::new(DecoratorTable::standard()),
        }
    }

    /// Replace the decorator table, e.g. to add project-specific decorators.
    pub fn with_table(mut self, table: DecoratorTable) -> Self {
        self.table = Arc::new(table);
        self
    }

    pub fn config(&self) -> &KilnConfig {
        &self.config
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::from_config(&self.config)
    }

    /// Discover the project's sources on disk and build them.
    pub async fn build_project(&self) -> Result<BuildReport, BuildError> {
        let sources = discover_sources(&self.layout())?;
        self.build(sources).await
    }

    /// Discover and analyze without writing anything, reporting every error.
    pub async fn check_project(&self) -> Result<BuildReport, BuildError> {
        let sources = discover_sources(&self.layout())?;
        self.check(sources).await
    }

    /// Compile `sources` and write the output.
    pub async fn build(&self, sources: Vec<SourceFile>) -> Result<BuildReport, BuildError> {
        self.run(sources, Mode::Write).await
    }

    /// Compile `sources` without writing; keeps going after errors.
    pub async fn check(&self, sources: Vec<SourceFile>) -> Result<BuildReport, BuildError> {
        self.run(sources, Mode::Check).await
    }

    async fn run(&self, sources: Vec<SourceFile>, mode: Mode) -> Result<BuildReport, BuildError> {
        let span = tracing::info_span!(
            "build",
            root = %self.config.root.display(),
            files = sources.len(),
            check = mode == Mode::Check,
        );
        self.run_inner(sources, mode).instrument(span).await
    }

    async fn run_inner(
        &self,
        sources: Vec<SourceFile>,
        mode: Mode,
    ) -> Result<BuildReport, BuildError> {
        let keep_going = mode == Mode::Check || self.config.keep_going;
        let graph = Arc::new(SymbolGraph::new());
        let resolver = Arc::new(ImportResolver::from_config(self.runtime.clone(), &self.config).await?);
        let layout = Arc::new(self.layout());
        let bus = Arc::new(ObserverBus::standard(self.table.clone()));
        let emit = self.config.emit;

        for source in &sources {
            graph.add_module(&source.path, source.kind);
        }

        let mut tasks = JoinSet::new();
        for source in sources {
            let runtime = self.runtime.clone();
            let graph = graph.clone();
            let resolver = resolver.clone();
            let layout = layout.clone();
            let bus = bus.clone();
            tasks.spawn(async move {
                let text =
                    match kiln_graph::runtime::read_to_string(runtime.as_ref(), &source.path).await {
                        Ok(text) => text,
                        Err(err) => return Err(vec![CompileError::io(&source.path, err)]),
                    };
                let compiled = tokio::task::spawn_blocking(move || {
                    let env = CompileEnv {
                        graph: &graph,
                        resolver: &resolver,
                        layout: &layout,
                        bus: &bus,
                        emit,
                    };
                    compile_source(&env, &source, &text)
                })
                .await;
                match compiled {
                    Ok(result) => result,
                    Err(err) => Err(vec![CompileError::new(
                        ErrorKind::Io,
                        format!("compile worker failed: {err}"),
                    )]),
                }
            });
        }

        let mut compiled: Vec<CompiledFile> = Vec::new();
        let mut errors: Vec<CompileError> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(file)) => compiled.push(file),
                Ok(Err(file_errors)) => {
                    errors.extend(file_errors);
                    if !keep_going {
                        tasks.abort_all();
                        break;
                    }
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => errors.push(CompileError::new(
                    ErrorKind::Io,
                    format!("compile task failed: {err}"),
                )),
            }
        }
        if !errors.is_empty() {
            return Err(failure(errors, keep_going));
        }

        let mut warnings: Vec<Warning> = compiled
            .iter()
            .flat_map(|file| file.warnings.iter().cloned())
            .collect();
        match check_graph(&graph) {
            Ok(found) => warnings.extend(found),
            Err(errors) => return Err(failure(errors, keep_going)),
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        compiled.sort_by(|a, b| a.path.cmp(&b.path));
        let source_type = match emit {
            EmitTarget::Js => SourceType::mjs(),
            EmitTarget::Ts => SourceType::ts(),
        };

        let mut artifacts = Vec::new();
        let mut commands = Vec::new();
        for file in compiled.iter() {
            match file.kind {
                FileKind::Service => artifacts.push(Artifact {
                    path: layout.emitted_path(&file.path),
                    code: file.code.clone(),
                }),
                FileKind::Command => commands.push(CommandModule {
                    name: layout
                        .command_name(&file.path)
                        .unwrap_or_else(|| file.path.display().to_string()),
                    body: file.code.clone(),
                }),
            }
        }
        let emitter = ManifestEmitter::new(&graph, &layout, source_type);
        artifacts.extend(
            emitter
                .emit_all(&commands, &self.config.runtime_module)
                .map_err(BuildError::single)?,
        );

        let statistics = graph.statistics();
        let mut report = BuildReport {
            modules: compiled.len(),
            commands: commands.len(),
            injectables: graph.injectables().len(),
            routes: graph.routes().len(),
            events: graph.events().len(),
            statistics,
            warnings,
            written: Vec::new(),
        };

        if mode == Mode::Write {
            report.written = self.write(&artifacts, &layout).await?;
        }

        tracing::info!(
            modules = report.modules,
            commands = report.commands,
            injectables = report.injectables,
            routes = report.routes,
            events = report.events,
            written = report.written.len(),
            "build finished"
        );
        Ok(report)
    }

    async fn write(&self, artifacts: &[Artifact], layout: &OutputLayout) -> Result<Vec<PathBuf>, BuildError> {
        if self.config.clean && self.runtime.exists(layout.out_dir()) {
            tracing::debug!(dir = %layout.out_dir().display(), "cleaning output directory");
            self.runtime
                .remove_dir_all(layout.out_dir())
                .await
                .map_err(|err| CompileError::io(layout.out_dir(), err))?;
        }

        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            self.runtime
                .write_file(&artifact.path, artifact.code.as_bytes())
                .await
                .map_err(|err| CompileError::io(&artifact.path, err))?;
            tracing::trace!(path = %artifact.path.display(), "wrote");
            written.push(artifact.path.clone());
        }
        Ok(written)
    }
}

/// Errors sorted by location; only the first unless `keep_going`.
fn failure(mut errors: Vec<CompileError>, keep_going: bool) -> BuildError {
    errors.sort_by(|a, b| a.location().cmp(&b.location()));
    if !keep_going {
        errors.truncate(1);
    }
    BuildError { errors }
}
