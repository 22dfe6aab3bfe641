//! Compile errors and warnings.
//!
//! Every fatal condition the pipeline can hit is a [`CompileError`] with a
//! stable code (`kiln::route_expected`, `kiln::command::class`, ...), a
//! category, and, whenever the error points at user code, a 1-based source
//! location plus the source excerpt for miette to render.

use std::fmt;
use std::path::Path;

use kiln_graph::SourceLocation;
use miette::{Diagnostic, LabeledSpan, NamedSource, Severity, SourceSpan};

/// Result type for compile operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Broad classes of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A decorator on the wrong kind of declaration.
    Placement,
    /// A decorator or declaration with the wrong syntactic shape.
    SyntaxShape,
    /// An import, type reference or workspace root that cannot be resolved.
    Resolution,
    /// A construct command files may not use.
    CommandPolicy,
    /// Source that does not parse.
    Parse,
    /// Facts that contradict each other across files.
    Consistency,
    Io,
}

/// The specific failure, one per diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Placement,
    ClassNotTopLevel,
    ClassNameExpected,
    HandlerNameExpected,
    RouteExpected,
    RoutePathStringExpected,
    EventName,
    ComputedDecorator,
    DecoratorShape,
    IncompleteDecorator,
    UnknownDecoratorMember,
    ParameterNotInjectable,
    TypeAnnotationExpected,
    TypeReferenceExpected,
    ImportExpected,
    UnresolvedImport,
    WorkspaceRootNotFound,
    CommandClass,
    CommandEnum,
    CommandExportSpecifiers,
    CommandExportAll,
    CommandDefaultExpected,
    Parse,
    Codegen,
    DuplicateRoute,
    DuplicateDecoration,
    Io,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Placement => "kiln::placement",
            Self::ClassNotTopLevel => "kiln::class_not_top_level",
            Self::ClassNameExpected => "kiln::class_name_expected",
            Self::HandlerNameExpected => "kiln::handler_name_expected",
            Self::RouteExpected => "kiln::route_expected",
            Self::RoutePathStringExpected => "kiln::route_path_string_expected",
            Self::EventName => "kiln::event_name",
            Self::ComputedDecorator => "kiln::decorator::computed",
            Self::DecoratorShape => "kiln::decorator::shape",
            Self::IncompleteDecorator => "kiln::decorator::incomplete",
            Self::UnknownDecoratorMember => "kiln::decorator::unknown_member",
            Self::ParameterNotInjectable => "kiln::inject::parameter",
            Self::TypeAnnotationExpected => "kiln::inject::type_annotation",
            Self::TypeReferenceExpected => "kiln::inject::type_reference",
            Self::ImportExpected => "kiln::inject::import_expected",
            Self::UnresolvedImport => "kiln::resolve::unresolved",
            Self::WorkspaceRootNotFound => "kiln::resolve::workspace_root",
            Self::CommandClass => "kiln::command::class",
            Self::CommandEnum => "kiln::command::enum",
            Self::CommandExportSpecifiers => "kiln::command::export_specifiers",
            Self::CommandExportAll => "kiln::command::export_all",
            Self::CommandDefaultExpected => "kiln::command::default_expected",
            Self::Parse => "kiln::parse",
            Self::Codegen => "kiln::codegen",
            Self::DuplicateRoute => "kiln::route::duplicate",
            Self::DuplicateDecoration => "kiln::duplicate_decoration",
            Self::Io => "kiln::io",
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            Self::Placement | Self::ClassNotTopLevel => ErrorCategory::Placement,
            Self::ClassNameExpected
            | Self::HandlerNameExpected
            | Self::RouteExpected
            | Self::RoutePathStringExpected
            | Self::EventName
            | Self::ComputedDecorator
            | Self::DecoratorShape
            | Self::IncompleteDecorator
            | Self::UnknownDecoratorMember
            | Self::ParameterNotInjectable
            | Self::TypeAnnotationExpected
            | Self::TypeReferenceExpected => ErrorCategory::SyntaxShape,
            Self::ImportExpected | Self::UnresolvedImport | Self::WorkspaceRootNotFound => {
                ErrorCategory::Resolution
            }
            Self::CommandClass
            | Self::CommandEnum
            | Self::CommandExportSpecifiers
            | Self::CommandExportAll
            | Self::CommandDefaultExpected => ErrorCategory::CommandPolicy,
            Self::Parse | Self::Codegen => ErrorCategory::Parse,
            Self::DuplicateRoute | Self::DuplicateDecoration => ErrorCategory::Consistency,
            Self::Io => ErrorCategory::Io,
        }
    }
}

#[derive(Debug)]
struct Excerpt {
    source: NamedSource<String>,
    span: SourceSpan,
}

/// A fatal, located compile error.
#[derive(Debug)]
pub struct CompileError {
    kind: ErrorKind,
    message: String,
    location: Option<SourceLocation>,
    help: Option<String>,
    related: Vec<SourceLocation>,
    excerpt: Option<Excerpt>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            help: None,
            related: Vec::new(),
            excerpt: None,
        }
    }

    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Io, format!("{}: {err}", path.display()))
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Another place involved in the error (the first of two duplicates).
    pub fn with_related(mut self, location: SourceLocation) -> Self {
        self.related.push(location);
        self
    }

    /// Attach the source text so the report can underline `offset..offset + len`.
    pub fn with_excerpt(mut self, path: &Path, source: &str, offset: u32, len: u32) -> Self {
        self.excerpt = Some(Excerpt {
            source: NamedSource::new(path.display().to_string(), source.to_string()),
            span: SourceSpan::new((offset as usize).into(), len as usize),
        });
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    pub fn related(&self) -> &[SourceLocation] {
        &self.related
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for CompileError {}

impl Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.excerpt
            .as_ref()
            .map(|excerpt| &excerpt.source as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let excerpt = self.excerpt.as_ref()?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(String::from("here")),
            excerpt.span,
        ))))
    }
}

/// A non-fatal finding reported alongside a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Warning {
    pub fn new(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A failed build: exactly one error in fail-fast mode, all of them with
/// `keep_going`.
#[derive(Debug, thiserror::Error)]
#[error("build failed with {} error{}", errors.len(), if errors.len() == 1 { "" } else { "s" })]
pub struct BuildError {
    pub errors: Vec<CompileError>,
}

impl BuildError {
    pub fn single(error: CompileError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<CompileError> for BuildError {
    fn from(error: CompileError) -> Self {
        Self::single(error)
    }
}

impl Diagnostic for BuildError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("kiln::build"))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        Some(Box::new(
            self.errors.iter().map(|error| error as &dyn Diagnostic),
        ))
    }
}
