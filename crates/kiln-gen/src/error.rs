use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum GenError {
    /// Parsing gave up, or recovery was not allowed.
    #[error("cannot parse {path}: {message}")]
    #[diagnostic(code(kiln::gen::parse_failed))]
    ParseFailed { path: String, message: String },

    /// The compiler produced code that does not parse.
    #[error("generated code does not parse: {message}\n{snippet}")]
    #[diagnostic(
        code(kiln::gen::invalid_snippet),
        help("this is a bug in kiln; please report it with the snippet above")
    )]
    InvalidSnippet { snippet: String, message: String },
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
