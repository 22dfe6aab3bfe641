//! CLI errors.
//!
//! Commands return [`CliError`]; [`report`] renders it on stderr through
//! miette. A failed build is rendered one diagnostic per compile error, each
//! with its code, location, source excerpt and help.

use std::path::PathBuf;

use kiln_compiler::BuildError;
use kiln_config::ConfigError;
use miette::Report;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("{} already exists\n\nHint: pass --force to overwrite it", .0.display())]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert an error into the reports to print, in order.
pub fn into_reports(err: CliError) -> Vec<Report> {
    match err {
        CliError::Build(build) => {
            let count = build.errors.len();
            let mut reports: Vec<Report> = build.errors.into_iter().map(Report::new).collect();
            if count > 1 {
                reports.push(miette::miette!("build failed with {count} errors"));
            }
            reports
        }
        CliError::Config(config) => vec![miette::miette!(
            code = "kiln::config",
            help = "check kiln.toml, the `kiln` field of package.json and KILN_* variables",
            "{config}"
        )],
        other => vec![miette::miette!("{other}")],
    }
}

/// Print `err` to stderr.
pub fn report(err: CliError) {
    for report in into_reports(err) {
        eprintln!("{report:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_compiler::{CompileError, ErrorKind};

    #[test]
    fn each_compile_error_is_its_own_report() {
        let build = BuildError {
            errors: vec![
                CompileError::new(ErrorKind::RouteExpected, "first"),
                CompileError::new(ErrorKind::EventName, "second"),
            ],
        };
        let reports = into_reports(build.into());
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].to_string(), "first");
        assert_eq!(
            reports[1].code().map(|code| code.to_string()).as_deref(),
            Some("kiln::event_name")
        );
    }

    #[test]
    fn a_single_error_has_no_summary() {
        let build = BuildError::single(CompileError::new(ErrorKind::Parse, "bad"));
        assert_eq!(into_reports(build.into()).len(), 1);
    }

    #[test]
    fn config_errors_carry_a_code() {
        let err = CliError::from(ConfigError::EmptyField {
            field: "runtime_module",
        });
        let reports = into_reports(err);
        assert_eq!(
            reports[0].code().map(|code| code.to_string()).as_deref(),
            Some("kiln::config")
        );
        assert!(reports[0].to_string().contains("runtime_module"));
    }
}
