//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidValue(String),

    #[error("source directory not found: {}", .0.display())]
    SourceDirNotFound(PathBuf),

    #[error("output directory {} overlaps the source directory {}", .out_dir.display(), .src_dir.display())]
    OutputOverlapsSource { out_dir: PathBuf, src_dir: PathBuf },

    #[error("'{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
