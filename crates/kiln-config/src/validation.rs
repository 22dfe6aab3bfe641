//! Config validation
//!
//! Separates pure checks from checks that touch the filesystem.

use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};

impl KilnConfig {
    /// Check the configuration without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.runtime_module.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "runtime_module",
            });
        }
        if self.command_dirs.iter().any(|dir| dir.trim().is_empty()) {
            return Err(ConfigError::EmptyField {
                field: "command_dirs",
            });
        }
        if self.virtual_prefixes.iter().any(|prefix| prefix.is_empty()) {
            return Err(ConfigError::EmptyField {
                field: "virtual_prefixes",
            });
        }

        let src = self.source_root();
        let out = self.output_root();
        // Writing over (or above) the sources would feed artifacts back into the next build.
        if src.starts_with(&out) {
            return Err(ConfigError::OutputOverlapsSource {
                out_dir: out,
                src_dir: src,
            });
        }

        Ok(())
    }

    /// [`validate`](Self::validate) plus checks against the real filesystem.
    pub fn validate_fs(&self) -> Result<()> {
        self.validate()?;

        let src = self.source_root();
        if !src.is_dir() {
            return Err(ConfigError::SourceDirNotFound(src));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        KilnConfig::for_root("/app").validate().unwrap();
    }

    #[test]
    fn out_dir_equal_to_src_is_rejected() {
        let mut config = KilnConfig::for_root("/app");
        config.out_dir = PathBuf::from("src");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutputOverlapsSource { .. })
        ));
    }

    #[test]
    fn out_dir_containing_src_is_rejected() {
        let mut config = KilnConfig::for_root("/app");
        config.out_dir = PathBuf::from(".");
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_runtime_module_is_rejected() {
        let mut config = KilnConfig::for_root("/app");
        config.runtime_module = String::from("  ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyField {
                field: "runtime_module"
            })
        ));
    }

    #[test]
    fn missing_src_dir() {
        let dir = TempDir::new().unwrap();
        let config = KilnConfig::for_root(dir.path());
        assert!(matches!(
            config.validate_fs(),
            Err(ConfigError::SourceDirNotFound(_))
        ));

        std::fs::create_dir(dir.path().join("src")).unwrap();
        config.validate_fs().unwrap();
    }
}
