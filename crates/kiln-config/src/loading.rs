use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};

use crate::config::{ConfigOverrides, KilnConfig};
use crate::discovery::{ConfigDiscovery, ConfigSource};
use crate::error::{ConfigError, Result};

impl KilnConfig {
    /// Load configuration for a build started in `cwd`.
    /// Priority: CLI overrides > environment variables > config file > defaults
    pub fn load(cwd: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let start = overrides
            .root
            .as_deref()
            .map(|root| absolutize(cwd, root))
            .unwrap_or_else(|| cwd.to_path_buf());

        let (root, source) = match &overrides.config_file {
            Some(file) => {
                let file = absolutize(cwd, file);
                if !file.is_file() {
                    return Err(ConfigError::NotFound(file));
                }
                let root = match &overrides.root {
                    Some(_) => start.clone(),
                    None => file.parent().map(Path::to_path_buf).unwrap_or(start.clone()),
                };
                let source = if file.file_name().is_some_and(|name| name == "package.json") {
                    ConfigSource::PackageJson(file)
                } else {
                    ConfigSource::Toml(file)
                };
                (root, Some(source))
            }
            None if overrides.root.is_some() => {
                let source = ConfigDiscovery::find_in(&start);
                (start.clone(), source)
            }
            None => {
                let discovery = ConfigDiscovery::new(&start);
                (discovery.project_root(), discovery.find())
            }
        };

        // The root was settled above; keep the override from re-relativizing it.
        let overrides = ConfigOverrides {
            root: overrides.root.as_ref().map(|_| root.clone()),
            ..overrides.clone()
        };

        let mut figment = Figment::new().merge(Serialized::defaults(KilnConfig::for_root(&root)));

        match &source {
            Some(ConfigSource::Toml(path)) => {
                tracing::debug!(path = %path.display(), "loading kiln.toml");
                figment = figment.merge(Toml::file(path));
            }
            Some(ConfigSource::PackageJson(path)) => {
                tracing::debug!(path = %path.display(), "loading package.json#kiln");
                figment = figment.merge(Figment::from(Json::file(path)).focus("kiln"));
            }
            None => tracing::debug!(root = %root.display(), "no config file, using defaults"),
        }

        // KILN_OUT_DIR, KILN_EMIT, ... (field names contain underscores, so no split)
        figment = figment.merge(Env::prefixed("KILN_"));
        figment = figment.merge(Serialized::defaults(&overrides));

        let mut config: KilnConfig = figment.extract()?;
        config.root = absolutize(&root, &config.root);
        Ok(config)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else if path == Path::new(".") {
        base.to_path_buf()
    } else {
        base.join(path)
    }
}
