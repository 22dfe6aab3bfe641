//! Where sources live and where their output goes.

use std::path::{Component, Path, PathBuf};

use kiln_config::KilnConfig;
use kiln_graph::FileKind;
use path_clean::PathClean;

/// Maps source paths to emitted paths and import specifiers.
///
/// Manifests, the commands bundle and the entry module all sit directly in
/// the output directory, so every specifier they use is relative to it.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    src_dir: PathBuf,
    out_dir: PathBuf,
    extension: &'static str,
    command_roots: Vec<PathBuf>,
}

impl OutputLayout {
    pub fn new(
        src_dir: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
        extension: &'static str,
        command_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            src_dir: src_dir.as_ref().to_path_buf().clean(),
            out_dir: out_dir.as_ref().to_path_buf().clean(),
            extension,
            command_roots: command_roots.into_iter().map(|p| p.clean()).collect(),
        }
    }

    pub fn from_config(config: &KilnConfig) -> Self {
        Self::new(
            config.source_root(),
            config.output_root(),
            config.emit.extension(),
            config.command_roots(),
        )
    }

    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// Command files live below a command directory; everything else is a
    /// service/manager file.
    pub fn classify(&self, path: &Path) -> FileKind {
        if self.command_root(path).is_some() {
            FileKind::Command
        } else {
            FileKind::Service
        }
    }

    fn command_root(&self, path: &Path) -> Option<&Path> {
        self.command_roots
            .iter()
            .find(|root| path.starts_with(root))
            .map(PathBuf::as_path)
    }

    /// `commands/admin/ban.ts` is registered as `admin/ban`.
    pub fn command_name(&self, path: &Path) -> Option<String> {
        let root = self.command_root(path)?;
        let relative = path.strip_prefix(root).ok()?.with_extension("");
        Some(slash_path(&relative))
    }

    /// Output path of a transformed source file. Files outside the source
    /// directory are not emitted and keep their path.
    pub fn emitted_path(&self, source: &Path) -> PathBuf {
        match source.strip_prefix(&self.src_dir) {
            Ok(relative) => self.out_dir.join(relative).with_extension(self.extension),
            Err(_) => source.to_path_buf(),
        }
    }

    /// Path of a generated artifact such as `routes`.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.out_dir.join(format!("{name}.{}", self.extension))
    }

    /// Specifier importing the emitted form of `source` from the output root.
    pub fn specifier_for(&self, source: &Path) -> String {
        relative_specifier(&self.out_dir, &self.emitted_path(source))
    }

    /// Specifier importing the artifact `name` from the output root.
    pub fn artifact_specifier(&self, name: &str) -> String {
        format!("./{name}.{}", self.extension)
    }
}

/// `./x/y.js` or `../x.js` from directory `from` to file `to`.
pub fn relative_specifier(from: &Path, to: &Path) -> String {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec![String::from(".."); from.len() - common];
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
