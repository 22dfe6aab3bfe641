//! Source file discovery on disk.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::compile::SourceFile;
use crate::error::CompileError;
use crate::layout::OutputLayout;
use crate::resolver::EXTENSIONS;

/// Every compilable file below the source directory, sorted by path.
///
/// Skips declaration files, `node_modules`, hidden directories and the output
/// directory.
pub fn discover_sources(layout: &OutputLayout) -> Result<Vec<SourceFile>, CompileError> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(layout.src_dir())
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, layout.out_dir()));

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map_or_else(|| layout.src_dir().to_path_buf(), Path::to_path_buf);
            CompileError::io(&path, err)
        })?;
        if entry.file_type().is_file() && is_source(entry.path()) {
            let path = entry.into_path();
            let kind = layout.classify(&path);
            sources.push(SourceFile::new(path, kind));
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = sources.len(), "discovered sources");
    Ok(sources)
}

fn is_skipped_dir(entry: &DirEntry, out_dir: &Path) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "node_modules" || name.starts_with('.') || entry.path() == out_dir
}

/// `.ts`, `.tsx`, `.mts`, `.js`, `.jsx` and `.mjs`, but not `.d.ts`.
pub fn is_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".d.ts") || name.ends_with(".d.mts") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_graph::FileKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walks_and_classifies() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        for file in [
            "commands/ping.ts",
            "commands/admin/ban.ts",
            "managers/users.ts",
            "types.d.ts",
            "node_modules/x/index.js",
            ".cache/a.ts",
            "README.md",
        ] {
            let path = src.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let layout = OutputLayout::new(&src, dir.path().join(".kiln"), "js", vec![src.join("commands")]);
        let found: Vec<(String, FileKind)> = discover_sources(&layout)
            .unwrap()
            .into_iter()
            .map(|s| {
                let rel = s.path.strip_prefix(&src).unwrap().to_string_lossy().replace('\\', "/");
                (rel, s.kind)
            })
            .collect();

        assert_eq!(
            found,
            vec![
                (String::from("commands/admin/ban.ts"), FileKind::Command),
                (String::from("commands/ping.ts"), FileKind::Command),
                (String::from("managers/users.ts"), FileKind::Service),
            ]
        );
    }

    #[test]
    fn source_extensions() {
        assert!(is_source(Path::new("a.ts")));
        assert!(is_source(Path::new("a.mjs")));
        assert!(!is_source(Path::new("a.d.ts")));
        assert!(!is_source(Path::new("a.json")));
    }
}
