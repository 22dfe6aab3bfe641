use std::path::{Path, PathBuf};

use kiln_graph::Runtime;

/// Walk up from `from` (a file or directory) to the nearest directory holding
/// a `package.json`.
pub fn find_workspace_root(runtime: &dyn Runtime, from: &Path) -> Option<PathBuf> {
    from.ancestors()
        .find(|dir| runtime.is_file(&dir.join("package.json")))
        .map(Path::to_path_buf)
}
