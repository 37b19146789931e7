//! Index of project files mentioning the values being customized

use crate::project::CustomizeConfig;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// List every text file under `root` containing any of `needles`
///
/// Top-level entries named in `ignore_roots` are skipped entirely, as is any
/// file whose root-relative path (with a leading `/`) contains one of
/// `ignore_paths`. Files that are not UTF-8 text are skipped.
pub fn build_index(
    root: &Path,
    needles: &[&str],
    config: &CustomizeConfig,
) -> Result<Vec<PathBuf>> {
    let needles: Vec<&str> = needles.iter().copied().filter(|n| !n.is_empty()).collect();
    if needles.is_empty() {
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_ignored_root(entry, &config.ignore_roots));

    let mut index = BTreeSet::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel = relative_path(root, path);
        if config
            .ignore_paths
            .iter()
            .any(|ignored| rel.contains(ignored.as_str()))
        {
            continue;
        }

        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        if needles.iter().any(|needle| contents.contains(needle)) {
            index.insert(path.to_path_buf());
        }
    }

    Ok(index.into_iter().collect())
}

fn is_ignored_root(entry: &DirEntry, ignore_roots: &[String]) -> bool {
    entry.depth() == 1
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ignore_roots.iter().any(|ignored| ignored == name))
}

/// Root-relative path with a leading `/` and forward slashes
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}
