//! Entry map construction from a source tree

use super::tag::{export_key, find_tags};
use crate::error::{EntryError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task::JoinSet;
use walkdir::WalkDir;

/// Export key -> absolute path of the file declaring it
pub type EntryMap = BTreeMap<String, PathBuf>;

/// A single module tag found while scanning a file
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryMatch {
    path: PathBuf,
    /// Position of the tag among the tags of the same file
    position: usize,
    key: String,
}

/// Scan `root` recursively and map every module tag to the file declaring it
///
/// Files are read concurrently but the map is only assembled once every read
/// has finished, in path order, so a collision is always reported against the
/// same pair of files.
pub async fn build_entry_map(
    root: &Path,
    library_name: &str,
    extensions: &[String],
) -> Result<EntryMap> {
    if library_name.is_empty() {
        return Err(EntryError::EmptyLibraryName);
    }

    let root = fs::canonicalize(root)
        .await
        .map_err(|e| EntryError::access(root, e))?;
    let metadata = fs::metadata(&root)
        .await
        .map_err(|e| EntryError::access(&root, e))?;
    if !metadata.is_dir() {
        return Err(EntryError::access(
            &root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut reads = JoinSet::new();
    for path in source_files(&root, extensions)? {
        let library_name = library_name.to_string();
        reads.spawn(async move { scan_file(path, &library_name).await });
    }

    let mut matches = Vec::new();
    while let Some(joined) = reads.join_next().await {
        let file_matches =
            joined.map_err(|e| EntryError::access(&root, std::io::Error::other(e)))??;
        matches.extend(file_matches);
    }

    merge(matches)
}

/// Fail with `MissingIndex` unless the map has a root export
pub fn require_index(entries: &EntryMap) -> Result<&Path> {
    entries
        .get(super::INDEX_KEY)
        .map(PathBuf::as_path)
        .ok_or(EntryError::MissingIndex)
}

/// List regular files below `root` whose extension is one of `extensions`
fn source_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            EntryError::access(path, e.into())
        })?;

        if entry.file_type().is_file() && has_source_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn has_source_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.') == ext)
        })
}

async fn scan_file(path: PathBuf, library_name: &str) -> Result<Vec<EntryMatch>> {
    let bytes = fs::read(&path)
        .await
        .map_err(|e| EntryError::access(&path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    Ok(find_tags(&content)
        .enumerate()
        .map(|(position, identifier)| EntryMatch {
            path: path.clone(),
            position,
            key: export_key(identifier, library_name),
        })
        .collect())
}

/// Insert matches in (path, position) order, failing on the first repeated key
fn merge(mut matches: Vec<EntryMatch>) -> Result<EntryMap> {
    matches.sort_by(|a, b| (&a.path, a.position).cmp(&(&b.path, b.position)));

    let mut entries = EntryMap::new();
    for m in matches {
        if let Some(first) = entries.get(&m.key) {
            return Err(EntryError::Duplicate {
                key: m.key,
                first: first.clone(),
                second: m.path,
            });
        }
        entries.insert(m.key, m.path);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LIB: &str = "@example/lib";

    fn exts() -> Vec<String> {
        crate::entries::default_extensions()
    }

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn canonical_tempdir() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        (dir, root)
    }

    #[tokio::test]
    async fn test_single_index_file() {
        let (_dir, root) = canonical_tempdir();
        let index = write(&root, "index.ts", "/** @module @example/lib */\n");

        let entries = build_entry_map(&root, LIB, &exts()).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries["index"], index);
    }

    #[tokio::test]
    async fn test_nested_entries() {
        let (_dir, root) = canonical_tempdir();
        let index = write(&root, "index.ts", "/** @module @example/lib */\n");
        let add = write(
            &root,
            "math/add.ts",
            "/**\n * @module @example/lib/math/add\n */\nexport const add = (a: number, b: number) => a + b\n",
        );
        write(&root, "math/internal.ts", "export const helper = 1\n");

        let entries = build_entry_map(&root, LIB, &exts()).await.unwrap();

        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["index", "math/add"]);
        assert_eq!(entries["index"], index);
        assert_eq!(entries["math/add"], add);
    }

    #[tokio::test]
    async fn test_non_source_files_are_ignored() {
        let (_dir, root) = canonical_tempdir();
        write(&root, "index.ts", "/** @module @example/lib */\n");
        write(&root, "meta.json", "{\"doc\": \"@module @example/lib/meta\"}");
        write(&root, "README.md", "Use `@module @example/lib/readme` to tag files");

        let entries = build_entry_map(&root, LIB, &exts()).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("index"));
    }

    #[tokio::test]
    async fn test_tsx_files_are_scanned() {
        let (_dir, root) = canonical_tempdir();
        write(&root, "components/button.tsx", "// @module @example/lib/components/button\n");

        let entries = build_entry_map(&root, LIB, &exts()).await.unwrap();

        assert!(entries.contains_key("components/button"));
    }

    #[tokio::test]
    async fn test_duplicate_across_files() {
        let (_dir, root) = canonical_tempdir();
        let a = write(&root, "a.ts", "// @module @example/lib/shared\n");
        let b = write(&root, "b.ts", "// @module @example/lib/shared\n");

        let err = build_entry_map(&root, LIB, &exts()).await.unwrap_err();

        match err {
            EntryError::Duplicate { key, first, second } => {
                assert_eq!(key, "shared");
                assert_eq!(first, a);
                assert_eq!(second, b);
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_within_one_file() {
        let (_dir, root) = canonical_tempdir();
        write(&root, "a.ts", "// @module one\n// @module @example/lib/one\n");

        let err = build_entry_map(&root, LIB, &exts()).await.unwrap_err();

        assert!(err.to_string().starts_with("Duplicate entry: one"));
    }

    #[tokio::test]
    async fn test_duplicate_report_is_stable() {
        let (_dir, root) = canonical_tempdir();
        for name in ["z.ts", "m.ts", "a.ts", "nested/q.ts"] {
            write(&root, name, "// @module @example/lib/clash\n");
        }

        let first = build_entry_map(&root, LIB, &exts()).await.unwrap_err().to_string();
        for _ in 0..5 {
            let again = build_entry_map(&root, LIB, &exts()).await.unwrap_err().to_string();
            assert_eq!(first, again);
        }
    }

    #[tokio::test]
    async fn test_repeated_builds_are_identical() {
        let (_dir, root) = canonical_tempdir();
        write(&root, "index.ts", "// @module @example/lib\n");
        for i in 0..20 {
            write(&root, &format!("mods/m{i}.ts"), &format!("// @module @example/lib/mods/m{i}\n"));
        }

        let first = build_entry_map(&root, LIB, &exts()).await.unwrap();
        let second = build_entry_map(&root, LIB, &exts()).await.unwrap();

        assert_eq!(first.len(), 21);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_tree_is_not_an_error() {
        let (_dir, root) = canonical_tempdir();

        let entries = build_entry_map(&root, LIB, &exts()).await.unwrap();

        assert!(entries.is_empty());
        assert!(matches!(require_index(&entries), Err(EntryError::MissingIndex)));
    }

    #[tokio::test]
    async fn test_missing_root_is_access_error() {
        let (_dir, root) = canonical_tempdir();

        let err = build_entry_map(&root.join("nope"), LIB, &exts())
            .await
            .unwrap_err();

        assert!(matches!(err, EntryError::Access { .. }));
    }

    #[tokio::test]
    async fn test_file_root_is_access_error() {
        let (_dir, root) = canonical_tempdir();
        let file = write(&root, "index.ts", "// @module @example/lib\n");

        let err = build_entry_map(&file, LIB, &exts()).await.unwrap_err();

        assert!(matches!(err, EntryError::Access { .. }));
    }

    #[tokio::test]
    async fn test_empty_library_name_rejected() {
        let (_dir, root) = canonical_tempdir();

        let err = build_entry_map(&root, "", &exts()).await.unwrap_err();

        assert!(matches!(err, EntryError::EmptyLibraryName));
    }

    #[test]
    fn test_extension_matching() {
        let exts = vec!["ts".to_string(), ".mts".to_string()];
        assert!(has_source_extension(Path::new("a/b.ts"), &exts));
        assert!(has_source_extension(Path::new("a/b.mts"), &exts));
        assert!(has_source_extension(Path::new("a/b.d.ts"), &exts));
        assert!(!has_source_extension(Path::new("a/b.json"), &exts));
        assert!(!has_source_extension(Path::new("a/ts"), &exts));
    }
}
