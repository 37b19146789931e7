//! Publishable package.json synthesis
//!
//! The published package is flattened: `dist/` becomes the package root, every
//! entry point is emitted as `<key>.mjs`, `<key>.cjs` and `<key>.d.ts` beside
//! it, and the `exports` map points at those artifacts.

pub mod manifest;

use crate::bundle::{artifact_name, ModuleFormat};
use crate::entries::{self, EntryMap, INDEX_KEY};
use crate::error::EntryError;
use crate::project::{Project, PACKAGE_JSON};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

pub use manifest::PackageManifest;

/// Fields that only matter inside the source repository
const DEV_ONLY_FIELDS: &[&str] = &["devDependencies", "scripts"];

/// Rewrite a source manifest into its publishable form
pub fn package_manifest(
    source: &PackageManifest,
    entries: &EntryMap,
) -> std::result::Result<PackageManifest, EntryError> {
    entries::require_index(entries)?;

    let mut manifest = source.clone();
    manifest.set("type", "module");
    if !manifest.contains("dependencies") {
        manifest.set("dependencies", Value::Object(Map::new()));
    }
    for field in DEV_ONLY_FIELDS {
        manifest.remove(field);
    }

    manifest.set("module", relative(&artifact_name(INDEX_KEY, ModuleFormat::Es)));
    manifest.set("main", relative(&artifact_name(INDEX_KEY, ModuleFormat::Cjs)));
    manifest.set("exports", exports_map(entries));
    manifest.remove("files");

    Ok(manifest)
}

/// `"."` for the index entry, then `"./<key>"` for every other key in key order
pub fn exports_map(entries: &EntryMap) -> Value {
    let mut exports = Map::new();
    exports.insert(".".to_string(), export_target(INDEX_KEY));
    for key in entries.keys().filter(|key| key.as_str() != INDEX_KEY) {
        exports.insert(relative(key), export_target(key));
    }
    Value::Object(exports)
}

fn export_target(key: &str) -> Value {
    json!({
        "import": relative(&artifact_name(key, ModuleFormat::Es)),
        "require": relative(&artifact_name(key, ModuleFormat::Cjs)),
        "types": relative(&format!("{}.d.ts", key)),
    })
}

fn relative(path: &str) -> String {
    format!("./{}", path)
}

/// Build the entry map for the project and write `<dist>/package.json`
pub async fn write_dist_manifest(project: &Project) -> Result<PathBuf> {
    let source = project.read_manifest().await?;
    let name = source.require_name()?;

    println!(
        "{} {}",
        "Scanning".cyan().bold(),
        project.src_dir().display()
    );
    let entries =
        entries::build_entry_map(&project.src_dir(), name, &project.config().extensions)
            .await
            .context("Failed to build entry map")?;

    for (key, path) in &entries {
        println!("  {} {} ({})", "->".blue(), key, path.display());
    }

    let manifest = package_manifest(&source, &entries)?;

    let dist = project.dist_dir();
    tokio::fs::create_dir_all(&dist)
        .await
        .with_context(|| format!("Failed to create directory: {}", dist.display()))?;

    let dest = dist.join(PACKAGE_JSON);
    tokio::fs::write(&dest, manifest.to_pretty_string()?)
        .await
        .with_context(|| format!("Failed to write {}", dest.display()))?;

    println!(
        "{} {} with {} export(s)",
        "Wrote".green().bold(),
        dest.display(),
        entries.len()
    );

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectConfig;
    use tempfile::TempDir;

    fn entries_with(keys: &[&str]) -> EntryMap {
        keys.iter()
            .map(|key| (key.to_string(), PathBuf::from(format!("/src/{}.ts", key))))
            .collect()
    }

    fn source_manifest() -> PackageManifest {
        PackageManifest::parse(
            r#"{
                "name": "@example/lib",
                "version": "1.2.3",
                "files": ["dist"],
                "scripts": {"build": "vite build"},
                "devDependencies": {"typescript": "^5.0.0"},
                "license": "MIT"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_publishable_fields() {
        let manifest =
            package_manifest(&source_manifest(), &entries_with(&["index", "math/add"])).unwrap();

        assert_eq!(manifest.get_str("type"), Some("module"));
        assert_eq!(manifest.get_str("module"), Some("./index.mjs"));
        assert_eq!(manifest.get_str("main"), Some("./index.cjs"));
        assert_eq!(manifest.get("dependencies"), Some(&json!({})));
        assert!(!manifest.contains("scripts"));
        assert!(!manifest.contains("devDependencies"));
        assert!(!manifest.contains("files"));
        assert_eq!(manifest.get_str("version"), Some("1.2.3"));
    }

    #[test]
    fn test_exports_map() {
        let manifest =
            package_manifest(&source_manifest(), &entries_with(&["index", "math/add"])).unwrap();

        let expected = json!({
            ".": {"import": "./index.mjs", "require": "./index.cjs", "types": "./index.d.ts"},
            "./math/add": {
                "import": "./math/add.mjs",
                "require": "./math/add.cjs",
                "types": "./math/add.d.ts"
            }
        });
        assert_eq!(manifest.get("exports"), Some(&expected));
    }

    #[test]
    fn test_root_export_comes_first() {
        let exports = exports_map(&entries_with(&["alpha", "index", "zeta"]));
        let keys: Vec<&String> = exports.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![".", "./alpha", "./zeta"]);
    }

    #[test]
    fn test_existing_dependencies_kept() {
        let source = PackageManifest::parse(
            r#"{"name": "@example/lib", "dependencies": {"tslib": "^2.0.0"}}"#,
        )
        .unwrap();

        let manifest = package_manifest(&source, &entries_with(&["index"])).unwrap();

        assert_eq!(manifest.get("dependencies"), Some(&json!({"tslib": "^2.0.0"})));
    }

    #[test]
    fn test_missing_index_fails() {
        let err = package_manifest(&source_manifest(), &entries_with(&["math/add"])).unwrap_err();
        assert!(matches!(err, EntryError::MissingIndex));
    }

    #[tokio::test]
    async fn test_write_dist_manifest() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/math")).unwrap();
        std::fs::write(
            root.join("package.json"),
            r#"{"name": "@example/lib", "scripts": {"test": "vitest"}}"#,
        )
        .unwrap();
        std::fs::write(root.join("src/index.ts"), "/** @module @example/lib */\n").unwrap();
        std::fs::write(
            root.join("src/math/add.ts"),
            "/** @module @example/lib/math/add */\n",
        )
        .unwrap();
        let project = Project::new(root, ProjectConfig::default());

        let dest = write_dist_manifest(&project).await.unwrap();

        assert_eq!(dest, root.join("dist/package.json"));
        let written = PackageManifest::parse(&std::fs::read_to_string(&dest).unwrap()).unwrap();
        assert!(written.get("exports").unwrap().get("./math/add").is_some());
        assert!(!written.contains("scripts"));
        // Source manifest untouched
        let original = std::fs::read_to_string(root.join("package.json")).unwrap();
        assert!(original.contains("vitest"));
    }

    #[tokio::test]
    async fn test_write_dist_manifest_without_index() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("package.json"), r#"{"name": "@example/lib"}"#).unwrap();
        std::fs::write(root.join("src/other.ts"), "// @module @example/lib/other\n").unwrap();
        let project = Project::new(root, ProjectConfig::default());

        let err = write_dist_manifest(&project).await.unwrap_err();

        assert!(err.to_string().contains("without an index entry"));
        assert!(!root.join("dist/package.json").exists());
    }
}
