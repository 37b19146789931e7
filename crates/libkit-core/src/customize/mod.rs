//! Template customization: replace the template's package name and
//! description with new ones across the project

pub mod index;
pub mod rewrite;

use crate::project::{Project, PACKAGE_JSON};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

pub use index::build_index;
pub use rewrite::replace_all;

/// npm rejects package names of this length or longer
pub const MAX_NAME_LENGTH: usize = 214;

static NPM_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:@[a-z0-9~][a-z0-9\-._~]*/)?[a-z0-9~][a-z0-9\-._~]*$").unwrap()
});

/// The old and new package name and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customization {
    pub name: String,
    pub description: String,
    pub new_name: String,
    pub new_description: String,
}

impl Customization {
    fn replacements(&self) -> [(&str, &str); 2] {
        [
            (self.name.as_str(), self.new_name.as_str()),
            (self.description.as_str(), self.new_description.as_str()),
        ]
    }

    pub fn is_noop(&self) -> bool {
        self.name == self.new_name && self.description == self.new_description
    }
}

/// Check a new package name; the current name is always accepted
pub fn validate_package_name(candidate: &str, current: &str) -> std::result::Result<(), String> {
    if candidate.is_empty() {
        return Err("Please enter a name".to_string());
    }
    if candidate == current {
        return Ok(());
    }
    if !NPM_NAME.is_match(candidate) {
        return Err("Please enter an NPM-compliant name".to_string());
    }
    if candidate.len() >= MAX_NAME_LENGTH {
        return Err("Name is too long".to_string());
    }
    Ok(())
}

pub fn validate_description(candidate: &str) -> std::result::Result<(), String> {
    if candidate.is_empty() {
        Err("Please enter a description".to_string())
    } else {
        Ok(())
    }
}

/// Read the current name and description from package.json
pub async fn current_identity(project: &Project) -> Result<(String, String)> {
    let manifest = project.read_manifest().await?;
    let name = manifest.require_name()?.to_string();
    let description = manifest.description().unwrap_or_default().to_string();
    Ok((name, description))
}

/// Index the files of `project` that mention the current name or description
pub fn index_project(project: &Project, customization: &Customization) -> Result<Vec<PathBuf>> {
    build_index(
        project.root(),
        &[customization.name.as_str(), customization.description.as_str()],
        &project.config().customize,
    )
}

/// Write the customization to package.json and every indexed file
///
/// Indexed files named package.json are left alone; only the root manifest's
/// name and description fields change. Returns the rewritten files.
pub async fn apply(
    project: &Project,
    index: &[PathBuf],
    customization: &Customization,
) -> Result<Vec<PathBuf>> {
    let mut manifest = project.read_manifest().await?;
    manifest.set("name", customization.new_name.as_str());
    manifest.set("description", customization.new_description.as_str());

    let manifest_path = project.package_json_path();
    tokio::fs::write(&manifest_path, manifest.to_pretty_string()?)
        .await
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    let replacements = customization.replacements();
    let mut updated = vec![manifest_path];

    for file in index.iter().filter(|file| !is_package_json(file)) {
        let original = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let rewritten = replace_all(&original, &replacements)?;
        tokio::fs::write(file, rewritten)
            .await
            .with_context(|| format!("Failed to write {}", file.display()))?;
        updated.push(file.clone());
    }

    Ok(updated)
}

fn is_package_json(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == PACKAGE_JSON)
}
