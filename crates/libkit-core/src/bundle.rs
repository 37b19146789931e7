//! Bundler entry points derived from the entry map

use crate::entries::EntryMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Module format emitted by the bundler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    Es,
    Cjs,
}

impl ModuleFormat {
    /// File extension of artifacts in this format
    pub fn extension(&self) -> &'static str {
        match self {
            ModuleFormat::Es => "mjs",
            ModuleFormat::Cjs => "cjs",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFormat::Es => write!(f, "es"),
            ModuleFormat::Cjs => write!(f, "cjs"),
        }
    }
}

/// One named bundler entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    /// Export key, also the artifact base name
    pub name: String,

    pub source: PathBuf,

    /// Artifact file names, one per requested format
    pub outputs: Vec<String>,
}

/// Artifact file name for an export key in a given format
pub fn artifact_name(key: &str, format: ModuleFormat) -> String {
    format!("{}.{}", key, format.extension())
}

/// Build one entry point per export key, in key order
pub fn entry_points(entries: &EntryMap, formats: &[ModuleFormat]) -> Vec<BundleEntry> {
    entries
        .iter()
        .map(|(key, source)| BundleEntry {
            name: key.clone(),
            source: source.clone(),
            outputs: formats
                .iter()
                .map(|format| artifact_name(key, *format))
                .collect(),
        })
        .collect()
}
