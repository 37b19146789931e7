//! Project layout and `libkit.yaml` configuration
//!
//! Every field has a default, so the config file is optional and may name only
//! the keys it wants to change.

use crate::bundle::ModuleFormat;
use crate::package::PackageManifest;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the project root
pub const CONFIG_FILE: &str = "libkit.yaml";

/// Environment variable naming an alternative config file
pub const CONFIG_ENV: &str = "LIBKIT_CONFIG";

/// Manifest file name in the project root
pub const PACKAGE_JSON: &str = "package.json";

/// Root configuration (libkit.yaml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Source tree scanned for module tags, relative to the project root
    pub src_dir: PathBuf,

    /// Output directory receiving the publishable package.json
    pub dist_dir: PathBuf,

    /// File extensions scanned for module tags
    pub extensions: Vec<String>,

    pub customize: CustomizeConfig,

    pub docs: DocsConfig,

    pub bundle: BundleConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            dist_dir: PathBuf::from("dist"),
            extensions: crate::entries::default_extensions(),
            customize: CustomizeConfig::default(),
            docs: DocsConfig::default(),
            bundle: BundleConfig::default(),
        }
    }
}

/// Which files the rename wizard leaves alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizeConfig {
    /// Top-level entries of the project root that are never indexed
    pub ignore_roots: Vec<String>,

    /// Root-relative path fragments (starting with `/`) that are never indexed
    pub ignore_paths: Vec<String>,
}

impl Default for CustomizeConfig {
    fn default() -> Self {
        Self {
            ignore_roots: vec!["dist".into(), "node_modules".into(), "bin".into()],
            ignore_paths: vec![
                "/docs/.vitepress/dist".into(),
                "/docs/.vitepress/cache".into(),
                "/docs/api".into(),
            ],
        }
    }
}

/// API documentation generation and watching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Doc generator program followed by its fixed arguments
    pub command: Vec<String>,

    /// Output directory handed to the generator, relative to the project root
    pub out_dir: PathBuf,

    /// Paths watched for changes, relative to the project root
    pub watch: Vec<PathBuf>,

    /// Extensions whose changes trigger a regeneration
    pub extensions: Vec<String>,

    /// Directory names whose contents never trigger a regeneration
    pub ignore: Vec<String>,

    /// Quiet period before a batch of changes is reported
    pub debounce_ms: u64,

    /// Delay between a reported change and the regeneration it triggers
    pub restart_delay_ms: u64,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            command: vec!["npx".into(), "typedoc".into()],
            out_dir: PathBuf::from("docs/api"),
            watch: ["src", "package.json", "vite.config.mts", "tsconfig.json"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            extensions: ["ts", "json", "env", "scss", "vue", "md", "yml"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            ignore: vec!["node_modules".into()],
            debounce_ms: 2500,
            restart_delay_ms: 1000,
        }
    }
}

/// Bundler entry point output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub formats: Vec<ModuleFormat>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            formats: vec![ModuleFormat::Es, ModuleFormat::Cjs],
        }
    }
}

impl ProjectConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file parses as null rather than an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// A library project rooted at a directory containing package.json
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Open a project, resolving its config from `config_path`, then
    /// `LIBKIT_CONFIG`, then `<root>/libkit.yaml`, then built-in defaults
    ///
    /// Relative `config_path` and `LIBKIT_CONFIG` values are taken from the
    /// current directory, like any other command line path.
    pub fn open(root: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            anyhow::bail!("Project directory not found: {}", root.display());
        }

        let config = match Self::resolve_config_path(&root, config_path) {
            Some(path) => ProjectConfig::from_file(&path)?,
            None => ProjectConfig::default(),
        };

        Ok(Self::new(root, config))
    }

    fn resolve_config_path(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let default_path = root.join(CONFIG_FILE);
        default_path.is_file().then_some(default_path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join(&self.config.src_dir)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.config.dist_dir)
    }

    pub fn package_json_path(&self) -> PathBuf {
        self.root.join(PACKAGE_JSON)
    }

    /// Read and parse the project's package.json
    pub async fn read_manifest(&self) -> Result<PackageManifest> {
        let path = self.package_json_path();
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        PackageManifest::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// The package name from package.json
    pub async fn library_name(&self) -> Result<String> {
        let manifest = self.read_manifest().await?;
        Ok(manifest.require_name()?.to_string())
    }
}
