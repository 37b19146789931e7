//! libkit core - developer tooling for TypeScript library projects
//!
//! This library provides the functionality behind the `libkit` CLI. Everything
//! revolves around the entry map: source files declare the public subpath they
//! implement with a module tag, and scanning the source tree for those tags
//! tells the other tools what the library exports.
//!
//! # Architecture
//!
//! - **Entry discovery** - `entries` scans the source tree and builds the entry map
//! - **Consumers** - `package` (publishable package.json), `bundle` (bundler
//!   entry points) and `docs` (API doc generation and watching)
//! - **Customization** - `customize` renames a project created from the template
//! - **CLI/TUI Interface** - Optional cliclack-based wizard (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based customize wizard
//!
//! # Example Usage
//!
//! ```ignore
//! use libkit_core::{entries, Project};
//!
//! let project = Project::open(".", None)?;
//! let name = project.library_name().await?;
//! let map = entries::build_entry_map(&project.src_dir(), &name, &project.config().extensions).await?;
//! for (key, path) in &map {
//!     println!("{key} -> {}", path.display());
//! }
//! ```

pub mod bundle;
pub mod customize;
pub mod docs;
pub mod entries;
pub mod error;
pub mod lifecycle;
pub mod package;
pub mod project;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use bundle::{entry_points, BundleEntry, ModuleFormat};
pub use entries::{build_entry_map, EntryMap, INDEX_KEY};
pub use error::EntryError;
pub use lifecycle::RunContext;
pub use package::{write_dist_manifest, PackageManifest};
pub use project::{Project, ProjectConfig};

#[cfg(feature = "tui")]
pub use tui::run_customize;
