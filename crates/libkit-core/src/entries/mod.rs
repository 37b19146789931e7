//! Entry-point discovery
//!
//! Source files declare the public subpath they implement with a module tag
//! (`@module <library>/<subpath>`). Scanning the source tree for these tags
//! yields the entry map consumed by packaging, bundling and doc generation.

pub mod scan;
pub mod tag;

pub use scan::{build_entry_map, require_index, EntryMap};
pub use tag::{export_key, find_tags, INDEX_KEY};

/// Source file extensions scanned for module tags unless configured otherwise
pub fn default_extensions() -> Vec<String> {
    ["ts", "tsx", "mts", "cts"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}
