//! Module tag parsing and export key derivation

use once_cell::sync::Lazy;
use regex::Regex;

/// Key used for the file tagged with the library's own name
pub const INDEX_KEY: &str = "index";

static MODULE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@module\s+(@?[\w/.-]+)").unwrap());

/// Find every module tag identifier in `content`, in order of appearance
pub fn find_tags(content: &str) -> impl Iterator<Item = &str> + '_ {
    MODULE_TAG
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Turn a tag identifier into an export key
///
/// The library name is removed from the front of the identifier when it ends
/// at a path boundary. What remains has its leading slashes stripped; nothing
/// remaining means the root export.
pub fn export_key(identifier: &str, library_name: &str) -> String {
    let rest = match identifier.strip_prefix(library_name) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => identifier,
    }
    .trim_start_matches('/');

    if rest.is_empty() {
        INDEX_KEY.to_string()
    } else {
        rest.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_tags_in_doc_comments() {
        let content = "/**\n * Math helpers\n * @module @example/lib/math/add\n */\nexport const add = 1;\n";
        let tags: Vec<&str> = find_tags(content).collect();
        assert_eq!(tags, vec!["@example/lib/math/add"]);
    }

    #[test]
    fn test_finds_multiple_tags_in_order() {
        let content = "// @module first\n// @module\tsecond/part\n";
        let tags: Vec<&str> = find_tags(content).collect();
        assert_eq!(tags, vec!["first", "second/part"]);
    }

    #[test]
    fn test_tag_requires_whitespace_and_identifier() {
        assert_eq!(find_tags("@modulefoo").count(), 0);
        assert_eq!(find_tags("@module   ").count(), 0);
    }

    #[test]
    fn test_tag_stops_at_non_identifier_characters() {
        let tags: Vec<&str> = find_tags("@module utils/strings.v2-beta */").collect();
        assert_eq!(tags, vec!["utils/strings.v2-beta"]);
    }

    #[test]
    fn test_library_name_becomes_index() {
        assert_eq!(export_key("@example/lib", "@example/lib"), "index");
    }

    #[test]
    fn test_library_prefix_is_removed() {
        assert_eq!(export_key("@example/lib/foo/bar", "@example/lib"), "foo/bar");
    }

    #[test]
    fn test_foreign_identifier_keeps_its_name() {
        assert_eq!(export_key("helpers/dates", "@example/lib"), "helpers/dates");
        assert_eq!(export_key("//helpers", "@example/lib"), "helpers");
    }

    #[test]
    fn test_library_prefix_must_end_at_path_boundary() {
        assert_eq!(export_key("@example/library", "@example/lib"), "@example/library");
        assert_eq!(
            export_key("@example/lib-extra/util", "@example/lib"),
            "@example/lib-extra/util"
        );
    }

    #[test]
    fn test_trailing_slash_on_library_name_is_index() {
        assert_eq!(export_key("@example/lib/", "@example/lib"), "index");
    }
}
