//! Two-phase text replacement
//!
//! Every value being replaced is first swapped for a placeholder, and only
//! then are placeholders swapped for the new values. A replacement can
//! therefore never be rewritten by a later one, which makes swaps (A -> B,
//! B -> A) and overlapping values safe.

use anyhow::Result;
use uuid::Uuid;

/// First code point of the private use block placeholders are drawn from
const PLACEHOLDER_BASE: u32 = 0xE000;

const MAX_PLACEHOLDER_ATTEMPTS: usize = 32;

/// Replace every occurrence of each `from` with its `to`
///
/// Longer values are replaced first so a value contained in another one does
/// not split it. Empty `from` values are ignored.
pub fn replace_all(source: &str, replacements: &[(&str, &str)]) -> Result<String> {
    let mut pairs: Vec<(&str, &str)> = replacements
        .iter()
        .copied()
        .filter(|(from, _)| !from.is_empty())
        .collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut text = source.to_string();
    let mut staged: Vec<(String, &str)> = Vec::new();

    for &(from, to) in &pairs {
        if !text.contains(from) {
            continue;
        }
        let placeholder = fresh_placeholder(&text, &pairs)?;
        text = text.replace(from, &placeholder);
        staged.push((placeholder, to));
    }

    for (placeholder, to) in staged {
        text = text.replace(&placeholder, to);
    }

    Ok(text)
}

/// Generate a placeholder absent from `text` that no `from` value can overlap
fn fresh_placeholder(text: &str, pairs: &[(&str, &str)]) -> Result<String> {
    for _ in 0..MAX_PLACEHOLDER_ATTEMPTS {
        let candidate = encode_placeholder(Uuid::new_v4());
        let overlaps = pairs
            .iter()
            .any(|(from, _)| from.chars().any(|c| candidate.contains(c)));
        if !overlaps && !text.contains(&candidate) {
            return Ok(candidate);
        }
    }
    anyhow::bail!("Could not generate a unique placeholder for text replacement")
}

/// Map each UUID byte onto a private use code point
fn encode_placeholder(id: Uuid) -> String {
    id.as_bytes()
        .iter()
        .filter_map(|byte| char::from_u32(PLACEHOLDER_BASE + u32::from(*byte)))
        .collect()
}
