use std::{collections::BTreeSet, path::Path};

use crate::{
    brief::model::Brief,
    foundation::error::{ForgeError, ForgeResult},
};

/// One term per line; trimmed, lower-cased, blanks dropped.
pub fn parse_terms(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn load_prohibited_terms(path: &Path) -> ForgeResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ForgeError::configuration(format!(
            "read prohibited terms '{}': {e}",
            path.display()
        ))
    })?;
    Ok(parse_terms(&text))
}

/// Prohibited terms found anywhere in the brief's messages or calls to action.
///
/// Matching is case-insensitive substring search; the result is sorted and deduplicated.
pub fn scan_legal(brief: &Brief, terms: &[String]) -> Vec<String> {
    let haystack = brief
        .message
        .values()
        .chain(brief.call_to_action.values())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase();

    let hits: BTreeSet<String> = terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && haystack.contains(t.as_str()))
        .collect();
    hits.into_iter().collect()
}

#[cfg(test)]
#[path = "../../tests/unit/legal/scan.rs"]
mod tests;
