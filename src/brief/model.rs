use std::{collections::BTreeMap, path::Path};

use anyhow::Context;

use crate::foundation::error::{ForgeError, ForgeResult};

/// A product featured in a campaign.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub prompt_hints: Option<String>,
    /// Path to a pre-existing hero asset; takes precedence over generation when usable.
    #[serde(default)]
    pub base_asset: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BrandPalette {
    pub primary_hex: String,
    #[serde(default)]
    pub secondary_hex: Option<String>,
}

/// Campaign brief: what to render, for whom, in which languages and shapes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Brief {
    pub campaign_id: String,
    pub brand: String,
    #[serde(default)]
    pub markets: Vec<String>,
    #[serde(default)]
    pub audience: String,
    pub locales: Vec<String>,
    pub aspect_ratios: Vec<String>,
    pub message: BTreeMap<String, String>,
    pub call_to_action: BTreeMap<String, String>,
    pub brand_palette: BrandPalette,
    pub products: Vec<Product>,
}

impl Brief {
    /// Check the ingestion invariants the engine relies on.
    pub fn validate(&self) -> ForgeResult<()> {
        if self.campaign_id.trim().is_empty() {
            return Err(ForgeError::configuration("brief campaign_id must be non-empty"));
        }
        if self.products.is_empty() {
            return Err(ForgeError::configuration("brief must list at least one product"));
        }
        for p in &self.products {
            check_path_token("product id", &p.id)?;
        }
        for loc in self.locales.iter().chain(self.message.keys()) {
            check_path_token("locale", loc)?;
        }
        for loc in &self.locales {
            if !self.message.contains_key(loc) {
                return Err(ForgeError::configuration(format!(
                    "missing message for locale {loc}"
                )));
            }
            if !self.call_to_action.contains_key(loc) {
                return Err(ForgeError::configuration(format!(
                    "missing call_to_action for locale {loc}"
                )));
            }
        }
        Ok(())
    }

    /// Message for `locale`, falling back to the first available entry.
    pub fn message_for(&self, locale: &str) -> &str {
        localized(&self.message, locale)
    }

    /// Call-to-action for `locale`, falling back to the first available entry.
    pub fn cta_for(&self, locale: &str) -> &str {
        localized(&self.call_to_action, locale)
    }
}

/// Reject tokens that end up in output file names and could escape the run directory.
pub fn check_path_token(what: &str, token: &str) -> ForgeResult<()> {
    let t = token.trim();
    if t.is_empty() {
        return Err(ForgeError::configuration(format!("{what} must be non-empty")));
    }
    if t.contains(['/', '\\']) || t == "." || t == ".." {
        return Err(ForgeError::configuration(format!(
            "{what} '{token}' must not contain path separators"
        )));
    }
    Ok(())
}

/// Look up `locale` in a per-locale text map; first entry (by key order) otherwise.
pub fn localized<'a>(by_locale: &'a BTreeMap<String, String>, locale: &str) -> &'a str {
    by_locale
        .get(locale)
        .or_else(|| by_locale.values().next())
        .map(String::as_str)
        .unwrap_or("")
}

/// Read and validate a brief JSON file.
pub fn load_brief(path: &Path) -> ForgeResult<Brief> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read brief '{}'", path.display()))?;
    let brief: Brief = serde_json::from_slice(&bytes).map_err(|e| {
        ForgeError::configuration(format!("parse brief '{}': {e}", path.display()))
    })?;
    brief.validate()?;
    Ok(brief)
}

#[cfg(test)]
#[path = "../../tests/unit/brief/model.rs"]
mod tests;
