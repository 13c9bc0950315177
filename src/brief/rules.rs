use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    color::{contrast::WCAG_AA_NORMAL_TEXT, hsv::HsvTolerance},
    foundation::core::Rgb8,
    foundation::error::{ForgeError, ForgeResult},
};

/// Brand identity constraints checked by the compliance scorer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BrandIdentity {
    #[serde(default = "default_primary_hex")]
    pub primary_hex: String,
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
    #[serde(default = "default_logo_min")]
    pub logo_area_pct_min: f64,
    #[serde(default = "default_logo_max")]
    pub logo_area_pct_max: f64,
    #[serde(default)]
    pub hsv_tolerance: HsvTolerance,
}

/// Text overlay settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayRules {
    #[serde(default)]
    pub text_font: Option<PathBuf>,
    #[serde(default = "default_min_contrast")]
    pub min_contrast_ratio: f64,
}

/// Per-run brand rules. Immutable once the run starts.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BrandRules {
    #[serde(default)]
    pub brand: BrandIdentity,
    #[serde(default)]
    pub overlay: OverlayRules,
}

fn default_primary_hex() -> String {
    "#000000".to_string()
}

fn default_logo_min() -> f64 {
    3.0
}

fn default_logo_max() -> f64 {
    6.0
}

fn default_min_contrast() -> f64 {
    WCAG_AA_NORMAL_TEXT
}

impl Default for BrandIdentity {
    fn default() -> Self {
        Self {
            primary_hex: default_primary_hex(),
            logo_path: None,
            logo_area_pct_min: default_logo_min(),
            logo_area_pct_max: default_logo_max(),
            hsv_tolerance: HsvTolerance::default(),
        }
    }
}

impl Default for OverlayRules {
    fn default() -> Self {
        Self {
            text_font: None,
            min_contrast_ratio: default_min_contrast(),
        }
    }
}

impl BrandRules {
    pub fn validate(&self) -> ForgeResult<()> {
        let b = &self.brand;
        Rgb8::from_hex(&b.primary_hex)?;
        if !(b.logo_area_pct_min.is_finite() && b.logo_area_pct_max.is_finite()) {
            return Err(ForgeError::configuration("logo area range must be finite"));
        }
        if b.logo_area_pct_min <= 0.0 || b.logo_area_pct_min > b.logo_area_pct_max {
            return Err(ForgeError::configuration(format!(
                "logo area range must satisfy 0 < min <= max, got [{}, {}]",
                b.logo_area_pct_min, b.logo_area_pct_max
            )));
        }
        if b.logo_area_pct_max >= 100.0 {
            return Err(ForgeError::configuration("logo area max must be < 100%"));
        }
        let tol = b.hsv_tolerance;
        if tol.h < 0.0 || tol.s < 0.0 || tol.v < 0.0 {
            return Err(ForgeError::configuration("hsv tolerance must be >= 0"));
        }
        let c = self.overlay.min_contrast_ratio;
        if !c.is_finite() || !(1.0..=21.0).contains(&c) {
            return Err(ForgeError::configuration(format!(
                "min_contrast_ratio must be within [1, 21], got {c}"
            )));
        }
        Ok(())
    }

    pub fn primary_color(&self) -> ForgeResult<Rgb8> {
        Rgb8::from_hex(&self.brand.primary_hex)
    }

    /// Midpoint of the configured logo area range, in percent.
    pub fn logo_area_midpoint(&self) -> f64 {
        (self.brand.logo_area_pct_min + self.brand.logo_area_pct_max) / 2.0
    }

    /// Resolve relative asset paths against `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        fn resolve(p: &mut Option<PathBuf>, base: &Path) {
            if let Some(path) = p
                && path.is_relative()
            {
                *path = base.join(&*path);
            }
        }
        resolve(&mut self.brand.logo_path, base_dir);
        resolve(&mut self.overlay.text_font, base_dir);
    }
}

/// Recursively merge `overlay` into `base`; objects merge key-wise, everything else replaces.
pub fn deep_merge(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(b), serde_json::Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) if slot.is_object() && v.is_object() => deep_merge(slot, v),
                    _ => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Read a rules file as a generic value; `.yaml`/`.yml` parse as YAML, anything else as JSON.
fn read_rules_value(path: &Path) -> ForgeResult<serde_json::Value> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read brand rules '{}'", path.display()))?;
    let parsed = if is_yaml(path) {
        serde_yaml::from_slice::<serde_json::Value>(&bytes).map_err(|e| e.to_string())
    } else {
        serde_json::from_slice::<serde_json::Value>(&bytes).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| {
        ForgeError::configuration(format!("parse brand rules '{}': {e}", path.display()))
    })
}

/// Load brand rules from `base`, deep-merging `local` overrides when that file exists.
///
/// Relative logo/font paths resolve against the directory of `base`.
pub fn load_brand_rules(base: &Path, local: Option<&Path>) -> ForgeResult<BrandRules> {
    let mut value = read_rules_value(base)?;
    if let Some(local) = local
        && local.is_file()
    {
        tracing::info!(path = %local.display(), "merging local brand rule overrides");
        deep_merge(&mut value, read_rules_value(local)?);
    }

    let mut rules: BrandRules = serde_json::from_value(value)
        .map_err(|e| ForgeError::configuration(format!("invalid brand rules: {e}")))?;
    if let Some(dir) = base.parent() {
        rules.resolve_paths(dir);
    }
    rules.validate()?;
    Ok(rules)
}

#[cfg(test)]
#[path = "../../tests/unit/brief/rules.rs"]
mod tests;
