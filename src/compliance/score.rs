//! Post-hoc brand compliance scoring from rendered pixels and provenance sidecars.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    assets::decode::load_rgb,
    brief::rules::BrandRules,
    color::hsv::HsvMatcher,
    compliance::coverage::primary_coverage_pct,
    compose::variant::VariantResult,
    foundation::{error::ForgeResult, math::round2},
    output::provenance::read_provenance_value,
};

pub const MAX_LOGO_PENALTY: f64 = 20.0;
pub const LOGO_PENALTY_PER_PCT: f64 = 4.0;
pub const MIN_COVERAGE_PCT: f64 = 3.0;
pub const COVERAGE_PENALTY: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantScore {
    pub path_post: PathBuf,
    pub score: f64,
    pub logo_area_pct: Option<f64>,
    pub coverage_pct: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComplianceSummary {
    pub avg: f64,
    pub min: f64,
}

impl ComplianceSummary {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let sum: f64 = scores.iter().sum();
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        Self {
            avg: round2(sum / scores.len() as f64),
            min: round2(min),
        }
    }
}

/// Scores for every variant in a run, plus provenance warnings in strict mode.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComplianceReport {
    pub summary: ComplianceSummary,
    pub scores: Vec<VariantScore>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Deduction for a logo area outside `[min, max]`.
pub fn logo_penalty(pct: f64, min: f64, max: f64) -> f64 {
    let off = if pct < min {
        min - pct
    } else if pct > max {
        pct - max
    } else {
        0.0
    };
    (off * LOGO_PENALTY_PER_PCT).min(MAX_LOGO_PENALTY)
}

pub fn coverage_penalty(coverage_pct: f64) -> f64 {
    if coverage_pct < MIN_COVERAGE_PCT {
        COVERAGE_PENALTY
    } else {
        0.0
    }
}

/// Combine both signals; a missing signal costs nothing.
pub fn combine_score(
    logo_pct: Option<f64>,
    coverage_pct: Option<f64>,
    rules: &BrandRules,
) -> f64 {
    let mut score = 100.0;
    if let Some(pct) = logo_pct {
        score -= logo_penalty(
            pct,
            rules.brand.logo_area_pct_min,
            rules.brand.logo_area_pct_max,
        );
    }
    if let Some(cov) = coverage_pct {
        score -= coverage_penalty(cov);
    }
    score.clamp(0.0, 100.0)
}

/// Logo pct from a sidecar. The outer `Option` is `None` when the key is absent.
fn sidecar_logo_pct(post: &Path) -> ForgeResult<Option<Option<f64>>> {
    let value = read_provenance_value(post)?;
    Ok(value.get("logo_area_pct").map(serde_json::Value::as_f64))
}

/// Score one post. Returns any strict-mode warning alongside.
#[tracing::instrument(skip(post, rules, matcher), fields(post = %post.display()))]
pub fn score_variant(
    post: &Path,
    rules: &BrandRules,
    matcher: &HsvMatcher,
    strict_provenance: bool,
) -> (VariantScore, Option<String>) {
    let mut warning = None;
    let logo_area_pct = match sidecar_logo_pct(post) {
        Ok(Some(pct)) => pct,
        Ok(None) => {
            if strict_provenance {
                warning = Some(format!(
                    "{}: provenance has no logo_area_pct",
                    post.display()
                ));
            }
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "provenance unreadable; skipping logo check");
            if strict_provenance {
                warning = Some(format!("{}: provenance unreadable: {e}", post.display()));
            }
            None
        }
    };

    let coverage_pct = match load_rgb(post) {
        Ok(img) => Some(primary_coverage_pct(&img, matcher)),
        Err(e) => {
            tracing::warn!(error = %e, "post unreadable; skipping coverage check");
            None
        }
    };

    let score = combine_score(logo_area_pct, coverage_pct, rules);
    (
        VariantScore {
            path_post: post.to_path_buf(),
            score,
            logo_area_pct,
            coverage_pct,
        },
        warning,
    )
}

/// Score every variant of a run from scratch.
#[tracing::instrument(skip_all, fields(variants = variants.len()))]
pub fn score_run(
    variants: &[VariantResult],
    rules: &BrandRules,
    strict_provenance: bool,
) -> ForgeResult<ComplianceReport> {
    let matcher = HsvMatcher::new(rules.primary_color()?, rules.brand.hsv_tolerance);

    let scored: Vec<(VariantScore, Option<String>)> = variants
        .par_iter()
        .map(|v| score_variant(&v.path_post, rules, &matcher, strict_provenance))
        .collect();

    let mut scores = Vec::with_capacity(scored.len());
    let mut warnings = Vec::new();
    for (score, warning) in scored {
        scores.push(score);
        warnings.extend(warning);
    }
    let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
    let summary = ComplianceSummary::from_scores(&values);
    tracing::info!(avg = summary.avg, min = summary.min, "compliance scored");

    Ok(ComplianceReport {
        summary,
        scores,
        warnings,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compliance/score.rs"]
mod tests;
