//! Run report assembly and persistence (`report.json` + `report.csv`).

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    compliance::score::{ComplianceReport, ComplianceSummary, VariantScore},
    compose::variant::VariantResult,
    foundation::error::{ForgeError, ForgeResult},
    output::storage::{write_json, write_text},
};

pub const REPORT_JSON: &str = "report.json";
pub const REPORT_CSV: &str = "report.csv";
pub const CSV_HEADER: &str =
    "campaign_id,product_id,ratio,locale,seed,path_post,path_hero,provider";

/// A unit that did not produce a variant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Shortfall {
    pub product_id: String,
    pub ratio: String,
    pub locale: String,
    pub variant_index: u32,
    pub reason: String,
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} v{}: {}",
            self.product_id, self.ratio, self.locale, self.variant_index, self.reason
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunTotals {
    pub variants: usize,
    pub expected: usize,
    pub shortfalls: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub campaign_id: String,
    pub provider: String,
    #[serde(default)]
    pub markets: Vec<String>,
    pub totals: RunTotals,
    pub variants: Vec<VariantResult>,
    #[serde(default)]
    pub compliance: ComplianceSummary,
    #[serde(default)]
    pub scores: Vec<VariantScore>,
    #[serde(default)]
    pub legal_flags: Vec<String>,
    #[serde(default)]
    pub shortfalls: Vec<Shortfall>,
    /// Run-level warnings such as skipped ratio tokens.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Strict-provenance findings from the latest scoring pass.
    #[serde(default)]
    pub scoring_warnings: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
}

/// UTC timestamp run id, e.g. `20260315T101500Z`.
pub fn run_id_now() -> String {
    chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn report_dir(runs_dir: &Path, run_id: &str) -> PathBuf {
    runs_dir.join(run_id)
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

impl RunReport {
    /// Replace scoring results wholesale; earlier scores never leak into a new pass.
    pub fn apply_compliance(&mut self, compliance: ComplianceReport) {
        self.compliance = compliance.summary;
        self.scores = compliance.scores;
        self.scoring_warnings = compliance.warnings;
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for v in &self.variants {
            let seed = v.seed.map(|s| s.to_string()).unwrap_or_default();
            let hero = v
                .path_hero
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let row = [
                csv_field(&v.campaign_id),
                csv_field(&v.product_id),
                csv_field(&v.ratio),
                csv_field(&v.locale),
                seed,
                csv_field(&v.path_post.display().to_string()),
                csv_field(&hero),
                csv_field(&v.provider),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }

    /// Write `report.json` and `report.csv` into `dir`; returns the JSON path.
    pub fn save(&self, dir: &Path) -> ForgeResult<PathBuf> {
        let json_path = dir.join(REPORT_JSON);
        write_json(&json_path, self)?;
        write_text(&dir.join(REPORT_CSV), &self.to_csv())?;
        Ok(json_path)
    }

    pub fn load(path: &Path) -> ForgeResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| ForgeError::storage(format!("read report '{}': {e}", path.display())))?;
        let report = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse report '{}'", path.display()))?;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/run/report.rs"]
mod tests;
