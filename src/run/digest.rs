use std::fmt::Write as _;

use crate::run::report::{RunReport, Shortfall};

pub const DEFAULT_ETA_MINUTES: u32 = 30;

/// Plain-text status summary of a run, suitable for pasting into an email or chat.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusDigest {
    pub campaign_id: String,
    pub markets: Vec<String>,
    pub provider: String,
    pub run_id: String,
    pub variants_expected: usize,
    pub variants_generated: usize,
    pub compliance_avg: f64,
    pub compliance_min: f64,
    pub legal_flags: Vec<String>,
    pub shortfalls: Vec<Shortfall>,
    pub requested_actions: Vec<String>,
    pub eta_next_update_minutes: u32,
}

impl StatusDigest {
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            campaign_id: report.campaign_id.clone(),
            markets: report.markets.clone(),
            provider: report.provider.clone(),
            run_id: report.run_id.clone(),
            variants_expected: report.totals.expected,
            variants_generated: report.totals.variants,
            compliance_avg: report.compliance.avg,
            compliance_min: report.compliance.min,
            legal_flags: report.legal_flags.clone(),
            shortfalls: report.shortfalls.clone(),
            requested_actions: Vec::new(),
            eta_next_update_minutes: DEFAULT_ETA_MINUTES,
        }
    }

    pub fn with_requested_actions(mut self, actions: Vec<String>) -> Self {
        self.requested_actions = actions;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Campaign: {}", self.campaign_id);
        let _ = writeln!(out, "Provider: {}  Run: {}", self.provider, self.run_id);
        let _ = writeln!(out, "Markets: {}", self.markets.join(", "));
        out.push('\n');
        let _ = writeln!(
            out,
            "Variants: {}/{}",
            self.variants_generated, self.variants_expected
        );
        let _ = writeln!(
            out,
            "Compliance avg/min: {:.1}/{:.1}",
            self.compliance_avg, self.compliance_min
        );
        if !self.legal_flags.is_empty() {
            let _ = writeln!(out, "Legal flags: {}", self.legal_flags.join(", "));
        }
        if !self.shortfalls.is_empty() {
            out.push_str("Shortfalls:\n");
            for s in &self.shortfalls {
                let _ = writeln!(out, "- {} {}: {}", s.product_id, s.ratio, s.reason);
            }
        }
        if !self.requested_actions.is_empty() {
            out.push_str("\nRequested actions:\n");
            for a in &self.requested_actions {
                let _ = writeln!(out, "- {a}");
            }
        }
        out.push('\n');
        let _ = write!(
            out,
            "Next update in ~{} minutes",
            self.eta_next_update_minutes
        );
        out
    }
}
