//! brandforge turns a campaign brief into branded image variants and scores them for brand
//! compliance.
//!
//! A run expands the brief into (product, ratio, locale, variant) units, renders each on a
//! bounded worker pool, and then checks the written posts from their pixels:
//!
//! - Load a [`Brief`] and [`BrandRules`]
//! - Pick a generation backend from a [`ProviderRegistry`]
//! - Call [`run_campaign`] and read the resulting [`RunReport`]
#![forbid(unsafe_code)]

pub mod assets {
    pub mod decode;
    pub mod font;
}
pub mod brief {
    pub mod model;
    pub mod rules;
}
pub mod color {
    pub mod contrast;
    pub mod hsv;
}
pub mod compliance {
    pub mod coverage;
    pub mod score;
}
/// Geometric composition of posts: resize, text block, logo.
pub mod compose {
    pub mod composite;
    pub mod logo;
    pub mod resize;
    pub mod text;
    pub mod variant;
}
pub mod foundation {
    pub mod core;
    pub mod error;
    pub(crate) mod math;
}
pub mod legal {
    pub mod scan;
}
pub mod output {
    pub mod provenance;
    pub mod storage;
}
/// Generation backends and their selection.
pub mod provider {
    pub mod backend;
    pub mod guard;
    pub mod local;
    pub mod registry;
    pub mod remote;
}
pub mod resolve {
    pub mod source;
}
pub mod run {
    pub mod digest;
    pub mod pipeline;
    pub mod report;
}

pub use crate::brief::model::{Brief, Product, load_brief};
pub use crate::brief::rules::{BrandRules, load_brand_rules};
pub use crate::compliance::score::{ComplianceSummary, VariantScore, score_run};
pub use crate::compose::variant::{DesignOverrides, VariantResult};
pub use crate::foundation::core::{CanvasSize, Rgb8};
pub use crate::foundation::error::{ForgeError, ForgeResult};
pub use crate::legal::scan::scan_legal;
pub use crate::provider::backend::{ImageProvider, ProviderCredentials, ProviderKind};
pub use crate::provider::guard::RetryPolicy;
pub use crate::provider::registry::ProviderRegistry;
pub use crate::run::digest::StatusDigest;
pub use crate::run::pipeline::{CancelToken, RunOptions, RunOutcome, rescore_report, run_campaign};
pub use crate::run::report::{RunReport, Shortfall};
