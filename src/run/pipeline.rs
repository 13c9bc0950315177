//! Campaign run orchestration: expand work units, render them on a bounded pool, then score.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use rayon::prelude::*;

use crate::{
    assets::{
        decode::{Logo, load_logo},
        font::{TextLayoutEngine, resolve_font},
    },
    brief::{
        model::{Brief, check_path_token},
        rules::BrandRules,
    },
    compliance::score::score_run,
    compose::variant::{Compositor, DesignOverrides, VariantKey, VariantResult},
    foundation::{
        core::CanvasSize,
        error::{ForgeError, ForgeResult},
    },
    legal::scan::{load_prohibited_terms, scan_legal},
    provider::{
        guard::RetryPolicy,
        local::DEFAULT_SEED,
        registry::{AUTO, ProviderRegistry},
    },
    resolve::source::{HeroOrigin, SourceResolver},
    run::report::{RunReport, RunTotals, Shortfall, report_dir, run_id_now},
};

pub const CANCELLED_REASON: &str = "cancelled";

/// Knobs for a single campaign run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Ratio tokens to render; the brief's list when `None`.
    pub ratios: Option<Vec<String>>,
    /// Locales to render; the brief's list when `None`.
    pub locales: Option<Vec<String>>,
    pub max_variants: u32,
    /// Base seed; variant `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Worker threads; CPU count when `None`.
    pub threads: Option<usize>,
    pub provider: String,
    pub out_dir: PathBuf,
    pub runs_dir: PathBuf,
    pub run_id: Option<String>,
    pub overrides: DesignOverrides,
    pub prohibited_terms: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub strict_provenance: bool,
    /// Anchor for relative `base_asset` paths; usually the brief's directory.
    pub asset_root: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ratios: None,
            locales: None,
            max_variants: 1,
            seed: None,
            threads: None,
            provider: AUTO.to_string(),
            out_dir: PathBuf::from("outputs"),
            runs_dir: PathBuf::from("runs"),
            run_id: None,
            overrides: DesignOverrides::default(),
            prohibited_terms: None,
            retry: RetryPolicy::default(),
            strict_provenance: false,
            asset_root: PathBuf::from("."),
        }
    }
}

/// Shared cancellation flag. Units not yet started when it is set are skipped.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One (product, ratio, locale, variant) cell of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkUnit {
    pub product_index: usize,
    pub ratio: String,
    pub size: CanvasSize,
    pub locale: String,
    pub variant_index: u32,
    pub seed: u64,
}

/// Expanded units plus warnings for ratio tokens that were skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitPlan {
    pub units: Vec<WorkUnit>,
    pub warnings: Vec<String>,
}

/// Expand the product x ratio x locale x variant grid, in that order.
///
/// Unknown ratio tokens are dropped with a warning. Ratio and locale tokens are trimmed and
/// deduplicated in first-seen order so no two units share output paths.
pub fn expand_units(
    product_count: usize,
    ratios: &[String],
    locales: &[String],
    max_variants: u32,
    base_seed: Option<u64>,
) -> UnitPlan {
    let mut plan = UnitPlan::default();
    let mut known: Vec<(String, CanvasSize)> = Vec::with_capacity(ratios.len());
    for r in ratios {
        let token = r.trim();
        if known.iter().any(|(seen, _)| seen == token) {
            continue;
        }
        match CanvasSize::for_ratio(token) {
            Some(size) => known.push((token.to_string(), size)),
            None => {
                tracing::warn!(ratio = %r, "unknown aspect ratio; skipping");
                plan.warnings.push(format!("unknown aspect ratio '{r}' skipped"));
            }
        }
    }

    let mut unique_locales: Vec<String> = Vec::with_capacity(locales.len());
    for l in locales {
        let token = l.trim();
        if !unique_locales.iter().any(|seen| seen == token) {
            unique_locales.push(token.to_string());
        }
    }

    let base = base_seed.unwrap_or(DEFAULT_SEED);
    for product_index in 0..product_count {
        for (ratio, size) in &known {
            for locale in &unique_locales {
                for variant_index in 0..max_variants {
                    plan.units.push(WorkUnit {
                        product_index,
                        ratio: ratio.clone(),
                        size: *size,
                        locale: locale.clone(),
                        variant_index,
                        seed: base.wrapping_add(u64::from(variant_index)),
                    });
                }
            }
        }
    }
    plan
}

/// Finished run: the persisted report and where it was written.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub report_path: PathBuf,
}

fn build_pool(threads: Option<usize>) -> ForgeResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ForgeError::configuration(format!("failed to build rayon thread pool: {e}")))
}

fn load_optional_logo(rules: &BrandRules) -> Option<Logo> {
    let path = rules.brand.logo_path.as_deref()?;
    match load_logo(path) {
        Ok(logo) => Some(logo),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "logo unavailable; skipping logo placement");
            None
        }
    }
}

struct UnitContext<'a> {
    brief: &'a Brief,
    resolver: &'a SourceResolver,
    compositor: &'a Compositor,
    cancel: &'a CancelToken,
}

enum UnitOutcome {
    Done(VariantResult),
    Failed(Shortfall),
}

fn shortfall(brief: &Brief, unit: &WorkUnit, reason: String) -> Shortfall {
    Shortfall {
        product_id: brief.products[unit.product_index].id.clone(),
        ratio: unit.ratio.clone(),
        locale: unit.locale.clone(),
        variant_index: unit.variant_index,
        reason,
    }
}

fn run_unit(
    ctx: &UnitContext<'_>,
    unit: &WorkUnit,
    engine: &mut TextLayoutEngine,
) -> ForgeResult<VariantResult> {
    let product = &ctx.brief.products[unit.product_index];
    let hero = ctx.resolver.resolve(
        ctx.brief,
        product,
        unit.size,
        &unit.locale,
        Some(unit.seed),
    )?;
    let key = VariantKey {
        product_id: product.id.clone(),
        ratio: unit.ratio.clone(),
        locale: unit.locale.clone(),
        variant_index: unit.variant_index,
        seed: matches!(hero.origin, HeroOrigin::Generated { .. }).then_some(unit.seed),
    };
    ctx.compositor
        .render_variant(ctx.brief, &key, &hero, ctx.resolver.provider_name(), engine)
}

fn execute_unit(
    ctx: &UnitContext<'_>,
    unit: &WorkUnit,
    engine: &mut TextLayoutEngine,
) -> UnitOutcome {
    if ctx.cancel.is_cancelled() {
        return UnitOutcome::Failed(shortfall(ctx.brief, unit, CANCELLED_REASON.to_string()));
    }
    match run_unit(ctx, unit, engine) {
        Ok(v) => UnitOutcome::Done(v),
        Err(e) => {
            let s = shortfall(ctx.brief, unit, e.to_string());
            tracing::warn!(
                product = %s.product_id,
                ratio = %s.ratio,
                locale = %s.locale,
                v = s.variant_index,
                error = %e,
                "unit failed"
            );
            UnitOutcome::Failed(s)
        }
    }
}

/// Render every unit of `brief`, then scan copy, score the variants and persist the report.
#[tracing::instrument(skip_all, fields(campaign = %brief.campaign_id))]
pub fn run_campaign(
    brief: &Brief,
    rules: &BrandRules,
    registry: &ProviderRegistry,
    opts: &RunOptions,
    cancel: &CancelToken,
) -> ForgeResult<RunOutcome> {
    brief.validate()?;
    rules.validate()?;
    if opts.max_variants == 0 {
        return Err(ForgeError::configuration("max_variants must be >= 1"));
    }

    let provider = registry.select(&opts.provider)?;
    let resolver = SourceResolver::new(provider.clone(), &opts.asset_root)
        .with_extra_hints(opts.overrides.prompt_hints.clone());
    if !provider.health_check() && !brief.products.iter().any(|p| resolver.has_base_asset(p)) {
        return Err(ForgeError::generation(format!(
            "provider '{}' is unhealthy and no product has a usable base asset",
            provider.name()
        )));
    }

    let terms = match &opts.prohibited_terms {
        Some(path) => load_prohibited_terms(path)?,
        None => Vec::new(),
    };

    let ratios = opts.ratios.as_ref().unwrap_or(&brief.aspect_ratios);
    let locales: Vec<String> = match &opts.locales {
        Some(l) => {
            for loc in l {
                check_path_token("locale", loc)?;
            }
            l.clone()
        }
        None if !brief.locales.is_empty() => brief.locales.clone(),
        None => brief.message.keys().cloned().collect(),
    };
    let plan = expand_units(
        brief.products.len(),
        ratios,
        &locales,
        opts.max_variants,
        opts.seed,
    );

    let compositor = Compositor::new(
        rules.clone(),
        load_optional_logo(rules),
        resolve_font(rules.overlay.text_font.as_deref()),
        opts.overrides.clone(),
        &opts.out_dir,
    );
    let ctx = UnitContext {
        brief,
        resolver: &resolver,
        compositor: &compositor,
        cancel,
    };

    tracing::info!(
        units = plan.units.len(),
        provider = provider.name(),
        "starting campaign run"
    );
    let pool = build_pool(opts.threads)?;
    let outcomes: Vec<UnitOutcome> = pool.install(|| {
        plan.units
            .par_iter()
            .map_init(TextLayoutEngine::new, |engine, unit| {
                execute_unit(&ctx, unit, engine)
            })
            .collect()
    });

    let mut variants = Vec::new();
    let mut shortfalls = Vec::new();
    for outcome in outcomes {
        match outcome {
            UnitOutcome::Done(v) => variants.push(v),
            UnitOutcome::Failed(s) => shortfalls.push(s),
        }
    }

    let legal_flags = scan_legal(brief, &terms);
    if !legal_flags.is_empty() {
        tracing::warn!(flags = ?legal_flags, "prohibited terms found in copy");
    }
    let compliance = pool.install(|| score_run(&variants, rules, opts.strict_provenance))?;

    let run_id = opts.run_id.clone().unwrap_or_else(run_id_now);
    let mut report = RunReport {
        run_id,
        campaign_id: brief.campaign_id.clone(),
        provider: provider.name().to_string(),
        markets: brief.markets.clone(),
        totals: RunTotals {
            variants: variants.len(),
            expected: plan.units.len(),
            shortfalls: shortfalls.len(),
        },
        variants,
        compliance: Default::default(),
        scores: Vec::new(),
        legal_flags,
        shortfalls,
        warnings: plan.warnings,
        scoring_warnings: Vec::new(),
        cancelled: cancel.is_cancelled(),
    };
    report.apply_compliance(compliance);

    let report_path = report.save(&report_dir(&opts.runs_dir, &report.run_id))?;
    tracing::info!(
        variants = report.totals.variants,
        expected = report.totals.expected,
        avg = report.compliance.avg,
        path = %report_path.display(),
        "campaign run finished"
    );
    Ok(RunOutcome {
        report,
        report_path,
    })
}

/// Recompute compliance for an existing `report.json` and rewrite it in place.
#[tracing::instrument(skip(rules))]
pub fn rescore_report(
    report_path: &Path,
    rules: &BrandRules,
    strict_provenance: bool,
) -> ForgeResult<RunReport> {
    rules.validate()?;
    let mut report = RunReport::load(report_path)?;
    let compliance = score_run(&report.variants, rules, strict_provenance)?;
    report.apply_compliance(compliance);
    let dir = report_path.parent().unwrap_or_else(|| Path::new("."));
    report.save(dir)?;
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/run/pipeline.rs"]
mod tests;
