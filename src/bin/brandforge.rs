use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "brandforge", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every variant of a brief, score it, and write the run report.
    Generate(GenerateArgs),
    /// Re-score an existing report.json in place.
    Score(ScoreArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Campaign brief JSON.
    #[arg(long)]
    brief: PathBuf,

    /// Brand rules (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Local brand rules override, deep-merged over `--rules`.
    #[arg(long)]
    local_rules: Option<PathBuf>,

    /// Output root for rendered images.
    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    /// Root for run reports.
    #[arg(long, default_value = "runs")]
    runs: PathBuf,

    /// Generation provider: auto, local, firefly, openai.
    #[arg(long, default_value = "auto")]
    provider: String,

    /// Comma-separated ratio tokens; defaults to the brief's list.
    #[arg(long, value_delimiter = ',')]
    ratios: Option<Vec<String>>,

    /// Comma-separated locales; defaults to the brief's list.
    #[arg(long, value_delimiter = ',')]
    locales: Option<Vec<String>>,

    #[arg(long, default_value_t = 1)]
    max_variants: u32,

    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to CPU count).
    #[arg(long)]
    threads: Option<usize>,

    /// Prohibited terms, one per line.
    #[arg(long)]
    prohibited_terms: Option<PathBuf>,

    #[arg(long)]
    run_id: Option<String>,

    #[arg(long)]
    headline: Option<String>,

    #[arg(long)]
    cta: Option<String>,

    #[arg(long)]
    font_size: Option<f32>,

    /// Logo area percentage, clamped into the rule range.
    #[arg(long)]
    logo_pct: Option<f64>,

    /// Extra prompt hints appended to every product's hints.
    #[arg(long)]
    prompt_hints: Option<String>,

    /// Record provenance sidecars missing `logo_area_pct` as report warnings.
    #[arg(long)]
    strict_provenance: bool,

    /// Print the plain-text status digest after the run.
    #[arg(long)]
    digest: bool,
}

#[derive(Parser, Debug)]
struct ScoreArgs {
    /// Path to an existing report.json.
    #[arg(long)]
    report: PathBuf,

    #[arg(long)]
    rules: Option<PathBuf>,

    #[arg(long)]
    local_rules: Option<PathBuf>,

    #[arg(long)]
    strict_provenance: bool,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("brandforge=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Score(args) => cmd_score(args),
    }
}

/// Cancel `token` on the first Ctrl-C; a second Ctrl-C exits immediately.
fn cancel_on_ctrl_c(token: brandforge::CancelToken) {
    let spawned = std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!(error = %e, "signal runtime unavailable; Ctrl-C will not cancel");
                    return;
                }
            };
            rt.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                tracing::warn!("interrupt received; skipping remaining units and writing a partial report");
                token.cancel();
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(130);
                }
            });
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to spawn Ctrl-C listener");
    }
}

fn read_rules(base: Option<&Path>, local: Option<&Path>) -> anyhow::Result<brandforge::BrandRules> {
    match base {
        Some(path) => Ok(brandforge::load_brand_rules(path, local)?),
        None => Ok(brandforge::BrandRules::default()),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let brief = brandforge::load_brief(&args.brief)?;
    let rules = read_rules(args.rules.as_deref(), args.local_rules.as_deref())?;

    let retry = brandforge::RetryPolicy::default();
    let creds = brandforge::ProviderCredentials::from_env();
    let registry = brandforge::ProviderRegistry::with_credentials(&creds, retry);

    let opts = brandforge::RunOptions {
        ratios: args.ratios,
        locales: args.locales,
        max_variants: args.max_variants,
        seed: args.seed,
        threads: args.threads,
        provider: args.provider,
        out_dir: args.out,
        runs_dir: args.runs,
        run_id: args.run_id,
        overrides: brandforge::DesignOverrides {
            headline: args.headline,
            cta: args.cta,
            font_size: args.font_size,
            logo_area_pct: args.logo_pct,
            prompt_hints: args.prompt_hints,
        },
        prohibited_terms: args.prohibited_terms,
        retry,
        strict_provenance: args.strict_provenance,
        asset_root: args
            .brief
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let cancel = brandforge::CancelToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let outcome = brandforge::run_campaign(&brief, &rules, &registry, &opts, &cancel)
        .with_context(|| format!("run campaign '{}'", brief.campaign_id))?;

    let r = &outcome.report;
    println!(
        "variants: {}/{}  compliance avg/min: {:.2}/{:.2}  report: {}",
        r.totals.variants,
        r.totals.expected,
        r.compliance.avg,
        r.compliance.min,
        outcome.report_path.display()
    );
    if r.cancelled {
        println!("run cancelled; report is partial");
    }
    for s in &r.shortfalls {
        println!("shortfall: {s}");
    }
    if !r.legal_flags.is_empty() {
        println!("legal flags: {}", r.legal_flags.join(", "));
    }
    if args.digest {
        println!();
        println!("{}", brandforge::StatusDigest::from_report(r).render());
    }
    Ok(())
}

fn cmd_score(args: ScoreArgs) -> anyhow::Result<()> {
    let rules = read_rules(args.rules.as_deref(), args.local_rules.as_deref())?;
    let report = brandforge::rescore_report(&args.report, &rules, args.strict_provenance)
        .with_context(|| format!("re-score '{}'", args.report.display()))?;
    println!(
        "variants: {}  compliance avg/min: {:.2}/{:.2}",
        report.variants.len(),
        report.compliance.avg,
        report.compliance.min
    );
    for w in &report.scoring_warnings {
        println!("warning: {w}");
    }
    Ok(())
}
