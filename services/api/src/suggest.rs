use crate::infra::load_catalog;
use clap::Args;
use goods_review::config::AppConfig;
use goods_review::error::AppError;
use goods_review::telemetry;
use goods_review::workflows::report_summary::SummaryRemap;
use goods_review::workflows::suggestions::{candidates, load_remap, SummarySuggester};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
    /// Path of the CSV receiving matched suggestions
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Optional CSV receiving rows with no suggested subject
    #[arg(long)]
    pub(crate) unmatched: Option<PathBuf>,
    /// Optional `original,corrected` CSV applied before matching
    #[arg(long)]
    pub(crate) remap: Option<PathBuf>,
    /// Caseworker frontend base used for product links (defaults to APP_CASE_BASE_URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    /// Catalog seed to read line items from (defaults to APP_SEED_PATH)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) fn run_suggest(args: SuggestArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let seed_path = args.seed.or(config.review.seed_path);
    let catalog = load_catalog(seed_path.as_deref())?;

    let remap = match &args.remap {
        Some(path) => load_remap(path)?,
        None => SummaryRemap::default(),
    };
    let base_url = args.base_url.or(config.review.case_base_url);

    let suggester = SummarySuggester::from_store(&catalog, remap, base_url)?;
    let candidates = candidates(&catalog)?;
    let report = suggester.suggest(&candidates);

    report.write_matched(BufWriter::new(File::create(&args.output)?))?;
    info!(path = %args.output.display(), rows = report.matched.len(), "saved suggestions");

    if let Some(path) = &args.unmatched {
        report.write_unmatched(BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), rows = report.unmatched.len(), "saved unmatched rows");
    }

    Ok(())
}
