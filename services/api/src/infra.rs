use goods_review::error::AppError;
use goods_review::workflows::assessment::{CatalogSeed, InMemoryCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn read_seed<R: Read>(reader: R) -> Result<CatalogSeed, AppError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Builds the in-memory catalog from a JSON seed, or an empty catalog without one.
pub(crate) fn load_catalog(seed_path: Option<&Path>) -> Result<InMemoryCatalog, AppError> {
    let Some(path) = seed_path else {
        warn!("no catalog seed configured; starting with an empty catalog");
        return Ok(InMemoryCatalog::default());
    };

    let file = std::fs::File::open(path)?;
    let seed = read_seed(std::io::BufReader::new(file))?;
    info!(
        path = %path.display(),
        goods = seed.goods.len(),
        line_items = seed.line_items.len(),
        cases = seed.cases.len(),
        "catalog seed loaded"
    );
    Ok(InMemoryCatalog::from_seed(seed))
}
