use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use creatorhub::config::MarketplaceConfig;
use creatorhub::marketplace::{Clock, MarketplaceState, MemoryStore, SystemClock};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engines over a fresh process-local store.
pub(crate) fn build_marketplace(
    config: &MarketplaceConfig,
    clock: Arc<dyn Clock>,
) -> MarketplaceState<MemoryStore> {
    MarketplaceState::with_clock(Arc::new(MemoryStore::new()), clock, config)
}

pub(crate) fn system_marketplace(config: &MarketplaceConfig) -> MarketplaceState<MemoryStore> {
    build_marketplace(config, Arc::new(SystemClock))
}
