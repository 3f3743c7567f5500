use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use hireline::config::MarketplaceConfig;
use hireline::marketplace::{Clock, InMemoryStore, InMemoryUploader, Marketplace, SystemClock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local marketplace used by `serve` until a persistent store is wired in.
pub(crate) fn in_memory_marketplace(config: MarketplaceConfig) -> Arc<Marketplace<InMemoryStore>> {
    marketplace_with_clock(config, Arc::new(SystemClock))
}

pub(crate) fn marketplace_with_clock(
    config: MarketplaceConfig,
    clock: Arc<dyn Clock>,
) -> Arc<Marketplace<InMemoryStore>> {
    Arc::new(Marketplace::new(
        Arc::new(InMemoryStore::new()),
        clock,
        Arc::new(InMemoryUploader::default()),
        config,
    ))
}
