use futures::future::join_all;
use log::{info, warn};

use crate::configuration::Settings;
use crate::proxy::ProxyPool;
use crate::source::{self, ProxySource};
use crate::verification;

/// Scrape the configured number of listing pages, validate every candidate
/// against the probe URL, and collect the survivors in page-then-row order.
///
/// A listing page that fails to fetch is skipped with a warning, so the pool
/// may be built from fewer pages than configured. Candidates of one page are
/// validated concurrently; membership is complete before this returns.
pub async fn build_pool(source: &dyn ProxySource, settings: &Settings) -> ProxyPool {
    let mut validated = Vec::new();

    for page in 1..=settings.proxy_listing_pages {
        let html = match source.fetch_page(page).await {
            Ok(html) => html,
            Err(e) => {
                warn!("{} page {} skipped: {}", source.name(), page, e);
                tokio::time::sleep(settings.sleep()).await;
                continue;
            }
        };

        let candidates = source::parse_candidates(&html);
        info!(
            "{} page {}: {} candidates",
            source.name(),
            page,
            candidates.len()
        );

        let checks = candidates.iter().map(|addr| {
            verification::validate_proxy(&settings.probe_url, addr, settings.validate_timeout())
        });
        for (addr, ok) in candidates.iter().zip(join_all(checks).await) {
            if ok {
                info!("proxy {} is available", addr);
                validated.push(addr.clone());
            }
        }

        tokio::time::sleep(settings.sleep()).await;
    }

    ProxyPool::new(validated)
}
