use anyhow::Result;
use log::{info, warn};

use bookgrab::configuration::Settings;
use bookgrab::extract::Extractor;
use bookgrab::fetch;
use bookgrab::output::CsvAppender;
use bookgrab::pool;
use bookgrab::source::TableListing;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn) // Default warn
        .filter_module("bookgrab", log::LevelFilter::Info) // bookgrab info
        .init();

    let settings = Settings::new()?;
    let appender = CsvAppender::create(&settings.output_path)?;

    let source = TableListing::new(settings.proxy_listing_url.clone(), settings.fetch_timeout());
    let mut pool = pool::build_pool(&source, &settings).await;
    if pool.is_empty() {
        warn!("proxy pool is empty, fetching directly");
    } else {
        info!("proxy pool ready: {} addresses", pool.live());
    }

    let extractor = Extractor::new();
    let mut written = 0usize;
    let mut skipped = 0usize;
    let mut failed_offsets = 0usize;

    for offset in settings.offsets() {
        let url = format!("{}{}", settings.listing_url, offset);
        let proxy = pool.pick().map(str::to_owned);

        match fetch::fetch_page(&url, proxy.as_deref(), settings.fetch_timeout()).await {
            Some(body) => {
                let page = extractor.extract(&body);
                written += page.records.len();
                skipped += page.skipped;
                appender.append(&page.records)?;
            }
            None => {
                failed_offsets += 1;
                if let Some(addr) = proxy {
                    warn!("marking proxy {} as failed", addr);
                    pool.mark_failed(&addr);
                }
            }
        }

        tokio::time::sleep(settings.sleep()).await;
    }

    info!(
        "done: {} records written, {} entries skipped, {} offsets failed to fetch",
        written, skipped, failed_offsets
    );
    Ok(())
}
