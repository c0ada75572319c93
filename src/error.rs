use thiserror::Error;

/// Recoverable scraping errors. Both variants are skipped over by their
/// callers rather than aborting the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A free-proxy listing page could not be fetched; the pool builder
    /// continues with fewer pages.
    #[error("proxy listing page {page} fetch failed: {reason}")]
    ProxyListingFetchFailed { page: usize, reason: String },

    /// A book block is missing an expected element; the extractor skips
    /// the block and counts it.
    #[error("malformed entry, missing {0}")]
    MalformedEntry(&'static str),
}
