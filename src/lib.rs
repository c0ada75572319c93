//! Scrapes a paginated book-listing site through a self-built pool of free
//! proxies and appends the extracted records to a CSV file.

pub mod configuration;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod output;
pub mod pool;
pub mod proxy;
pub mod record;
pub mod source;
pub mod verification;

pub use proxy::ProxyPool;
pub use record::BookRecord;
