use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::ScrapeError;
use crate::identity;

/// A source of candidate proxy addresses, one HTML listing page at a time.
#[async_trait]
pub trait ProxySource: Send + Sync {
    /// Fetch page `page` (1-based) of the listing and return its raw HTML.
    async fn fetch_page(&self, page: usize) -> Result<String, ScrapeError>;
    fn name(&self) -> &'static str;
}

/// Free-proxy listing with IP and port in the first two cells of each row of
/// the first table body, paginated by appending the page number to the URL.
pub struct TableListing {
    url_prefix: String,
    timeout: Duration,
}

impl TableListing {
    pub fn new(url_prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ProxySource for TableListing {
    async fn fetch_page(&self, page: usize) -> Result<String, ScrapeError> {
        let failed = |reason: String| ScrapeError::ProxyListingFetchFailed { page, reason };

        let url = format!("{}{}", self.url_prefix, page);
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| failed(e.to_string()))?;

        let resp = client
            .get(&url)
            .header(USER_AGENT, identity::random_user_agent())
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(failed(format!("status {}", resp.status())));
        }

        resp.text().await.map_err(|e| failed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "proxy-listing"
    }
}

/// Extract `ip:port` candidates from the first table body. Rows with fewer
/// than two cells are ignored; a page without a table body yields nothing.
pub fn parse_candidates(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let tbody_selector = Selector::parse("tbody").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let td_selector = Selector::parse("td").unwrap();

    let tbody = match doc.select(&tbody_selector).next() {
        Some(el) => el,
        None => return Vec::new(),
    };

    let mut out = Vec::new();
    for row in tbody.select(&row_selector) {
        let cols: Vec<_> = row.select(&td_selector).collect();
        if cols.len() < 2 {
            continue;
        }
        let ip = cols[0].text().collect::<String>();
        let port = cols[1].text().collect::<String>();
        let (ip, port) = (ip.trim(), port.trim());
        if !ip.is_empty() && !port.is_empty() {
            out.push(format!("{}:{}", ip, port));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <table>
          <thead><tr><th>IP</th><th>PORT</th><th>TYPE</th></tr></thead>
          <tbody>
            <tr><td> 1.2.3.4 </td><td>8080</td><td>HTTP</td></tr>
            <tr><td>5.6.7.8</td><td>3128</td><td>HTTP</td></tr>
            <tr><td>incomplete</td></tr>
          </tbody>
        </table>
        </body></html>"#;

    #[test]
    fn parses_ip_port_pairs_from_first_tbody() {
        let candidates = parse_candidates(LISTING);
        assert_eq!(candidates, vec!["1.2.3.4:8080", "5.6.7.8:3128"]);
    }

    #[test]
    fn page_without_table_body_yields_nothing() {
        assert!(parse_candidates("<html><body><p>blocked</p></body></html>").is_empty());
    }

    #[test]
    fn rows_with_empty_cells_are_ignored() {
        let html = "<table><tbody><tr><td></td><td>80</td></tr></tbody></table>";
        assert!(parse_candidates(html).is_empty());
    }
}
