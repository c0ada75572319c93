use std::time::Duration;

use log::{info, warn};
use reqwest::header::USER_AGENT;
use reqwest::Client;

use crate::identity;

/// Single GET with an optional outbound proxy and a fresh random User-Agent.
///
/// Any transport error yields `None` with a warning naming both the URL and
/// the cause. Non-success statuses (block pages, redirects to login) are also
/// treated as fetch failures rather than being handed to the extractor as
/// zero-entry pages. No retry, no backoff.
pub async fn fetch_page(url: &str, proxy: Option<&str>, timeout: Duration) -> Option<Vec<u8>> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(0);

    if let Some(addr) = proxy {
        // All schemes: https URLs tunnel through the proxy via CONNECT.
        match reqwest::Proxy::all(format!("http://{}", addr)) {
            Ok(p) => builder = builder.proxy(p),
            Err(e) => {
                warn!("invalid proxy {} for url {}: {}", addr, url, e);
                return None;
            }
        }
    }

    let client = match builder.build() {
        Ok(client) => client,
        Err(e) => {
            warn!("cannot build client, url: {}, cause: {}", url, e);
            return None;
        }
    };

    let ua = identity::random_user_agent();
    info!("GET {} via {} (ua: {})", url, proxy.unwrap_or("direct"), ua);

    let resp = match client.get(url).header(USER_AGENT, ua).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!("request failed, url: {}, cause: {}", url, e);
            return None;
        }
    };

    if !resp.status().is_success() {
        warn!("unexpected status {}, url: {}", resp.status(), url);
        return None;
    }

    match resp.bytes().await {
        Ok(body) => Some(body.to_vec()),
        Err(e) => {
            warn!("body read failed, url: {}, cause: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 on loopback is refused immediately, keeping these offline.

    #[tokio::test]
    async fn refused_connection_yields_none() {
        let body = fetch_page("http://127.0.0.1:1/", None, Duration::from_secs(1)).await;
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn unreachable_proxy_yields_none() {
        let body = fetch_page(
            "http://example.invalid/",
            Some("127.0.0.1:1"),
            Duration::from_secs(1),
        )
        .await;
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn malformed_proxy_address_yields_none() {
        let body = fetch_page(
            "http://example.invalid/",
            Some("not an address"),
            Duration::from_secs(1),
        )
        .await;
        assert!(body.is_none());
    }
}
