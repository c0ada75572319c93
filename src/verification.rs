use std::time::Duration;

use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::Client;

use crate::identity;

/// Probe `probe_url` through `addr` (`host:port`) with a fresh random
/// User-Agent. True iff the request completes with a success status inside
/// `timeout`. Any parse, build, or transport error is false. No retry.
///
/// The proxy is registered for all schemes; https probes tunnel through the
/// proxy via CONNECT instead of bypassing it.
pub async fn validate_proxy(probe_url: &str, addr: &str, timeout: Duration) -> bool {
    let proxy = match reqwest::Proxy::all(format!("http://{}", addr)) {
        Ok(p) => p,
        Err(e) => {
            debug!("cannot parse proxy {}: {}", addr, e);
            return false;
        }
    };

    let client = match Client::builder()
        .proxy(proxy)
        .timeout(timeout)
        .pool_max_idle_per_host(0) // one-off request, no pooling
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            debug!("cannot build client for {}: {}", addr, e);
            return false;
        }
    };

    match client
        .get(probe_url)
        .header(USER_AGENT, identity::random_user_agent())
        .send()
        .await
    {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            debug!("proxy {} failed probe: {}", addr, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn https_probe_tunnels_through_the_proxy() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();
        std::thread::spawn(move || {
            if listener.accept().is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });

        // The listener never answers the CONNECT, so validation fails, but
        // the connection itself must land on the proxy, not on the target.
        let ok = validate_proxy(
            "https://127.0.0.1:9/",
            &addr.to_string(),
            Duration::from_secs(2),
        )
        .await;
        assert!(!ok);

        let was_reached = reached.load(Ordering::SeqCst);
        let _ = TcpStream::connect(addr); // unblock the accept thread
        assert!(was_reached, "https probe bypassed the proxy");
    }

    #[tokio::test]
    async fn unparseable_proxy_address_is_invalid() {
        let ok = validate_proxy(
            "https://127.0.0.1:9/",
            "not an address",
            Duration::from_secs(1),
        )
        .await;
        assert!(!ok);
    }
}
