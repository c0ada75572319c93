use rand::seq::SliceRandom;

/// Validated proxy addresses in `host:port` form.
///
/// Picks are uniform with replacement among live entries. An address marked
/// failed is excluded from future picks but never removed or re-validated.
#[derive(Debug, Default)]
pub struct ProxyPool {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    addr: String,
    failed: bool,
}

impl ProxyPool {
    pub fn new(addrs: Vec<String>) -> Self {
        Self {
            entries: addrs
                .into_iter()
                .map(|addr| Entry { addr, failed: false })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries not yet marked failed.
    pub fn live(&self) -> usize {
        self.entries.iter().filter(|e| !e.failed).count()
    }

    /// Uniform random choice among live entries. None when exhausted.
    pub fn pick(&self) -> Option<&str> {
        let live: Vec<&Entry> = self.entries.iter().filter(|e| !e.failed).collect();
        let mut rng = rand::thread_rng();
        live.choose(&mut rng).map(|e| e.addr.as_str())
    }

    /// Exclude `addr` from future picks after a page fetch failed through it.
    pub fn mark_failed(&mut self, addr: &str) {
        for entry in &mut self.entries {
            if entry.addr == addr {
                entry.failed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ProxyPool {
        ProxyPool::new(vec!["1.1.1.1:80".into(), "2.2.2.2:8080".into()])
    }

    #[test]
    fn empty_pool_picks_nothing() {
        assert!(ProxyPool::new(Vec::new()).pick().is_none());
    }

    #[test]
    fn picks_only_live_entries() {
        let mut pool = pool();
        assert_eq!(pool.live(), 2);
        pool.mark_failed("1.1.1.1:80");
        assert_eq!(pool.live(), 1);
        for _ in 0..16 {
            assert_eq!(pool.pick(), Some("2.2.2.2:8080"));
        }
    }

    #[test]
    fn exhausted_pool_picks_nothing() {
        let mut pool = pool();
        pool.mark_failed("1.1.1.1:80");
        pool.mark_failed("2.2.2.2:8080");
        assert!(pool.pick().is_none());
        assert!(!pool.is_empty());
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn marking_unknown_address_is_a_noop() {
        let mut pool = pool();
        pool.mark_failed("9.9.9.9:3128");
        assert_eq!(pool.live(), 2);
    }
}
