//! Per-locator server cache.
//!
//! # Responsibilities
//! - Populate exactly once under concurrent callers
//! - Hold entries with their health flag
//! - Remove evicted entries permanently

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use crate::health::AtomicHealth;
use crate::observability::metrics;
use crate::server::ServerDescriptor;

/// A discovered server and its last known health.
#[derive(Debug)]
pub(crate) struct CacheEntry {
    /// Position in the directory document; defines the stable order.
    pub index: usize,
    pub descriptor: ServerDescriptor,
    pub health: AtomicHealth,
}

#[derive(Debug, Default)]
struct InitState {
    last_error: Option<DiscoveryError>,
}

#[derive(Debug, Default)]
pub(crate) struct ServerCache {
    entries: DashMap<usize, Arc<CacheEntry>>,
    populated: AtomicBool,
    /// Completed fetch attempts that failed for a reason other than cancellation.
    failed_attempts: AtomicU64,
    init: Mutex<InitState>,
}

impl ServerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }

    /// Run `fetch` and store its result unless the cache is already populated.
    ///
    /// Callers that queued behind an attempt which then failed receive that
    /// attempt's error instead of fetching again. A later call retries.
    pub async fn ensure_populated<F, Fut>(
        &self,
        fetch: F,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DiscoveryResult<Vec<ServerDescriptor>>>,
    {
        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }
        if self.is_populated() {
            return Ok(());
        }

        let observed_failures = self.failed_attempts.load(Ordering::Acquire);
        let mut state = tokio::select! {
            guard = self.init.lock() => guard,
            _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
        };

        if self.is_populated() {
            return Ok(());
        }
        if self.failed_attempts.load(Ordering::Acquire) != observed_failures {
            if let Some(e) = &state.last_error {
                return Err(e.clone());
            }
        }

        match fetch().await {
            Ok(servers) => {
                for (index, descriptor) in servers.into_iter().enumerate() {
                    self.entries.insert(
                        index,
                        Arc::new(CacheEntry {
                            index,
                            descriptor,
                            health: AtomicHealth::new(),
                        }),
                    );
                }
                state.last_error = None;
                self.populated.store(true, Ordering::Release);
                metrics::record_cache_size(self.entries.len());
                Ok(())
            }
            Err(DiscoveryError::Cancelled) => Err(DiscoveryError::Cancelled),
            Err(e) => {
                state.last_error = Some(e.clone());
                self.failed_attempts.fetch_add(1, Ordering::AcqRel);
                Err(e)
            }
        }
    }

    /// Live entries accepted by `filter`, in discovery order.
    pub fn snapshot<P>(&self, filter: P) -> Vec<Arc<CacheEntry>>
    where
        P: Fn(&ServerDescriptor) -> bool,
    {
        let mut matching: Vec<Arc<CacheEntry>> = self
            .entries
            .iter()
            .filter(|r| filter(&r.value().descriptor))
            .map(|r| r.value().clone())
            .collect();
        matching.sort_by_key(|entry| entry.index);
        matching
    }

    /// Remove an entry for the rest of the cache's lifetime.
    ///
    /// Returns false if another search already removed it.
    pub fn evict(&self, entry: &CacheEntry) -> bool {
        entry.health.mark_unhealthy();
        let removed = self.entries.remove(&entry.index).is_some();
        if removed {
            metrics::record_eviction();
            metrics::record_cache_size(self.entries.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{Language, ServerType};
    use crate::transport::TransportError;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn servers() -> Vec<ServerDescriptor> {
        vec![
            ServerDescriptor::new(Language::English, ServerType::Person, "b1", "https://a"),
            ServerDescriptor::new(Language::English, ServerType::Animal, "b2", "https://b"),
            ServerDescriptor::new(Language::French, ServerType::Person, "b3", "https://c"),
        ]
    }

    fn failure() -> DiscoveryError {
        DiscoveryError::Transport(TransportError::Request {
            url: "https://dir".into(),
            message: "connection refused".into(),
        })
    }

    #[tokio::test]
    async fn test_concurrent_population_fetches_once() {
        let cache = Arc::new(ServerCache::new());
        let fetches = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let fetches = fetches.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .ensure_populated(
                        || async {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(servers())
                        },
                        &cancel,
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = ServerCache::new();
        let cancel = CancellationToken::new();

        let err = cache
            .ensure_populated(|| async { Err(failure()) }, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, failure());
        assert!(!cache.is_populated());
        assert_eq!(cache.len(), 0);

        cache
            .ensure_populated(|| async { Ok(servers()) }, &cancel)
            .await
            .unwrap();
        assert!(cache.is_populated());
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_waiters_share_a_failed_attempt() {
        let cache = Arc::new(ServerCache::new());
        let fetches = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let fetches = fetches.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .ensure_populated(
                        || async {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(200)).await;
                            Err(failure())
                        },
                        &cancel,
                    )
                    .await
            }));
            // Give the first task time to take the lock before the rest queue up.
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Err(failure()));
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_fetch_running() {
        let cache = Arc::new(ServerCache::new());
        let keep = CancellationToken::new();

        let fetching = {
            let cache = cache.clone();
            let keep = keep.clone();
            tokio::spawn(async move {
                cache
                    .ensure_populated(
                        || async {
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(servers())
                        },
                        &keep,
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        let give_up = CancellationToken::new();
        let waiter = {
            let cache = cache.clone();
            let give_up = give_up.clone();
            tokio::spawn(async move {
                cache
                    .ensure_populated(|| async { Ok(Vec::new()) }, &give_up)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        give_up.cancel();

        assert_eq!(waiter.await.unwrap(), Err(DiscoveryError::Cancelled));
        fetching.await.unwrap().unwrap();
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_holder_lets_waiter_fetch() {
        let cache = Arc::new(ServerCache::new());
        let fetches = Arc::new(AtomicUsize::new(0));
        let holder_cancel = CancellationToken::new();

        let holder = {
            let cache = cache.clone();
            let fetches = fetches.clone();
            let token = holder_cancel.clone();
            tokio::spawn(async move {
                cache
                    .ensure_populated(
                        || async {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            token.cancelled().await;
                            Err(DiscoveryError::Cancelled)
                        },
                        &token,
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let waiter = {
            let cache = cache.clone();
            let fetches = fetches.clone();
            tokio::spawn(async move {
                cache
                    .ensure_populated(
                        || async {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            Ok(servers()[..1].to_vec())
                        },
                        &CancellationToken::new(),
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        holder_cancel.cancel();

        assert_eq!(holder.await.unwrap(), Err(DiscoveryError::Cancelled));
        assert_eq!(waiter.await.unwrap(), Ok(()));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.is_populated());
    }

    #[tokio::test]
    async fn test_snapshot_order_and_eviction() {
        let cache = ServerCache::new();
        let cancel = CancellationToken::new();
        cache
            .ensure_populated(|| async { Ok(servers()) }, &cancel)
            .await
            .unwrap();

        let english = cache.snapshot(|d| d.language == Language::English);
        let urls: Vec<_> = english.iter().map(|e| e.descriptor.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://b"]);

        assert!(cache.evict(&english[0]));
        assert!(!cache.evict(&english[0]));
        assert_eq!(cache.len(), 2);

        let all = cache.snapshot(|_| true);
        let urls: Vec<_> = all.iter().map(|e| e.descriptor.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b", "https://c"]);
    }
}
