//! Health-aware server locator.

use futures_util::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::discovery::cache::{CacheEntry, ServerCache};
use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use crate::discovery::DirectoryFetcher;
use crate::health::{HealthProber, HealthState};
use crate::locator::query::ServerQuery;
use crate::server::{Language, ServerDescriptor, ServerType};
use crate::transport::{ReqwestTransport, TimedTransport, Transport, TransportError};

/// Finds a working game server for a language, server type or base.
///
/// The directory is downloaded on the first search and cached for the
/// lifetime of the locator. Servers that fail a probe are evicted for good.
/// Share one locator (e.g. behind an `Arc`) to share its cache.
pub struct ServerLocator {
    fetcher: DirectoryFetcher,
    prober: HealthProber,
    cache: ServerCache,
}

impl ServerLocator {
    /// Create a locator over an existing transport.
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            fetcher: DirectoryFetcher::new(transport.clone(), &config.discovery),
            prober: HealthProber::new(transport, &config.health_check),
            cache: ServerCache::new(),
        }
    }

    /// Create a locator with a reqwest transport built from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = ReqwestTransport::new(&config.transport)?;
        let transport: Arc<dyn Transport> = if config.observability.timing_enabled {
            Arc::new(TimedTransport::new(http))
        } else {
            Arc::new(http)
        };
        Ok(Self::new(transport, config))
    }

    /// A healthy server for `language` and `server_type`.
    pub async fn search(
        &self,
        language: Language,
        server_type: ServerType,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<Option<ServerDescriptor>> {
        self.search_matching(&ServerQuery::language(language).with_server_type(server_type), cancel)
            .await
    }

    /// A healthy server for `language`, any server type.
    pub async fn search_language(
        &self,
        language: Language,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<Option<ServerDescriptor>> {
        self.search_matching(&ServerQuery::language(language), cancel).await
    }

    /// A healthy server belonging to the logical base `base_id`.
    pub async fn search_by_base(
        &self,
        base_id: &str,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<Option<ServerDescriptor>> {
        self.search_matching(&ServerQuery::base(base_id), cancel).await
    }

    /// One healthy server per server type for `language`, ordered by type.
    ///
    /// Types without a healthy server are omitted.
    pub async fn search_all(
        &self,
        language: Language,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<Vec<ServerDescriptor>> {
        self.ensure_servers(cancel).await?;

        let searches = ServerType::ALL
            .into_iter()
            .map(|server_type| self.search(language, server_type, cancel));

        let mut servers = Vec::new();
        for result in join_all(searches).await {
            if let Some(server) = result? {
                servers.push(server);
            }
        }
        servers.sort_by_key(|server| server.server_type);
        Ok(servers)
    }

    /// A healthy server matching an arbitrary query.
    pub async fn search_matching(
        &self,
        query: &ServerQuery,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<Option<ServerDescriptor>> {
        self.ensure_servers(cancel).await?;

        let candidates = self.cache.snapshot(|server| query.matches(server));
        tracing::debug!(?query, candidates = candidates.len(), "Selecting server");

        let selected = self.select_healthy(candidates, cancel).await?;
        match &selected {
            Some(server) => tracing::debug!(url = %server.url, base_id = %server.base_id, "Server selected"),
            None => tracing::info!(?query, "No healthy server found"),
        }
        Ok(selected)
    }

    /// Number of servers still cached (not evicted).
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    async fn ensure_servers(&self, cancel: &CancellationToken) -> DiscoveryResult<()> {
        self.cache
            .ensure_populated(|| self.fetcher.fetch(cancel), cancel)
            .await
    }

    async fn select_healthy(
        &self,
        candidates: Vec<Arc<CacheEntry>>,
        cancel: &CancellationToken,
    ) -> DiscoveryResult<Option<ServerDescriptor>> {
        for entry in rank_candidates(candidates) {
            if cancel.is_cancelled() {
                return Err(DiscoveryError::Cancelled);
            }

            match entry.health.get() {
                HealthState::Healthy => return Ok(Some(entry.descriptor.clone())),
                // Evicted by a concurrent search since the snapshot.
                HealthState::Unhealthy => continue,
                HealthState::Unknown => {}
            }

            if self.prober.probe(&entry.descriptor.url, cancel).await? {
                if entry.health.mark_healthy() {
                    return Ok(Some(entry.descriptor.clone()));
                }
                continue;
            }

            if self.cache.evict(&entry) {
                tracing::info!(
                    url = %entry.descriptor.url,
                    base_id = %entry.descriptor.base_id,
                    remaining = self.cache.len(),
                    "Evicted unhealthy server"
                );
            }
        }

        Ok(None)
    }
}

/// Healthy entries first, discovery order kept within each class.
///
/// Each health flag is read once, so concurrent marks cannot disturb the sort.
fn rank_candidates(candidates: Vec<Arc<CacheEntry>>) -> Vec<Arc<CacheEntry>> {
    let mut ranked: Vec<(bool, Arc<CacheEntry>)> = candidates
        .into_iter()
        .map(|entry| (!entry.health.is_healthy(), entry))
        .collect();
    ranked.sort_by_key(|(not_healthy, _)| *not_healthy);
    ranked.into_iter().map(|(_, entry)| entry).collect()
}
