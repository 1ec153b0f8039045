use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use territoires_shared::{Registry, render_empty_surface};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::{upstream_connect_timeout, upstream_http_timeout};

/// Registry currently in effect. Replaced wholesale on every import.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub revision: u64,
    pub registry: Arc<Registry>,
    pub updated_at: DateTime<Utc>,
}

/// Pre-rendered map SVG, shared by the page, the SVG endpoint and the PNG export.
#[derive(Debug, Clone)]
pub struct RenderedMap {
    /// Registry revision the map was drawn from.
    pub revision: u64,
    pub svg: Arc<Bytes>,
    /// Registry the map was drawn from, so the sidebar always matches the map.
    pub registry: Arc<Registry>,
    pub boundaries_loaded: bool,
    pub rendered_at: DateTime<Utc>,
}

impl RenderedMap {
    fn empty(registry: Arc<Registry>) -> Self {
        Self {
            revision: 0,
            svg: Arc::new(Bytes::from(render_empty_surface())),
            registry,
            boundaries_loaded: false,
            rendered_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<RegistrySnapshot>>,
    pub map: Arc<RwLock<RenderedMap>>,
    pub http_client: reqwest::Client,
    /// URL or local path of the department boundary GeoJSON.
    pub boundary_source: Arc<str>,
}

impl AppState {
    pub fn new(boundary_source: impl Into<Arc<str>>) -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("territoires-map/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, falling back to defaults"
                );
                reqwest::Client::new()
            });

        let registry = Arc::new(Registry::build_default());
        Self {
            registry: Arc::new(RwLock::new(RegistrySnapshot {
                revision: 0,
                registry: Arc::clone(&registry),
                updated_at: Utc::now(),
            })),
            map: Arc::new(RwLock::new(RenderedMap::empty(registry))),
            http_client,
            boundary_source: boundary_source.into(),
        }
    }

    /// Swaps in a new registry and returns its revision.
    ///
    /// The revision is derived under the write lock, so the stored revision
    /// only ever grows.
    pub async fn replace_registry(&self, registry: Registry) -> u64 {
        let mut current = self.registry.write().await;
        let revision = current.revision + 1;
        *current = RegistrySnapshot {
            revision,
            registry: Arc::new(registry),
            updated_at: Utc::now(),
        };
        revision
    }

    pub async fn registry_snapshot(&self) -> RegistrySnapshot {
        self.registry.read().await.clone()
    }
}
