use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use territoires_shared::{render_empty_surface, render_map_svg};
use tracing::{error, info};

use crate::services::boundary_loader;
use crate::state::{AppState, RenderedMap};

/// Redraws the map from the current registry.
///
/// The boundary dataset is fetched again on every call. If it cannot be
/// loaded the stored map becomes an empty surface. Returns whether the
/// boundaries loaded.
pub async fn redraw(state: &AppState) -> bool {
    let snapshot = state.registry_snapshot().await;

    let (svg, boundaries_loaded, regions) =
        match boundary_loader::load(&state.http_client, &state.boundary_source).await {
            Ok(boundaries) => {
                let regions = boundaries.features.len();
                (render_map_svg(&boundaries, &snapshot.registry), true, regions)
            }
            Err(e) => {
                error!(
                    error = %e,
                    source = %state.boundary_source,
                    "failed to load department boundaries"
                );
                (render_empty_surface(), false, 0)
            }
        };

    let mut map = state.map.write().await;
    // A slower redraw of an older registry must not overwrite a newer map.
    if map.revision > snapshot.revision {
        return boundaries_loaded;
    }
    *map = RenderedMap {
        revision: snapshot.revision,
        svg: Arc::new(Bytes::from(svg)),
        registry: Arc::clone(&snapshot.registry),
        boundaries_loaded,
        rendered_at: Utc::now(),
    };
    if boundaries_loaded {
        info!(
            revision = snapshot.revision,
            regions,
            representatives = snapshot.registry.len(),
            "map redrawn"
        );
    }
    boundaries_loaded
}
