use std::path::Path;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::config::{max_upload_bytes, static_dir};
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let static_assets = Router::new()
        .fallback_service(ServeDir::new(static_dir()))
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route("/", axum::routing::get(routes::page::index))
        .route("/import", axum::routing::post(routes::page::import_form))
        .route(
            "/api/registry",
            axum::routing::get(routes::api::get_registry),
        )
        .route(
            "/api/import",
            axum::routing::post(routes::api::import_spreadsheet),
        )
        .route("/api/map.svg", axum::routing::get(routes::api::get_map_svg))
        .route(
            "/api/export.png",
            axum::routing::get(routes::api::export_png),
        )
        .route("/api/health", axum::routing::get(routes::api::health));

    app.layer(DefaultBodyLimit::max(max_upload_bytes()))
        .layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension().and_then(|ext| ext.to_str())?;
    match ext {
        "css" | "js" => Some("public, max-age=3600"),
        "ico" | "png" | "woff2" => Some("public, max-age=86400"),
        _ => None,
    }
}
