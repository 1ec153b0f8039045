use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;
use territoires_shared::{DuplicateAssignment, Registry, Representative};
use tracing::{error, info, warn};

use crate::config::EXPORT_FILENAME;
use crate::export;
use crate::services::map_renderer;
use crate::spreadsheet;
use crate::state::AppState;

const SVG_CONTENT_TYPE: &str = "image/svg+xml; charset=utf-8";
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct RegistryResponse {
    pub revision: u64,
    pub updated_at: String,
    pub representatives: Vec<Representative>,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub revision: u64,
    pub representatives: usize,
    pub departments: usize,
    pub duplicates: Vec<DuplicateAssignment>,
    pub map_rendered: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.registry_snapshot().await;
    let map = state.map.read().await;
    Json(serde_json::json!({
        "status": "ok",
        "representatives": snapshot.registry.len(),
        "revision": snapshot.revision,
        "map_revision": map.revision,
        "boundaries_loaded": map.boundaries_loaded,
        "rendered_at": map.rendered_at.to_rfc3339(),
    }))
}

pub async fn get_registry(State(state): State<AppState>) -> Json<RegistryResponse> {
    let snapshot = state.registry_snapshot().await;
    Json(RegistryResponse {
        revision: snapshot.revision,
        updated_at: snapshot.updated_at.to_rfc3339(),
        representatives: snapshot.registry.representatives().to_vec(),
    })
}

pub async fn get_map_svg(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (etag, svg) = {
        let map = state.map.read().await;
        (map_etag(map.revision, map.boundaries_loaded), map.svg.clone())
    };

    if if_none_match_matches(&headers, &etag) {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        set_cache_headers(response.headers_mut(), &etag);
        return response;
    }

    let mut response = Response::new(Body::from((*svg).clone()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SVG_CONTENT_TYPE),
    );
    set_cache_headers(response.headers_mut(), &etag);
    response
}

pub async fn export_png(State(state): State<AppState>) -> Response {
    let svg = state.map.read().await.svg.clone();

    let png = match tokio::task::spawn_blocking(move || export::export_png(&svg)).await {
        Ok(Ok(png)) => png,
        Ok(Err(e)) => {
            error!(error = %e, "failed to export map as png");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Err(e) => {
            error!(error = %e, "png export task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, "image/png".to_owned()),
            (header::CACHE_CONTROL, "no-store".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        png,
    )
        .into_response()
}

pub async fn import_spreadsheet(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, StatusCode> {
    let upload = read_upload(multipart).await?;
    let summary = import_workbook(&state, upload).await?;
    Ok(Json(summary))
}

/// Bytes of the uploaded spreadsheet field.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Bytes, StatusCode> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "malformed multipart upload");
        StatusCode::BAD_REQUEST
    })? {
        if field.name() == Some(UPLOAD_FIELD) {
            return field.bytes().await.map_err(|e| {
                warn!(error = %e, "failed to read uploaded spreadsheet");
                StatusCode::BAD_REQUEST
            });
        }
    }
    Err(StatusCode::BAD_REQUEST)
}

/// Replaces the registry with the workbook's assignments and redraws the map.
///
/// An unreadable workbook leaves the current registry untouched.
pub(crate) async fn import_workbook(
    state: &AppState,
    upload: Bytes,
) -> Result<ImportSummary, StatusCode> {
    let rows = tokio::task::spawn_blocking(move || spreadsheet::read_assignment_rows(&upload))
        .await
        .map_err(|e| {
            error!(error = %e, "spreadsheet import task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            warn!(error = %e, "rejected spreadsheet upload");
            StatusCode::BAD_REQUEST
        })?;

    let row_count = rows.len();
    let registry = Registry::build_from_rows(rows);
    let duplicates = registry.duplicate_assignments();
    for duplicate in &duplicates {
        warn!(
            code = %duplicate.code,
            owner = %duplicate.owner,
            shadowed = ?duplicate.shadowed,
            "department assigned to several representatives, first one wins"
        );
    }

    let representatives = registry.len();
    let departments = registry.total_departments();
    let revision = state.replace_registry(registry).await;
    info!(
        revision,
        rows = row_count,
        representatives,
        departments,
        "registry replaced from spreadsheet"
    );

    let map_rendered = map_renderer::redraw(state).await;

    Ok(ImportSummary {
        revision,
        representatives,
        departments,
        duplicates,
        map_rendered,
    })
}

fn map_etag(revision: u64, boundaries_loaded: bool) -> String {
    if boundaries_loaded {
        format!("\"map-{revision}\"")
    } else {
        format!("\"map-{revision}-empty\"")
    }
}

fn set_cache_headers(headers: &mut HeaderMap, etag: &str) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    if let Ok(etag_header) = HeaderValue::from_str(etag) {
        headers.insert(header::ETAG, etag_header);
    }
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::SocketAddr;

    use rust_xlsxwriter::Workbook;

    use super::{if_none_match_matches, map_etag};
    use crate::export::png_dimensions;
    use crate::services::map_renderer;
    use crate::state::AppState;

    const BOUNDARIES: &[u8] = br#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"code":"01","nom":"Ain"},
         "geometry":{"type":"Polygon","coordinates":[[[5.0,46.0],[5.5,46.0],[5.5,46.5],[5.0,46.0]]]}},
        {"type":"Feature","properties":{"code":"05","nom":"Hautes-Alpes"},
         "geometry":{"type":"Polygon","coordinates":[[[6.0,44.5],[6.5,44.5],[6.5,45.0],[6.0,44.5]]]}},
        {"type":"Feature","properties":{"code":"12","nom":"Aveyron"},
         "geometry":{"type":"Polygon","coordinates":[[[2.2,44.0],[3.0,44.0],[3.0,44.6],[2.2,44.0]]]}},
        {"type":"Feature","properties":{"code":"75","nom":"Paris"},
         "geometry":{"type":"Polygon","coordinates":[[[2.25,48.82],[2.42,48.82],[2.42,48.9],[2.25,48.82]]]}}
    ]}"#;

    fn boundary_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(BOUNDARIES).expect("write boundaries");
        file
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    fn workbook(rows: &[(&str, &str)]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Commercial").expect("write header");
        sheet.write_string(0, 1, "Département").expect("write header");
        for (idx, (name, code)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            if !name.is_empty() {
                sheet.write_string(row, 0, *name).expect("write name");
            }
            match code.parse::<f64>() {
                Ok(number) => sheet.write_number(row, 1, number).expect("write code"),
                Err(_) => sheet.write_string(row, 1, *code).expect("write code"),
            };
        }
        workbook.save_to_buffer().expect("serialize workbook")
    }

    async fn upload(
        client: &reqwest::Client,
        base_url: &str,
        bytes: Vec<u8>,
    ) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes).file_name("territoires.xlsx");
        let form = reqwest::multipart::Form::new().part("file", part);
        client
            .post(format!("{base_url}/api/import"))
            .multipart(form)
            .send()
            .await
            .expect("import request")
    }

    async fn map_svg(client: &reqwest::Client, base_url: &str) -> String {
        client
            .get(format!("{base_url}/api/map.svg"))
            .send()
            .await
            .expect("map request")
            .error_for_status()
            .expect("map status")
            .text()
            .await
            .expect("map body")
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::IF_NONE_MATCH,
            axum::http::HeaderValue::from_static("W/\"other\", \"map-42\""),
        );
        assert!(if_none_match_matches(&headers, &map_etag(42, true)));
        assert!(!if_none_match_matches(&headers, &map_etag(42, false)));
    }

    #[tokio::test]
    async fn import_replaces_registry_and_redraws_map() {
        let file = boundary_file();
        let state = AppState::new(file.path().to_string_lossy().into_owned());
        map_renderer::redraw(&state).await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let before = map_svg(&client, &base_url).await;
        assert!(before.contains("Ain (01) - Alex"));
        assert!(before.contains("Paris (75) - Olivier"));

        let summary = upload(
            &client,
            &base_url,
            workbook(&[("Dana", "5"), ("Dana", "12"), ("Lee", "75"), ("", "33")]),
        )
        .await
        .error_for_status()
        .expect("import status")
        .json::<serde_json::Value>()
        .await
        .expect("parse import summary");
        assert_eq!(summary["representatives"], 2);
        assert_eq!(summary["departments"], 3);
        assert_eq!(summary["map_rendered"], true);
        assert!(summary["duplicates"].as_array().is_some_and(Vec::is_empty));

        let registry = client
            .get(format!("{base_url}/api/registry"))
            .send()
            .await
            .expect("registry request")
            .json::<serde_json::Value>()
            .await
            .expect("parse registry");
        assert_eq!(registry["revision"], 1);
        assert_eq!(registry["representatives"][0]["name"], "Dana");
        assert_eq!(
            registry["representatives"][0]["departments"],
            serde_json::json!(["05", "12"])
        );
        assert_eq!(registry["representatives"][1]["name"], "Lee");

        let after = map_svg(&client, &base_url).await;
        assert!(after.contains("Hautes-Alpes (05) - Dana"));
        assert!(after.contains("Aveyron (12) - Dana"));
        assert!(after.contains("Paris (75) - Lee"));
        assert!(after.contains("Ain (01) - Non assigné"));

        upload(&client, &base_url, workbook(&[("Lee", "12")]))
            .await
            .error_for_status()
            .expect("second import status");
        let replaced = map_svg(&client, &base_url).await;
        assert!(replaced.contains("Hautes-Alpes (05) - Non assigné"));
        assert!(replaced.contains("Paris (75) - Non assigné"));
        assert!(replaced.contains("Aveyron (12) - Lee"));

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn import_reports_duplicate_assignments() {
        let file = boundary_file();
        let state = AppState::new(file.path().to_string_lossy().into_owned());
        let (addr, server_handle) = spawn_test_server(state.clone()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let summary = upload(
            &client,
            &base_url,
            workbook(&[("Dana", "75"), ("Lee", "75")]),
        )
        .await
        .json::<serde_json::Value>()
        .await
        .expect("parse import summary");
        assert_eq!(summary["duplicates"][0]["code"], "75");
        assert_eq!(summary["duplicates"][0]["owner"], "Dana");
        assert_eq!(summary["duplicates"][0]["shadowed"], serde_json::json!(["Lee"]));

        assert_eq!(state.registry_snapshot().await.registry.rep_of("75"), "Dana");

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn unreadable_upload_keeps_current_registry() {
        let file = boundary_file();
        let state = AppState::new(file.path().to_string_lossy().into_owned());
        let (addr, server_handle) = spawn_test_server(state.clone()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let response = upload(&client, &base_url, b"definitely not a workbook".to_vec()).await;
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let missing_field = client
            .post(format!("{base_url}/api/import"))
            .multipart(reqwest::multipart::Form::new().text("other", "value"))
            .send()
            .await
            .expect("import request");
        assert_eq!(missing_field.status(), reqwest::StatusCode::BAD_REQUEST);

        let snapshot = state.registry_snapshot().await;
        assert_eq!(snapshot.revision, 0);
        assert_eq!(snapshot.registry.rep_of("75"), "Olivier");

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn map_endpoint_supports_conditional_requests() {
        let file = boundary_file();
        let state = AppState::new(file.path().to_string_lossy().into_owned());
        map_renderer::redraw(&state).await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let first = client
            .get(format!("{base_url}/api/map.svg"))
            .send()
            .await
            .expect("map request");
        assert_eq!(first.status(), reqwest::StatusCode::OK);
        assert_eq!(
            first
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("image/svg+xml; charset=utf-8")
        );
        let etag = first
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("etag header should be present");
        assert_eq!(etag, "\"map-0\"");

        let second = client
            .get(format!("{base_url}/api/map.svg"))
            .header(reqwest::header::IF_NONE_MATCH, etag)
            .send()
            .await
            .expect("conditional map request");
        assert_eq!(second.status(), reqwest::StatusCode::NOT_MODIFIED);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn export_returns_fixed_size_png_download() {
        let file = boundary_file();
        let state = AppState::new(file.path().to_string_lossy().into_owned());
        map_renderer::redraw(&state).await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");

        let response = reqwest::Client::new()
            .get(format!("{base_url}/api/export.png"))
            .send()
            .await
            .expect("export request")
            .error_for_status()
            .expect("export status");

        let headers = response.headers().clone();
        assert_eq!(
            headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("image/png")
        );
        assert_eq!(
            headers
                .get(reqwest::header::CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok()),
            Some("attachment; filename=\"carte-territoires.png\"")
        );

        let png = response.bytes().await.expect("png body");
        assert_eq!(png_dimensions(&png), Some((1200, 1000)));

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn health_reports_missing_boundaries() {
        let state = AppState::new("/nonexistent/departements.geojson");
        map_renderer::redraw(&state).await;
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");

        let health = reqwest::Client::new()
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health["status"], "ok");
        assert_eq!(health["representatives"], 13);
        assert_eq!(health["boundaries_loaded"], false);

        server_handle.abort();
        let _ = server_handle.await;
    }
}
