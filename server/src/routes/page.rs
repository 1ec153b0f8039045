use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use territoires_shared::map::escape_xml;
use territoires_shared::{Registry, Representative};

use crate::routes::api::{import_workbook, read_upload};
use crate::state::AppState;

const PAGE_TITLE: &str = "Carte des Territoires Commerciaux - France";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    // Sidebar and map come from the same render so they never disagree mid-import.
    let (registry, svg) = {
        let map = state.map.read().await;
        (Arc::clone(&map.registry), Arc::clone(&map.svg))
    };
    let svg = String::from_utf8_lossy(&svg);
    Html(render_page(&registry, &svg))
}

/// Form variant of the import endpoint; lands back on the page either way.
pub async fn import_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result = match read_upload(multipart).await {
        Ok(upload) => import_workbook(&state, upload).await.map(|_| ()),
        Err(status) => Err(status),
    };
    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(status) => (
            status,
            Html(format!(
                "<!DOCTYPE html><html lang=\"fr\"><body><p>Import impossible ({}).</p><p><a href=\"/\">Retour à la carte</a></p></body></html>",
                status.as_u16()
            )),
        )
            .into_response(),
    }
}

fn render_page(registry: &Registry, map_svg: &str) -> String {
    let mut page = String::with_capacity(map_svg.len() + 8192);
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<title>{PAGE_TITLE}</title>
<link rel="stylesheet" href="/app.css">
</head>
<body>
<div class="App"><div class="container">
<div class="header">
<h1>{PAGE_TITLE}</h1>
<div class="button-group">
<form action="/import" method="post" enctype="multipart/form-data">
<label for="file-upload" class="import-btn">Importer Excel</label>
<input id="file-upload" name="file" type="file" accept=".xlsx,.xls" onchange="this.form.submit()" style="display: none">
</form>
<a href="/api/export.png" class="export-btn" download>Exporter PNG</a>
</div>
</div>
<div class="content">
<div class="map-container">{map_svg}</div>
"#
    );
    render_sidebar(&mut page, registry);
    page.push_str("</div>\n</div></div>\n</body>\n</html>\n");
    page
}

fn render_sidebar(page: &mut String, registry: &Registry) {
    page.push_str("<div class=\"sidebar\">\n<h2>Commerciaux</h2>\n<div class=\"sales-list\">\n");
    for rep in registry.sorted_for_display() {
        render_card(page, &rep);
    }
    let _ = write!(
        page,
        "</div>\n<div class=\"stats\">\n<h3>Statistiques</h3>\n<div>Total commerciaux : {}</div>\n<div>Total départements : {}</div>\n</div>\n</div>\n",
        registry.len(),
        registry.total_departments()
    );
}

fn render_card(page: &mut String, rep: &Representative) {
    let _ = write!(
        page,
        r#"<div class="sales-card">
<div class="sales-header"><div class="color-box" style="background-color: {}"></div><span class="sales-name">{}</span></div>
<div class="sales-info"><div class="dept-count">{} départements</div><div class="dept-list">{}</div></div>
</div>
"#,
        escape_xml(&rep.color),
        escape_xml(&rep.name),
        rep.departments.len(),
        escape_xml(&rep.departments.join(", ")),
    );
}
