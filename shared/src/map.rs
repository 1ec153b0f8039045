use std::fmt::Write as _;

use crate::geo::{BoundaryCollection, DepartmentFeature, Ring};
use crate::projection::{ConicConformal, DEFAULT_PARALLELS};
use crate::registry::Registry;

pub const MAP_WIDTH: u32 = 800;
pub const MAP_HEIGHT: u32 = 700;

const MAP_CENTER: (f64, f64) = (2.454071, 46.279229);
const MAP_SCALE: f64 = 2800.0;
const STROKE_COLOR: &str = "#FFFFFF";
const STROKE_WIDTH: f64 = 1.5;
const HOVER_OPACITY: f64 = 0.7;

/// Fixed projection used for every department map.
pub fn map_projection() -> ConicConformal {
    ConicConformal::new(
        DEFAULT_PARALLELS,
        MAP_CENTER,
        MAP_SCALE,
        (f64::from(MAP_WIDTH) / 2.0, f64::from(MAP_HEIGHT) / 2.0),
    )
}

/// Text shown when hovering a department.
pub fn tooltip(feature: &DepartmentFeature, registry: &Registry) -> String {
    format!(
        "{} ({}) - {}",
        feature.name(),
        feature.code(),
        registry.rep_of(feature.code())
    )
}

fn open_surface(svg: &mut String) {
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{MAP_WIDTH}" height="{MAP_HEIGHT}" viewBox="0 0 {MAP_WIDTH} {MAP_HEIGHT}">"#
    );
}

/// Map surface with no regions, shown when the boundary dataset is unavailable.
pub fn render_empty_surface() -> String {
    let mut svg = String::new();
    open_surface(&mut svg);
    svg.push_str("</svg>");
    svg
}

/// Draws one region per department, filled with its representative's color.
pub fn render_map_svg(boundaries: &BoundaryCollection, registry: &Registry) -> String {
    let projection = map_projection();
    let mut svg = String::with_capacity(boundaries.features.len() * 4096);
    open_surface(&mut svg);
    let _ = write!(
        svg,
        "<style>path{{cursor:pointer}}path:hover{{opacity:{HOVER_OPACITY}}}</style>"
    );

    for feature in &boundaries.features {
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let data = path_data(&geometry.rings(), &projection);
        if data.is_empty() {
            continue;
        }
        let _ = write!(
            svg,
            r#"<path d="{data}" fill="{}" stroke="{STROKE_COLOR}" stroke-width="{STROKE_WIDTH}" data-code="{}"><title>{}</title></path>"#,
            escape_xml(registry.color_of(feature.code())),
            escape_xml(feature.code()),
            escape_xml(&tooltip(feature, registry)),
        );
    }

    svg.push_str("</svg>");
    svg
}

fn path_data(rings: &[&Ring], projection: &ConicConformal) -> String {
    let mut data = String::new();
    for ring in rings {
        let mut points = ring
            .iter()
            .filter(|position| position.len() >= 2)
            .map(|position| projection.project(position[0], position[1]));
        let Some((x, y)) = points.next() else {
            continue;
        };
        let _ = write!(data, "M{x:.2},{y:.2}");
        for (x, y) in points {
            let _ = write!(data, "L{x:.2},{y:.2}");
        }
        data.push('Z');
    }
    data
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
