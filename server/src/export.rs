use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;
use thiserror::Error;

use crate::config::{EXPORT_HEIGHT, EXPORT_WIDTH};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("map svg could not be parsed: {0}")]
    Svg(#[from] usvg::Error),
    #[error("failed to allocate a {width}x{height} raster")]
    Allocation { width: u32, height: u32 },
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Draws the map at the origin of a white export canvas, unscaled.
pub fn rasterize(svg: &[u8]) -> Result<Pixmap, ExportError> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default())?;
    let mut pixmap = Pixmap::new(EXPORT_WIDTH, EXPORT_HEIGHT).ok_or(ExportError::Allocation {
        width: EXPORT_WIDTH,
        height: EXPORT_HEIGHT,
    })?;
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

pub fn export_png(svg: &[u8]) -> Result<Vec<u8>, ExportError> {
    rasterize(svg)?
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// Width and height from a PNG's IHDR chunk.
#[cfg(test)]
pub(crate) fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    if png.len() < 24 || &png[1..4] != b"PNG" {
        return None;
    }
    let width = u32::from_be_bytes(png[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(png[20..24].try_into().ok()?);
    Some((width, height))
}
