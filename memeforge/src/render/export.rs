use std::{
    io::Cursor,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;

use crate::{
    assets::decode::unpremultiply_rgba8_in_place,
    foundation::error::{MemeError, MemeResult},
    render::surface::Surface,
};

/// PNG rendering of the current surface, ready to hand to a save/download action.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    /// Suggested file name, `meme-<unix-timestamp-ms>.png`.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
}

/// `meme-<unix-timestamp-ms>.png` for the given instant.
pub fn export_file_name(at: SystemTime) -> String {
    let ms = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("meme-{ms}.png")
}

/// Rasterize `surface` at `multiplier` x its logical size and encode it as PNG.
///
/// Fails with [`MemeError::Export`] while the surface has no background.
#[tracing::instrument(skip(surface))]
pub fn export_png(surface: &Surface, multiplier: u32) -> MemeResult<ExportArtifact> {
    if !surface.has_background() {
        return Err(MemeError::export(
            "nothing to export: no background image has been set",
        ));
    }

    let pixmap = surface.render_scaled(multiplier)?;
    let (width, height) = (u32::from(pixmap.width()), u32::from(pixmap.height()));

    let mut straight = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(width, height, straight)
        .ok_or_else(|| MemeError::export("invalid rgba buffer size"))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encode png")?;

    let file_name = export_file_name(SystemTime::now());
    tracing::info!(%file_name, width, height, bytes = png.len(), "exported meme");
    Ok(ExportArtifact {
        file_name,
        width,
        height,
        png,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
