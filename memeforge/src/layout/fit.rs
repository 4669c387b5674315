use crate::foundation::{
    core::{Affine, Canvas, Rect},
    error::{MemeError, MemeResult},
};

/// Uniform scale plus centering offset that places a bitmap inside the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Placement {
    /// Bitmap-space to surface-space transform.
    pub fn transform(&self) -> Affine {
        Affine::translate((self.offset_x, self.offset_y)) * Affine::scale(self.scale)
    }

    /// Area the bitmap covers on the surface.
    pub fn dest_rect(&self, width: u32, height: u32) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.offset_x + f64::from(width) * self.scale,
            self.offset_y + f64::from(height) * self.scale,
        )
    }
}

/// Contain-fit a `width x height` bitmap into `canvas`.
///
/// `scale = min(W/w, H/h)`, so the binding dimension spans the canvas exactly and the image is
/// centered, undistorted and never cropped.
pub fn fit_contain(width: u32, height: u32, canvas: Canvas) -> MemeResult<Placement> {
    if width == 0 || height == 0 {
        return Err(MemeError::validation(format!(
            "cannot fit a {width}x{height} image"
        )));
    }
    if canvas.width == 0 || canvas.height == 0 {
        return Err(MemeError::validation("canvas dimensions must be > 0"));
    }

    let (w, h) = (f64::from(width), f64::from(height));
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));

    let scale = (cw / w).min(ch / h);
    Ok(Placement {
        scale,
        offset_x: (cw - w * scale) / 2.0,
        offset_y: (ch - h * scale) / 2.0,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
