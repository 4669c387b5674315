use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, Rgba8},
        error::{MemeError, MemeResult},
    },
};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

pub(crate) fn dims_to_u16(width: u32, height: u32) -> MemeResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MemeError::validation("raster width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MemeError::validation("raster height exceeds u16"))?;
    Ok((w, h))
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> MemeResult<vello_cpu::Pixmap> {
    let (w, h) = dims_to_u16(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(MemeError::decode("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Wrap a decoded bitmap as an image paint.
pub(crate) fn image_paint(img: &PreparedImage) -> MemeResult<vello_cpu::Image> {
    let pixmap =
        image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
