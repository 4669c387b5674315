use crate::{
    assets::decode::PreparedImage,
    caption::model::{
        CAPTION_OUTLINE, CAPTION_OUTLINE_PX, Caption, CaptionPosition, CaptionState,
    },
    foundation::{
        core::{Affine, Canvas, Rgba8},
        error::MemeResult,
    },
    layout::fit::Placement,
    render::raster::{affine_to_cpu, color_to_cpu, dims_to_u16, image_paint},
};

/// Non-interactive background layer: a decoded bitmap plus its placement.
#[derive(Clone)]
pub struct BackgroundLayer {
    image: PreparedImage,
    paint: vello_cpu::Image,
    placement: Placement,
}

impl std::fmt::Debug for BackgroundLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundLayer")
            .field("width", &self.image.width)
            .field("height", &self.image.height)
            .field("placement", &self.placement)
            .finish()
    }
}

impl BackgroundLayer {
    pub fn prepare(image: PreparedImage, placement: Placement) -> MemeResult<Self> {
        let paint = image_paint(&image)?;
        Ok(Self {
            image,
            paint,
            placement,
        })
    }

    pub fn image(&self) -> &PreparedImage {
        &self.image
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }
}

/// Fixed-size compositing surface: background color, at most one background bitmap, and at
/// most one caption per [`CaptionPosition`].
///
/// Draw order is fixed (color, background, top caption, bottom caption), so captions always
/// land above the background whatever order they were inserted in.
pub struct Surface {
    canvas: Canvas,
    background_color: Rgba8,
    background: Option<BackgroundLayer>,
    captions: [Option<Caption>; 2],
    raster: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .field("background_color", &self.background_color)
            .field("background", &self.background.as_ref().map(|b| b.placement))
            .field("captions", &self.captions)
            .finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas, background_color: Rgba8) -> MemeResult<Self> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let (w, h) = dims_to_u16(canvas.width, canvas.height)?;
        let mut surface = Self {
            canvas,
            background_color,
            background: None,
            captions: [None, None],
            raster: vello_cpu::Pixmap::new(w, h),
        };
        surface.render()?;
        Ok(surface)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn background_color(&self) -> Rgba8 {
        self.background_color
    }

    /// Drop the background and every caption, and switch to `background_color`.
    ///
    /// Does not re-render; call [`Surface::render`] afterwards.
    pub fn reset(&mut self, background_color: Rgba8) {
        self.background_color = background_color;
        self.background = None;
        self.captions = [None, None];
    }

    pub fn set_background(&mut self, image: PreparedImage, placement: Placement) -> MemeResult<()> {
        self.install_background(BackgroundLayer::prepare(image, placement)?);
        Ok(())
    }

    pub fn install_background(&mut self, layer: BackgroundLayer) {
        tracing::debug!(
            width = layer.image.width,
            height = layer.image.height,
            scale = layer.placement.scale,
            "background installed"
        );
        self.background = Some(layer);
    }

    pub fn background(&self) -> Option<&BackgroundLayer> {
        self.background.as_ref()
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    pub fn caption(&self, position: CaptionPosition) -> Option<&Caption> {
        self.captions[position.slot()].as_ref()
    }

    pub fn caption_state(&self, position: CaptionPosition) -> CaptionState {
        self.caption(position)
            .map_or(CaptionState::Absent, Caption::state)
    }

    pub fn captions(&self) -> impl Iterator<Item = &Caption> {
        self.captions.iter().flatten()
    }

    pub(crate) fn remove_caption(&mut self, position: CaptionPosition) -> Option<Caption> {
        self.captions[position.slot()].take()
    }

    pub(crate) fn insert_caption(&mut self, caption: Caption) -> Option<Caption> {
        self.captions[caption.position.slot()].replace(caption)
    }

    /// Recomposite every layer into the visible raster. Idempotent.
    pub fn render(&mut self) -> MemeResult<()> {
        let (w, h) = dims_to_u16(self.canvas.width, self.canvas.height)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        self.draw(&mut ctx, Affine::IDENTITY);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.raster);
        Ok(())
    }

    /// Rasterize the current state at `multiplier` times the logical size without touching the
    /// visible raster.
    pub fn render_scaled(&self, multiplier: u32) -> MemeResult<vello_cpu::Pixmap> {
        let out = self.canvas.scaled(multiplier)?;
        let (w, h) = dims_to_u16(out.width, out.height)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        self.draw(&mut ctx, Affine::scale(f64::from(multiplier)));
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap)
    }

    /// Visible raster as premultiplied RGBA8.
    pub fn pixels(&self) -> &[u8] {
        self.raster.data_as_u8_slice()
    }

    /// Premultiplied RGBA8 of one visible pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = ((y * self.canvas.width + x) * 4) as usize;
        self.pixels().get(i..i + 4).map(|px| [px[0], px[1], px[2], px[3]])
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext, root: Affine) {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_transform(affine_to_cpu(root));
        ctx.set_paint(color_to_cpu(self.background_color));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));

        if let Some(bg) = &self.background {
            ctx.set_transform(affine_to_cpu(root * bg.placement.transform()));
            ctx.set_paint(bg.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(bg.image.width),
                f64::from(bg.image.height),
            ));
        }

        for caption in self.captions() {
            draw_caption(ctx, root, self.canvas, caption);
        }
    }
}

fn draw_caption(
    ctx: &mut vello_cpu::RenderContext,
    root: Affine,
    canvas: Canvas,
    caption: &Caption,
) {
    let (x, y) = caption.origin(canvas);
    ctx.set_transform(affine_to_cpu(root * Affine::translate((x, y))));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(CAPTION_OUTLINE_PX));

    for line in caption.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font_size = run.run().font_size();
            let font = caption.face(run.run().font().index);

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            ctx.glyph_run(&font)
                .font_size(font_size)
                .fill_glyphs(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));

            ctx.set_paint(color_to_cpu(CAPTION_OUTLINE));
            ctx.glyph_run(&font)
                .font_size(font_size)
                .stroke_glyphs(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
