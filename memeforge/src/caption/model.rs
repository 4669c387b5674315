use std::sync::Arc;

use crate::{
    assets::font::TextBrushRgba8,
    foundation::core::{Canvas, Rgba8},
};

/// Fill color of every caption.
pub const CAPTION_FILL: Rgba8 = Rgba8::WHITE;
/// Outline color of every caption.
pub const CAPTION_OUTLINE: Rgba8 = Rgba8::BLACK;
/// Outline width in logical pixels.
pub const CAPTION_OUTLINE_PX: f64 = 2.0;

/// Vertical slot a caption is bound to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPosition {
    Top,
    Bottom,
}

impl CaptionPosition {
    /// Draw order: top first, then bottom.
    pub const ALL: [CaptionPosition; 2] = [CaptionPosition::Top, CaptionPosition::Bottom];

    pub(crate) fn slot(self) -> usize {
        match self {
            CaptionPosition::Top => 0,
            CaptionPosition::Bottom => 1,
        }
    }
}

impl std::fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CaptionPosition::Top => "top",
            CaptionPosition::Bottom => "bottom",
        })
    }
}

/// Observable state of one caption slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptionState {
    Absent,
    Present { text: String, font_size: u32 },
}

impl CaptionState {
    pub fn is_present(&self) -> bool {
        matches!(self, CaptionState::Present { .. })
    }
}

/// A shaped caption owned by the surface.
#[derive(Clone)]
pub struct Caption {
    pub(crate) position: CaptionPosition,
    pub(crate) text: String,
    pub(crate) font_size: u32,
    pub(crate) layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for Caption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caption")
            .field("position", &self.position)
            .field("text", &self.text)
            .field("font_size", &self.font_size)
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .finish()
    }
}

impl Caption {
    pub fn position(&self) -> CaptionPosition {
        self.position
    }

    /// Upper-cased text as rendered.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn state(&self) -> CaptionState {
        CaptionState::Present {
            text: self.text.clone(),
            font_size: self.font_size,
        }
    }

    /// Shaped block size in logical pixels.
    pub fn extent(&self) -> (f64, f64) {
        (
            f64::from(self.layout.width()),
            f64::from(self.layout.height()),
        )
    }

    /// Caption font data pointing at face `index` of the same font file.
    ///
    /// Glyph ids are only meaningful for the face they were shaped with, which may differ from
    /// the configured face when the file is a collection.
    pub(crate) fn face(&self, index: u32) -> vello_cpu::peniko::FontData {
        if self.font.index == index {
            self.font.clone()
        } else {
            vello_cpu::peniko::FontData::new(self.font.data.clone(), index)
        }
    }

    /// Top-left corner of the text block on `canvas`.
    ///
    /// Horizontally centered; the top caption's top edge sits `font_size` px below the top edge,
    /// the bottom caption's bottom edge sits `font_size` px above the bottom edge.
    pub fn origin(&self, canvas: Canvas) -> (f64, f64) {
        let (w, h) = self.extent();
        let x = (f64::from(canvas.width) - w) / 2.0;
        let inset = f64::from(self.font_size);
        let y = match self.position {
            CaptionPosition::Top => inset,
            CaptionPosition::Bottom => f64::from(canvas.height) - inset - h,
        };
        (x, y)
    }
}

pub(crate) const FILL_BRUSH: TextBrushRgba8 = TextBrushRgba8 {
    r: CAPTION_FILL.r,
    g: CAPTION_FILL.g,
    b: CAPTION_FILL.b,
    a: CAPTION_FILL.a,
};
