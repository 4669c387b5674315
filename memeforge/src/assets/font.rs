use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::error::{MemeError, MemeResult};

/// Families tried, in order, when no caption font file is configured.
const CAPTION_FAMILIES: &[&str] = &["Impact", "Arial Black"];

/// Raw font file used for caption shaping and glyph rasterization.
#[derive(Clone)]
pub struct FontAsset {
    bytes: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontAsset {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index: 0,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Pick a heavy display face from the system font database.
    ///
    /// Tries Impact, then Arial Black, then any sans-serif face at weight 900.
    pub fn system_default() -> MemeResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let mut families: Vec<usvg::fontdb::Family<'_>> = CAPTION_FAMILIES
            .iter()
            .map(|&name| usvg::fontdb::Family::Name(name))
            .collect();
        families.push(usvg::fontdb::Family::SansSerif);

        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::BLACK,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| MemeError::load("no system fonts available for captions"))?;

        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| MemeError::load("system font face data is unavailable"))?;
        tracing::debug!(face_index = index, bytes = bytes.len(), "selected system caption font");
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn to_font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            self.index,
        )
    }
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered_family: Option<(usize, String)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered_family: None,
        }
    }

    /// Family name of the most recently registered font, if any.
    pub fn family_name(&self) -> Option<&str> {
        self.registered_family.as_ref().map(|(_, name)| name.as_str())
    }

    /// Shape and lay out a single block of plain text without wrapping.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font: &FontAsset,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> MemeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MemeError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BLACK,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    // Registers the font once per distinct byte buffer.
    fn family_for(&mut self, font: &FontAsset) -> MemeResult<String> {
        let key = Arc::as_ptr(&font.bytes) as usize;
        if let Some((k, name)) = &self.registered_family
            && *k == key
        {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MemeError::validation("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MemeError::validation("registered font family has no name"))?
            .to_string();
        self.registered_family = Some((key, family_name.clone()));
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
