use std::{ops::RangeInclusive, sync::Arc};

use crate::{
    assets::font::{FontAsset, TextLayoutEngine},
    caption::model::{Caption, CaptionPosition, CaptionState, FILL_BRUSH},
    foundation::error::{MemeError, MemeResult},
    render::surface::Surface,
};

/// Creates, replaces and removes the top/bottom captions on a [`Surface`].
///
/// Each position is independently `Absent` or `Present`; a new caption for a position always
/// replaces the previous one rather than stacking on top of it.
pub struct CaptionManager {
    engine: TextLayoutEngine,
    font: FontAsset,
    font_data: vello_cpu::peniko::FontData,
    font_sizes: RangeInclusive<u32>,
}

impl std::fmt::Debug for CaptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionManager")
            .field("font", &self.font)
            .field("font_sizes", &self.font_sizes)
            .finish()
    }
}

impl CaptionManager {
    pub fn new(font: FontAsset, font_sizes: RangeInclusive<u32>) -> Self {
        let font_data = font.to_font_data();
        Self {
            engine: TextLayoutEngine::new(),
            font,
            font_data,
            font_sizes,
        }
    }

    pub fn font_sizes(&self) -> RangeInclusive<u32> {
        self.font_sizes.clone()
    }

    pub fn validate_font_size(&self, font_size: u32) -> MemeResult<()> {
        if self.font_sizes.contains(&font_size) {
            Ok(())
        } else {
            Err(MemeError::validation(format!(
                "font size {font_size}px is outside {}..={}px",
                self.font_sizes.start(),
                self.font_sizes.end()
            )))
        }
    }

    /// Set, replace or clear the caption at `position`, then re-render the surface.
    ///
    /// Whitespace-only `text` clears the slot at any `font_size`. On error the slot keeps its
    /// previous caption.
    #[tracing::instrument(skip(self, surface, text), fields(len = text.len()))]
    pub fn set_caption(
        &mut self,
        surface: &mut Surface,
        position: CaptionPosition,
        text: &str,
        font_size: u32,
    ) -> MemeResult<CaptionState> {
        let caption = self.build_caption(position, text, font_size)?;
        surface.remove_caption(position);
        match caption {
            Some(caption) => {
                surface.insert_caption(caption);
            }
            None => tracing::debug!(%position, "caption cleared"),
        }
        surface.render()?;
        Ok(surface.caption_state(position))
    }

    /// Shape the caption for `position` without touching any surface.
    ///
    /// Returns `None` for whitespace-only `text`, whatever `font_size` is.
    pub fn build_caption(
        &mut self,
        position: CaptionPosition,
        text: &str,
        font_size: u32,
    ) -> MemeResult<Option<Caption>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.validate_font_size(font_size)?;

        let upper = text.to_uppercase();
        let layout = self
            .engine
            .layout_plain(&upper, &self.font, font_size as f32, FILL_BRUSH)?;
        Ok(Some(Caption {
            position,
            text: upper,
            font_size,
            layout: Arc::new(layout),
            font: self.font_data.clone(),
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/manager.rs"]
mod tests;
