//! memeforge is the core of a meme image editor.
//!
//! A session picks a background (a catalog template or an uploaded image), overlays up to two
//! captions, and exports the result as a PNG. Rendering is CPU-only.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `ImageSource -> PreparedImage` (validate, fetch, decode to premultiplied RGBA8)
//! 2. **Fit**: `PreparedImage + Canvas -> Placement` (uniform contain-fit, centered)
//! 3. **Compose**: `Surface` holds the background layer and the top/bottom captions
//! 4. **Export**: `Surface -> ExportArtifact` (re-rasterized at 2x, encoded as PNG)
//!
//! [`Editor`] ties the steps together and sequences asynchronous loads so that only the most
//! recent request can change the background.
#![forbid(unsafe_code)]

mod assets;
mod caption;
mod editor;
mod foundation;
mod layout;
mod render;
mod templates;

pub use assets::decode::{PreparedImage, decode_image};
pub use assets::font::{FontAsset, TextBrushRgba8, TextLayoutEngine};
pub use assets::loader::{ImageLoader, ImageSource, Upload, mime_for_path, normalize_rel_path};
pub use caption::manager::CaptionManager;
pub use caption::model::{
    CAPTION_FILL, CAPTION_OUTLINE, CAPTION_OUTLINE_PX, Caption, CaptionPosition, CaptionState,
};
pub use editor::loads::{LoadCompletion, LoadQueue, LoadTicket};
pub use editor::session::{
    CaptionInputs, Editor, LoadOutcome, Notice, NoticeLevel, Selection,
};
pub use foundation::config::{
    DEFAULT_FONT_SIZE, EXPORT_MULTIPLIER, EditorConfig, FONT_SIZE_RANGE, MAX_UPLOAD_BYTES,
};
pub use foundation::core::{Affine, Canvas, Rect, Rgba8, Vec2};
pub use foundation::error::{MemeError, MemeResult};
pub use layout::fit::{Placement, fit_contain};
pub use render::export::{ExportArtifact, export_file_name, export_png};
pub use render::surface::{BackgroundLayer, Surface};
pub use templates::catalog::{TEMPLATES, Template, find_template};
