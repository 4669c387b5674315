use std::time::{Duration, Instant};

use crate::{
    assets::{
        decode::PreparedImage,
        font::FontAsset,
        loader::{ImageLoader, ImageSource, Upload, is_image_mime},
    },
    caption::{
        manager::CaptionManager,
        model::{Caption, CaptionPosition, CaptionState},
    },
    editor::loads::{LoadCompletion, LoadQueue, LoadTicket},
    foundation::{
        config::EditorConfig,
        error::{MemeError, MemeResult},
    },
    layout::fit::fit_contain,
    render::{
        export::{ExportArtifact, export_png},
        surface::{BackgroundLayer, Surface},
    },
    templates::catalog::{Template, find_template},
};

const MSG_TEMPLATE_LOADED: &str = "Template loaded! Ready to create your meme!";
const MSG_UPLOAD_LOADED: &str = "Image uploaded! Add your text to create a meme!";
const MSG_IMAGE_LOADED: &str = "Image loaded! Add text to create your meme!";
const MSG_LOAD_FAILED: &str = "Failed to load image. Try a different one!";
const MSG_SELECT_INVALID: &str = "Please select a valid image file!";
const MSG_DROP_INVALID: &str = "Please drop a valid image file!";
const MSG_TOO_LARGE: &str = "Image too large! Please select an image under 10MB.";
const MSG_EXPORTED: &str = "Meme downloaded! Share it with the world!";
const MSG_EXPORT_FAILED: &str = "Failed to download meme. Try again!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing outcome of an editor operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Underlying error text, when the notice reports a failure.
    pub detail: Option<String>,
}

/// The image currently shown as background.
///
/// A template and an upload are never selected at the same time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Template(&'static Template),
    Upload { mime: String, len: usize },
    Reference(String),
}

impl Selection {
    fn from_source(source: &ImageSource) -> Self {
        match source {
            ImageSource::Upload(u) => Selection::Upload {
                mime: u.mime.clone(),
                len: u.bytes.len(),
            },
            ImageSource::Template(t) => Selection::Template(t),
            ImageSource::Reference(r) => Selection::Reference(r.clone()),
        }
    }

    fn loaded_message(&self) -> &'static str {
        match self {
            Selection::Template(_) => MSG_TEMPLATE_LOADED,
            Selection::Upload { .. } => MSG_UPLOAD_LOADED,
            Selection::Reference(_) => MSG_IMAGE_LOADED,
        }
    }

    pub fn template(&self) -> Option<&'static Template> {
        match self {
            Selection::Template(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Selection::Upload { .. })
    }
}

/// How a load completion was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image became the new background.
    Applied,
    /// A newer request superseded this one; nothing changed.
    Stale,
}

/// Raw text-control values, kept so captions can be rebuilt after a background change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionInputs {
    pub top: String,
    pub bottom: String,
    pub font_size: u32,
}

impl CaptionInputs {
    fn text(&self, position: CaptionPosition) -> &str {
        match position {
            CaptionPosition::Top => &self.top,
            CaptionPosition::Bottom => &self.bottom,
        }
    }
}

/// One meme-editing session: a surface, its captions, and the current source image.
///
/// Loads are sequenced: every request gets a [`LoadTicket`] and only the most recently issued
/// ticket may change the background. Failed operations leave the session as it was and queue
/// an error [`Notice`].
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    loader: ImageLoader,
    surface: Surface,
    captions: CaptionManager,
    inputs: CaptionInputs,
    selection: Option<Selection>,
    loads: LoadQueue,
    notices: Vec<Notice>,
}

impl Editor {
    pub fn new(config: EditorConfig, font: FontAsset) -> MemeResult<Self> {
        config.validate()?;
        let surface = Surface::new(config.canvas, config.background)?;
        let captions = CaptionManager::new(font, config.font_size_range());
        let inputs = CaptionInputs {
            top: String::new(),
            bottom: String::new(),
            font_size: config.default_font_size,
        };
        Ok(Self {
            loader: ImageLoader::new(&config),
            surface,
            captions,
            inputs,
            selection: None,
            loads: LoadQueue::new(),
            notices: Vec::new(),
            config,
        })
    }

    /// Build an editor using `config.font_path`, or the system's heavy sans-serif when unset.
    pub fn from_config(config: EditorConfig) -> MemeResult<Self> {
        let font = match &config.font_path {
            Some(path) => FontAsset::from_path(path)?,
            None => FontAsset::system_default()?,
        };
        Self::new(config, font)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn inputs(&self) -> &CaptionInputs {
        &self.inputs
    }

    pub fn caption_state(&self, position: CaptionPosition) -> CaptionState {
        self.surface.caption_state(position)
    }

    pub fn can_export(&self) -> bool {
        self.surface.has_background()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Start decoding `source` in the background and return its ticket.
    ///
    /// Uploads are validated here, before any work is spawned.
    pub fn request_load(&mut self, source: ImageSource) -> MemeResult<LoadTicket> {
        if let ImageSource::Upload(upload) = &source {
            self.check_upload(upload, MSG_SELECT_INVALID)?;
        }
        Ok(self.spawn_load(source))
    }

    fn spawn_load(&mut self, source: ImageSource) -> LoadTicket {
        let ticket = self.loads.issue();
        tracing::debug!(ticket = ticket.0, source = %source.describe(), "load requested");
        self.loads.spawn(ticket, self.loader.clone(), source);
        ticket
    }

    fn check_upload(&mut self, upload: &Upload, invalid_type_msg: &str) -> MemeResult<()> {
        self.loader.validate_upload(upload).map_err(|err| {
            let msg = if is_image_mime(&upload.mime) {
                MSG_TOO_LARGE
            } else {
                invalid_type_msg
            };
            self.fail(msg, err)
        })
    }

    /// Apply every completion that has already arrived. Returns how many changed the background.
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.loads.try_next() {
            if let Ok(LoadOutcome::Applied) = self.settle(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until `ticket` settles or `timeout` elapses.
    ///
    /// Completions for other tickets that arrive meanwhile are settled too. On timeout the
    /// ticket is retired so a late arrival cannot replace the background.
    #[tracing::instrument(skip(self, ticket), fields(ticket = ticket.0))]
    pub fn wait_for_load(
        &mut self,
        ticket: LoadTicket,
        timeout: Duration,
    ) -> MemeResult<LoadOutcome> {
        if !self.loads.is_current(ticket) {
            return Ok(LoadOutcome::Stale);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(completion) = self.loads.next_timeout(remaining) else {
                self.loads.retire(ticket);
                let err = MemeError::load(format!("image did not load within {timeout:?}"));
                return Err(self.fail(MSG_LOAD_FAILED, err));
            };
            let is_target = completion.ticket == ticket;
            let outcome = self.settle(completion);
            if is_target {
                return outcome;
            }
        }
    }

    fn load_now(&mut self, source: ImageSource) -> MemeResult<LoadOutcome> {
        let ticket = self.spawn_load(source);
        self.wait_for_load(ticket, self.config.load_timeout())
    }

    fn settle(&mut self, completion: LoadCompletion) -> MemeResult<LoadOutcome> {
        if !self.loads.is_current(completion.ticket) {
            tracing::debug!(ticket = completion.ticket.0, "discarding stale load");
            return Ok(LoadOutcome::Stale);
        }
        match completion.result {
            Ok(image) => {
                let selection = Selection::from_source(&completion.source);
                self.apply_background(image, selection)?;
                Ok(LoadOutcome::Applied)
            }
            Err(err) => Err(self.fail(MSG_LOAD_FAILED, err)),
        }
    }

    fn apply_background(&mut self, image: PreparedImage, selection: Selection) -> MemeResult<()> {
        let prepared = fit_contain(image.width, image.height, self.surface.canvas())
            .and_then(|placement| BackgroundLayer::prepare(image, placement));
        let layer = match prepared {
            Ok(layer) => layer,
            Err(err) => return Err(self.fail(MSG_LOAD_FAILED, err)),
        };

        let captions = match self.build_captions(self.inputs.font_size) {
            Ok(captions) => captions,
            Err(err) => return Err(self.fail(MSG_LOAD_FAILED, err)),
        };

        self.surface.reset(self.config.background);
        self.surface.install_background(layer);
        self.install_captions(captions);
        self.surface.render()?;

        tracing::info!(selection = ?selection, "background applied");
        self.notify(selection.loaded_message());
        self.selection = Some(selection);
        Ok(())
    }

    // Shapes both captions from the current inputs; the surface is untouched until install.
    fn build_captions(&mut self, font_size: u32) -> MemeResult<[Option<Caption>; 2]> {
        let mut built = [None, None];
        for position in CaptionPosition::ALL {
            built[position.slot()] =
                self.captions
                    .build_caption(position, self.inputs.text(position), font_size)?;
        }
        Ok(built)
    }

    fn install_captions(&mut self, built: [Option<Caption>; 2]) {
        for (position, caption) in CaptionPosition::ALL.into_iter().zip(built) {
            self.surface.remove_caption(position);
            if let Some(caption) = caption {
                self.surface.insert_caption(caption);
            }
        }
    }

    /// Select a catalog template by id or display name. Clears any uploaded image.
    #[tracing::instrument(skip(self))]
    pub fn select_template(&mut self, key: &str) -> MemeResult<LoadOutcome> {
        let template = match find_template(key) {
            Ok(t) => t,
            Err(err) => return Err(self.fail(MSG_LOAD_FAILED, err)),
        };
        self.load_now(ImageSource::Template(template))
    }

    /// Use a file chosen through the picker. Clears any selected template.
    pub fn upload(&mut self, upload: Upload) -> MemeResult<LoadOutcome> {
        self.accept_upload(upload, MSG_SELECT_INVALID)
    }

    /// Use a file dropped onto the drop zone; validated exactly like [`Editor::upload`].
    pub fn drop_file(&mut self, upload: Upload) -> MemeResult<LoadOutcome> {
        self.accept_upload(upload, MSG_DROP_INVALID)
    }

    #[tracing::instrument(skip(self, upload, invalid_type_msg), fields(upload = ?upload))]
    fn accept_upload(
        &mut self,
        upload: Upload,
        invalid_type_msg: &'static str,
    ) -> MemeResult<LoadOutcome> {
        self.check_upload(&upload, invalid_type_msg)?;
        self.load_now(ImageSource::Upload(upload))
    }

    /// Load an `http(s)://` URL or a path under the assets root.
    pub fn open_reference(&mut self, reference: impl Into<String>) -> MemeResult<LoadOutcome> {
        self.load_now(ImageSource::Reference(reference.into()))
    }

    pub fn set_top_text(&mut self, text: impl Into<String>) -> MemeResult<CaptionState> {
        self.set_text(CaptionPosition::Top, text.into())
    }

    pub fn set_bottom_text(&mut self, text: impl Into<String>) -> MemeResult<CaptionState> {
        self.set_text(CaptionPosition::Bottom, text.into())
    }

    fn set_text(&mut self, position: CaptionPosition, text: String) -> MemeResult<CaptionState> {
        let state = self.captions.set_caption(
            &mut self.surface,
            position,
            &text,
            self.inputs.font_size,
        )?;
        match position {
            CaptionPosition::Top => self.inputs.top = text,
            CaptionPosition::Bottom => self.inputs.bottom = text,
        }
        Ok(state)
    }

    /// Change the caption size and rebuild both captions with it.
    pub fn set_font_size(&mut self, font_size: u32) -> MemeResult<()> {
        if let Err(err) = self.captions.validate_font_size(font_size) {
            let range = self.captions.font_sizes();
            let msg = format!(
                "Font size must be between {} and {}px.",
                range.start(),
                range.end()
            );
            return Err(self.fail(&msg, err));
        }
        let captions = self.build_captions(font_size)?;
        self.inputs.font_size = font_size;
        self.install_captions(captions);
        self.surface.render()
    }

    /// Render the meme at the configured export multiplier and encode it as PNG.
    pub fn export(&mut self) -> MemeResult<ExportArtifact> {
        match export_png(&self.surface, self.config.export_multiplier) {
            Ok(artifact) => {
                self.notify(MSG_EXPORTED);
                Ok(artifact)
            }
            Err(err) => Err(self.fail(MSG_EXPORT_FAILED, err)),
        }
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            message: message.to_string(),
            detail: None,
        });
    }

    fn fail(&mut self, message: &str, err: MemeError) -> MemeError {
        tracing::warn!(error = %err, "{message}");
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: message.to_string(),
            detail: Some(err.to_string()),
        });
        err
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
