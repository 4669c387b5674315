use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    assets::decode::{PreparedImage, decode_image},
    foundation::{
        config::EditorConfig,
        error::{MemeError, MemeResult},
    },
    templates::catalog::Template,
};

/// In-memory file handed over by the file picker or a drag-and-drop.
#[derive(Clone)]
pub struct Upload {
    /// Declared MIME type, e.g. `image/png`.
    pub mime: String,
    pub bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("mime", &self.mime)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl Upload {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Build an upload from a file on disk, inferring the MIME type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| MemeError::load(format!("read '{}': {e}", path.display())))?;
        Ok(Self::new(mime_for_path(path), bytes))
    }
}

/// Where a background image comes from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    Upload(Upload),
    Template(&'static Template),
    /// `http(s)://` URL or a path relative to the assets root.
    Reference(String),
}

impl ImageSource {
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Upload(u) => format!("upload ({}, {} bytes)", u.mime, u.bytes.len()),
            ImageSource::Template(t) => format!("template '{}'", t.id),
            ImageSource::Reference(r) => format!("reference '{r}'"),
        }
    }
}

/// Resolves an [`ImageSource`] to bytes and decodes them.
///
/// Cheap to clone; decodes may run on worker threads.
#[derive(Clone, Debug)]
pub struct ImageLoader {
    assets_root: PathBuf,
    max_upload_bytes: u64,
    http_timeout: Duration,
}

impl ImageLoader {
    pub fn new(cfg: &EditorConfig) -> Self {
        Self {
            assets_root: cfg.assets_root.clone(),
            max_upload_bytes: cfg.max_upload_bytes,
            http_timeout: cfg.http_timeout(),
        }
    }

    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    /// Check an upload's declared type and size; runs before any decode.
    pub fn validate_upload(&self, upload: &Upload) -> MemeResult<()> {
        validate_upload(upload, self.max_upload_bytes)
    }

    #[tracing::instrument(skip(self, source), fields(source = %source.describe()))]
    pub fn load(&self, source: &ImageSource) -> MemeResult<PreparedImage> {
        let bytes = self.fetch(source)?;
        decode_image(bytes.as_slice())
    }

    /// True when resolving `source` goes over the network.
    pub fn needs_network(&self, source: &ImageSource) -> bool {
        match source {
            ImageSource::Upload(_) => false,
            ImageSource::Template(t) => !self.assets_root.join(t.local_path()).is_file(),
            ImageSource::Reference(r) => is_remote(r),
        }
    }

    /// Resolve `source` to its encoded bytes without decoding them.
    pub fn fetch(&self, source: &ImageSource) -> MemeResult<Arc<Vec<u8>>> {
        let bytes = match source {
            ImageSource::Upload(u) => {
                self.validate_upload(u)?;
                return Ok(Arc::clone(&u.bytes));
            }
            ImageSource::Template(t) => {
                let local = self.assets_root.join(t.local_path());
                if local.is_file() {
                    read_file(&local)?
                } else {
                    tracing::debug!(path = %local.display(), "no local template copy, fetching");
                    self.fetch_remote(t.url)?
                }
            }
            ImageSource::Reference(r) if is_remote(r) => self.fetch_remote(r)?,
            ImageSource::Reference(r) => {
                let rel = normalize_rel_path(r)?;
                read_file(&self.assets_root.join(rel))?
            }
        };
        Ok(Arc::new(bytes))
    }

    #[cfg(feature = "remote")]
    fn fetch_remote(&self, url: &str) -> MemeResult<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| MemeError::load(format!("failed to build HTTP client: {e}")))?;
        let resp = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| MemeError::load(format!("failed to fetch {url}: {e}")))?;
        let body = resp
            .bytes()
            .map_err(|e| MemeError::load(format!("failed to read body of {url}: {e}")))?;
        Ok(body.to_vec())
    }

    #[cfg(not(feature = "remote"))]
    fn fetch_remote(&self, url: &str) -> MemeResult<Vec<u8>> {
        let _ = self.http_timeout;
        Err(MemeError::load(format!(
            "cannot fetch {url}: built without the `remote` feature"
        )))
    }
}

pub(crate) fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

pub(crate) fn validate_upload(upload: &Upload, max_bytes: u64) -> MemeResult<()> {
    if !is_image_mime(&upload.mime) {
        return Err(MemeError::validation(format!(
            "'{}' is not an image type; please select a valid image file",
            upload.mime
        )));
    }
    let len = upload.bytes.len() as u64;
    if len > max_bytes {
        return Err(MemeError::validation(format!(
            "image too large ({len} bytes); the limit is {max_bytes} bytes"
        )));
    }
    Ok(())
}

/// MIME type guessed from a file extension; unknown extensions map to `application/octet-stream`.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

fn is_remote(reference: &str) -> bool {
    let r = reference.trim_start();
    r.starts_with("http://") || r.starts_with("https://")
}

fn read_file(path: &Path) -> MemeResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| MemeError::load(format!("read '{}': {e}", path.display())))
}

/// Normalize and validate assets-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MemeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MemeError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(MemeError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MemeError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MemeError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
