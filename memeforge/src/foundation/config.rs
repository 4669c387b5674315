use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::foundation::{
    core::{Canvas, Rgba8},
    error::{MemeError, MemeResult},
};

/// Upload payloads larger than this are rejected before decode (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
/// Inclusive font-size range offered by the editor's slider.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 20..=80;
pub const DEFAULT_FONT_SIZE: u32 = 40;
/// Export rasterizes at this multiple of the logical canvas.
pub const EXPORT_MULTIPLIER: u32 = 2;

const ENV_LOAD_TIMEOUT_MS: &str = "MEMEFORGE_LOAD_TIMEOUT_MS";
const ENV_ASSETS_ROOT: &str = "MEMEFORGE_ASSETS_ROOT";

/// Editor configuration.
///
/// Every field has a default matching the stock editor, so an empty JSON object is a valid
/// config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub canvas: Canvas,
    pub background: Rgba8,
    pub export_multiplier: u32,
    pub font_size_min: u32,
    pub font_size_max: u32,
    pub default_font_size: u32,
    pub max_upload_bytes: u64,
    /// Directory searched for template images (`templates/<id>.jpg`) and relative references.
    pub assets_root: PathBuf,
    /// Optional caption font file; when unset the system font database is queried.
    pub font_path: Option<PathBuf>,
    pub load_timeout_ms: u64,
    pub http_timeout_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::MEME,
            background: Rgba8::MIDNIGHT,
            export_multiplier: EXPORT_MULTIPLIER,
            font_size_min: *FONT_SIZE_RANGE.start(),
            font_size_max: *FONT_SIZE_RANGE.end(),
            default_font_size: DEFAULT_FONT_SIZE,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            assets_root: PathBuf::from("."),
            font_path: None,
            load_timeout_ms: 30_000,
            http_timeout_ms: 15_000,
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| MemeError::validation(format!("config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `MEMEFORGE_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = std::env::var(ENV_LOAD_TIMEOUT_MS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            self.load_timeout_ms = ms;
        }
        if let Some(root) = std::env::var_os(ENV_ASSETS_ROOT).filter(|v| !v.is_empty()) {
            self.assets_root = PathBuf::from(root);
        }
        self
    }

    pub fn validate(&self) -> MemeResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        self.canvas.scaled(self.export_multiplier)?;
        if self.font_size_min == 0 || self.font_size_min > self.font_size_max {
            return Err(MemeError::validation(
                "font size bounds must satisfy 0 < min <= max",
            ));
        }
        if !(self.font_size_min..=self.font_size_max).contains(&self.default_font_size) {
            return Err(MemeError::validation(
                "default font size must lie within the font size bounds",
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(MemeError::validation("max upload size must be > 0"));
        }
        if self.load_timeout_ms == 0 {
            return Err(MemeError::validation("load timeout must be > 0"));
        }
        Ok(())
    }

    pub fn font_size_range(&self) -> std::ops::RangeInclusive<u32> {
        self.font_size_min..=self.font_size_max
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
