use crate::foundation::error::{MemeError, MemeResult};

pub use kurbo::{Affine, Rect, Vec2};

/// Logical size of the editing surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// The editor's fixed 500x500 surface.
    pub const MEME: Canvas = Canvas {
        width: 500,
        height: 500,
    };

    pub fn new(width: u32, height: u32) -> MemeResult<Self> {
        if width == 0 || height == 0 {
            return Err(MemeError::validation("canvas dimensions must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(MemeError::validation("canvas dimensions must fit in u16"));
        }
        Ok(Self { width, height })
    }

    /// Canvas scaled by an integer raster multiplier.
    pub fn scaled(self, multiplier: u32) -> MemeResult<Self> {
        let width = self.width.checked_mul(multiplier);
        let height = self.height.checked_mul(multiplier);
        match (width, height) {
            (Some(w), Some(h)) if multiplier > 0 => Self::new(w, h),
            _ => Err(MemeError::validation(format!(
                "invalid raster multiplier {multiplier} for {}x{} canvas",
                self.width, self.height
            ))),
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::MEME
    }
}

/// Straight (non-premultiplied) RGBA8 color.
///
/// Serialized as `#RRGGBB` / `#RRGGBBAA`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::opaque(0, 0, 0);
    /// Default surface background (`#1a1a2e`).
    pub const MIDNIGHT: Rgba8 = Rgba8::opaque(0x1a, 0x1a, 0x2e);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn parse_hex(s: &str) -> MemeResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(MemeError::validation(format!("invalid hex color \"{s}\"")));
        }

        fn hex_byte(pair: &str) -> MemeResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| MemeError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match s.len() {
            6 => Ok(Self::opaque(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err(MemeError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rgba8::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
