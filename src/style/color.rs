//! Color types for layer styling.

use std::{fmt, str::FromStr};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// This color with an alpha channel; alpha is clamped to [0.0, 1.0] and NaN becomes 0.
    pub fn with_alpha(self, alpha: f64) -> Rgba {
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        Rgba { rgb: self, a }
    }

    /// Format as CSS hex: #rrggbb
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    /// Parses `"r,g,b"` (whitespace allowed) or `"#rrggbb"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() { bail!("expected #rrggbb, got {s:?}") }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("bad hex color {s:?}"));
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else { bail!("expected \"r,g,b\", got {s:?}") };
        let channel = |c: &str| c.parse::<u8>().with_context(|| format!("bad color channel {c:?} in {s:?}"));
        Ok(Self::new(channel(*r)?, channel(*g)?, channel(*b)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{},{},{}", self.r, self.g, self.b))
    }
}

impl<'de> Deserialize<'de> for Rgb {
    /// Accepts `"r,g,b"`, `"#rrggbb"`, or `[r, g, b]`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Triple([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Triple([r, g, b]) => Ok(Self::new(r, g, b)),
        }
    }
}

/// RGB color with alpha in [0.0, 1.0].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f64,
}

impl fmt::Display for Rgba {
    /// Format as CSS: rgba(r, g, b, a)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.rgb.r, self.rgb.g, self.rgb.b, self.a)
    }
}
