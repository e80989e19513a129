use crate::error::ShowError;
use serde::Deserialize;
use std::fmt;

/// 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GOLD: Rgb = Rgb(255, 215, 0);

    /// Parses `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Rgb(r, g, b))
    }

    /// Linear blend towards `other`; `t` is clamped to 0..=1.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ShowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or(ShowError::InvalidColor(value))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Shell and heart colors.
pub const FIREWORK_COLORS: [Rgb; 15] = [
    Rgb(0xFF, 0x00, 0x00), // red
    Rgb(0x00, 0xFF, 0x00), // lime
    Rgb(0x00, 0x00, 0xFF), // blue
    Rgb(0xFF, 0xFF, 0x00), // yellow
    Rgb(0xFF, 0x00, 0xFF), // magenta
    Rgb(0x00, 0xFF, 0xFF), // cyan
    Rgb(0xFF, 0xA5, 0x00), // orange
    Rgb(0xFF, 0x14, 0x93), // deep pink
    Rgb(0x7F, 0xFF, 0x00), // chartreuse
    Rgb(0xFF, 0x69, 0xB4), // hot pink
    Rgb(0xFF, 0xD7, 0x00), // gold
    Rgb(0xFF, 0x45, 0x00), // orange red
    Rgb(0x94, 0x00, 0xD3), // dark violet
    Rgb(0x00, 0xFA, 0x9A), // spring green
    Rgb(0xFF, 0x14, 0x93), // deep pink
];

pub const SPARKLE_COLORS: [Rgb; 7] = [
    Rgb(0xFF, 0xD7, 0x00),
    Rgb(0xFF, 0xFF, 0xFF),
    Rgb(0xFF, 0x69, 0xB4),
    Rgb(0x00, 0xFF, 0xFF),
    Rgb(0xFF, 0x63, 0x47),
    Rgb(0x7C, 0xFC, 0x00),
    Rgb(0xDA, 0x70, 0xD6),
];

pub const MESSAGE_COLORS: [Rgb; 5] = [
    Rgb(0xE7, 0x4C, 0x3C),
    Rgb(0x9B, 0x59, 0xB6),
    Rgb(0x34, 0x98, 0xDB),
    Rgb(0x1A, 0xBC, 0x9C),
    Rgb(0xF3, 0x9C, 0x12),
];

pub const MESSAGE_GLOW_COLORS: [Rgb; 5] = [
    Rgb(0xC0, 0x39, 0x2B),
    Rgb(0x8E, 0x44, 0xAD),
    Rgb(0x29, 0x80, 0xB9),
    Rgb(0x16, 0xA0, 0x85),
    Rgb(0xD3, 0x54, 0x00),
];

/// Uniformly picks an entry of a non-empty palette.
pub fn pick(palette: &[Rgb]) -> Rgb {
    palette[fastrand::usize(0..palette.len())]
}
