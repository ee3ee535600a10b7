// ABOUTME: Color representation and conversion utilities.
// ABOUTME: Parses CSS-style color strings and converts to 8-bit RGBA.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::rgba(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
            rgba[3] as f32 / 255.0,
        )
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Parse a CSS color string.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
    /// `rgba(r, g, b, a)`. Surrounding whitespace is ignored.
    pub fn parse_css(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }

        let channel = |p: &str| p.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) / 255.0);
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            parts[3].parse::<f32>().ok()?.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(Self::rgba(r, g, b, a))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

    let rgba = match hex.len() {
        3 => [nibble(0)?, nibble(1)?, nibble(2)?, 255],
        6 => [byte(0)?, byte(2)?, byte(4)?, 255],
        8 => [byte(0)?, byte(2)?, byte(4)?, byte(6)?],
        _ => return None,
    };
    Some(Color::from_rgba8(rgba))
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let c = Color::parse_css("#8f98a1").unwrap();
        assert_eq!(c.to_rgba8(), [0x8f, 0x98, 0xa1, 255]);
    }

    #[test]
    fn parses_short_hex_and_whitespace() {
        let c = Color::parse_css("  #f0a ").unwrap();
        assert_eq!(c.to_rgba8(), [255, 0, 170, 255]);
    }

    #[test]
    fn parses_rgba_function() {
        let c = Color::parse_css("rgba(0, 0, 0, 0.5)").unwrap();
        assert_eq!(c.to_rgba8(), [0, 0, 0, 128]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::parse_css("").is_none());
        assert!(Color::parse_css("#12345").is_none());
        assert!(Color::parse_css("#zzzzzz").is_none());
        assert!(Color::parse_css("rgb(1,2)").is_none());
        assert!(Color::parse_css("hotpink").is_none());
    }
}
