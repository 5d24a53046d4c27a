//! Color and paint types
//!
//! Colors are stored as straight RGBA floats in `0.0..=1.0`. In config files
//! they are written as `"#rrggbb"` or `"#rrggbbaa"` strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when a color string can't be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{0}`: expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit channels
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 1.0)
    }

    /// Create a color from 8-bit channels and a float alpha
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional)
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let digits = s.trim().trim_start_matches('#');
        let invalid = || ColorParseError(s.to_string());

        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let r = channel(0)?;
        let g = channel(2)?;
        let b = channel(4)?;
        let a = if digits.len() == 8 {
            channel(6)? as f32 / 255.0
        } else {
            1.0
        };

        Ok(Self::rgba8(r, g, b, a))
    }

    fn channel_u8(v: f32) -> u8 {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            Self::channel_u8(self.r),
            Self::channel_u8(self.g),
            Self::channel_u8(self.b)
        )?;
        if self.a < 1.0 {
            write!(f, "{:02x}", Self::channel_u8(self.a))?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Gradient type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gradient {
    /// Linear gradient; `angle` in degrees, 0 runs top to bottom
    Linear {
        angle: f32,
        stops: Vec<GradientStop>,
    },
    /// Radial gradient centered on the control
    Radial { stops: Vec<GradientStop> },
}

/// Paint for filling the clock's background, border and foreground
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

impl Brush {
    pub const TRANSPARENT: Brush = Brush::Solid(Color::TRANSPARENT);
}

impl Default for Brush {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

impl From<Gradient> for Brush {
    fn from(gradient: Gradient) -> Self {
        Brush::Gradient(gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rgb_and_rgba() {
        assert_eq!(Color::parse("#242424").unwrap(), Color::rgb8(36, 36, 36));
        assert_eq!(Color::parse("ffffff").unwrap(), Color::WHITE);

        let c = Color::parse("#ffffff80").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn test_display_formats_hex() {
        let c = Color::rgb8(255, 165, 24);
        assert_eq!(c.to_string(), "#ffa518");
        assert_eq!(Color::TRANSPARENT.to_string(), "#00000000");
    }

    #[test]
    fn test_brush_from_toml() {
        #[derive(Deserialize)]
        struct Paints {
            solid: Brush,
            gradient: Brush,
        }

        let paints: Paints = toml::from_str(
            r##"
            solid = "#282a30"

            [gradient]
            type = "linear"
            angle = 90.0
            stops = [
                { offset = 0.0, color = "#000000" },
                { offset = 1.0, color = "#ffffff" },
            ]
            "##,
        )
        .unwrap();

        assert_eq!(paints.solid, Brush::Solid(Color::rgb8(40, 42, 48)));
        match paints.gradient {
            Brush::Gradient(Gradient::Linear { angle, stops }) => {
                assert_eq!(angle, 90.0);
                assert_eq!(stops.len(), 2);
                assert_eq!(stops[1].color, Color::WHITE);
            }
            other => panic!("expected linear gradient, got {other:?}"),
        }
    }
}
