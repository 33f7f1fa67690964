use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fill used for the placeholder ring when nobody has voted.
    pub const NEUTRAL: Self = Self::from_rgb8(0xC8, 0xC8, 0xC8);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub const fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
        )
    }

    /// Black at the given opacity, used for borders, grid lines and shadows.
    #[must_use]
    pub const fn ink(alpha: f64) -> Self {
        Self::rgba(0.0, 0.0, 0.0, alpha)
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Parses `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> ChartResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ChartError::InvalidData(format!("`{hex}` is not a hex color"));
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |text: &str| u8::from_str_radix(text, 16).map_err(|_| invalid());
        let short = |index: usize| -> ChartResult<u8> {
            let nibble = channel(&digits[index..=index])?;
            Ok(nibble * 17)
        };

        let (red, green, blue, alpha) = match digits.len() {
            3 => (short(0)?, short(1)?, short(2)?, 255),
            4 => (short(0)?, short(1)?, short(2)?, short(3)?),
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                255,
            ),
            8 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            ),
            _ => return Err(invalid()),
        };

        Ok(Self::from_rgb8(red, green, blue).with_alpha(f64::from(alpha) / 255.0))
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Font selection for text draw and measure calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size_px: f64,
    pub bold: bool,
}

impl Font {
    #[must_use]
    pub const fn regular(size_px: f64) -> Self {
        Self {
            size_px,
            bold: false,
        }
    }

    #[must_use]
    pub const fn bold(size_px: f64) -> Self {
        Self {
            size_px,
            bold: true,
        }
    }
}

/// Horizontal text alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Vertical text alignment relative to the anchor y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// Anchor is the alphabetic baseline.
    Alphabetic,
    /// Anchor is the vertical middle of the em box.
    Middle,
}

/// Drop shadow applied under filled text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub color: Color,
    pub offset_y: f64,
}

/// Everything a backend needs to place one string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub color: Color,
    pub h_align: TextHAlign,
    pub baseline: TextBaseline,
    pub shadow: Option<TextShadow>,
}

impl TextStyle {
    #[must_use]
    pub const fn new(font: Font, color: Color) -> Self {
        Self {
            font,
            color,
            h_align: TextHAlign::Left,
            baseline: TextBaseline::Alphabetic,
            shadow: None,
        }
    }

    #[must_use]
    pub const fn centered(mut self) -> Self {
        self.h_align = TextHAlign::Center;
        self.baseline = TextBaseline::Middle;
        self
    }

    #[must_use]
    pub const fn aligned(mut self, h_align: TextHAlign, baseline: TextBaseline) -> Self {
        self.h_align = h_align;
        self.baseline = baseline;
        self
    }

    #[must_use]
    pub const fn with_shadow(mut self, color: Color, offset_y: f64) -> Self {
        self.shadow = Some(TextShadow { color, offset_y });
        self
    }
}

/// Line stroke description; an empty `dash` draws a solid line.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
    pub dash: SmallVec<[f64; 4]>,
}

impl Stroke {
    #[must_use]
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dash: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn dashed(width: f64, color: Color, pattern: &[f64]) -> Self {
        Self {
            width,
            color,
            dash: SmallVec::from_slice(pattern),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ChartError::InvalidData(
                "stroke width must be finite and > 0".to_owned(),
            ));
        }
        if self
            .dash
            .iter()
            .any(|segment| !segment.is_finite() || *segment < 0.0)
        {
            return Err(ChartError::InvalidData(
                "dash segments must be finite and >= 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Filled band between two concentric circles, swept clockwise from
/// `start_angle` to `end_angle` (radians, 0 = 3 o'clock).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSector {
    pub center_x: f64,
    pub center_y: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl RingSector {
    pub fn validate(self) -> ChartResult<()> {
        let values = [
            self.center_x,
            self.center_y,
            self.inner_radius,
            self.outer_radius,
            self.start_angle,
            self.end_angle,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(
                "ring sector values must be finite".to_owned(),
            ));
        }
        if self.inner_radius < 0.0 || self.outer_radius < self.inner_radius {
            return Err(ChartError::InvalidData(
                "ring sector radii must satisfy 0 <= inner <= outer".to_owned(),
            ));
        }
        Ok(())
    }
}
