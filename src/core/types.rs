use serde::{Deserialize, Serialize};

/// Pixel size of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Rounds fractional layout sizes up to the next even pixel count so that
    /// centered content lands on whole pixels.
    #[must_use]
    pub fn from_layout_size(width: f64, height: f64) -> Self {
        Self {
            width: even_ceil(width),
            height: even_ceil(height),
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

fn even_ceil(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value * 0.5).ceil() * 2.0).min(f64::from(u32::MAX)) as u32
}

/// Pointer position in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.h
    }

    #[must_use]
    pub fn contains_point(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// True when `other` lies entirely inside `self` (edges inclusive).
    #[must_use]
    pub fn contains_rect(self, other: Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, Viewport};

    #[test]
    fn layout_size_rounds_up_to_even_pixels() {
        assert_eq!(Viewport::from_layout_size(241.0, 80.2), Viewport::new(242, 82));
        assert_eq!(Viewport::from_layout_size(240.0, 0.0), Viewport::new(240, 0));
    }

    #[test]
    fn rect_point_containment_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(rect.contains_point(Point::new(10.0, 10.0)));
        assert!(!rect.contains_point(Point::new(30.0, 12.0)));
        assert!(rect.contains_rect(Rect::new(12.0, 11.0, 18.0, 4.0)));
        assert!(!rect.contains_rect(Rect::new(12.0, 11.0, 19.0, 4.0)));
    }
}
