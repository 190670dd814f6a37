//! Geometry data model
//!
//! Plain data describing the page, the expanded drawing surface and the
//! margin configuration. Behavior lives in [`crate::layout`] and
//! [`crate::transform`].
//!
//! Coordinates use a top-left origin with Y increasing downward, matching
//! the drawing surface the ink is captured on.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Default surface expansion factor (surface = factor x page size)
pub const DEFAULT_EXPANSION_FACTOR: f32 = 2.8;

/// 2D point in surface, view or normalized page space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Same size with width and height exchanged
    pub fn swapped(&self) -> Self {
        Self { width: self.height, height: self.width }
    }

    /// Scale both dimensions by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self { width: self.width * factor, height: self.height * factor }
    }

    /// True when both dimensions are finite and strictly positive
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle (origin at top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanning two corner coordinates
    pub fn from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Closed-interval intersection test.
    ///
    /// Rectangles that only touch along an edge, and zero-sized rectangles
    /// lying on or inside `other`, count as intersecting.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.max_x()
            && other.x <= self.max_x()
            && self.y <= other.max_y()
            && other.y <= self.max_y()
    }

    /// Grow every edge outward by `amount`
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Rect, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// Page rotation in quarter turns (clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a rotation in degrees. Negative and >= 360 values are
    /// normalized; anything that is not a multiple of 90 is rejected.
    pub fn from_degrees(degrees: i32) -> EngineResult<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(EngineError::InvalidRotation(degrees)),
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether the on-screen width and height are exchanged
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Compose two rotations
    pub fn plus(&self, other: Rotation) -> Rotation {
        match (self.degrees() + other.degrees()) % 360 {
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }
}

/// Horizontal component of an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical component of an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

/// Page placement inside the drawing surface (3x3 grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn horizontal(&self) -> HorizontalAlign {
        match self {
            Anchor::TopLeft | Anchor::CenterLeft | Anchor::BottomLeft => HorizontalAlign::Left,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => HorizontalAlign::Center,
            Anchor::TopRight | Anchor::CenterRight | Anchor::BottomRight => HorizontalAlign::Right,
        }
    }

    pub fn vertical(&self) -> VerticalAlign {
        match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => VerticalAlign::Top,
            Anchor::CenterLeft | Anchor::Center | Anchor::CenterRight => VerticalAlign::Center,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => {
                VerticalAlign::Bottom
            }
        }
    }

    /// Parse a kebab/snake-case name such as `top-left` or `center`
    pub fn from_name(name: &str) -> Option<Anchor> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "top_left" => Some(Anchor::TopLeft),
            "top_center" | "top" => Some(Anchor::TopCenter),
            "top_right" => Some(Anchor::TopRight),
            "center_left" | "left" => Some(Anchor::CenterLeft),
            "center" => Some(Anchor::Center),
            "center_right" | "right" => Some(Anchor::CenterRight),
            "bottom_left" => Some(Anchor::BottomLeft),
            "bottom_center" | "bottom" => Some(Anchor::BottomCenter),
            "bottom_right" => Some(Anchor::BottomRight),
            _ => None,
        }
    }
}

/// Margin ("expanded surface") configuration for one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginSettings {
    pub enabled: bool,
    pub anchor: Anchor,
    /// Fraction of the page's true size shown when margins are enabled
    pub scale: f32,
}

impl Default for MarginSettings {
    fn default() -> Self {
        Self { enabled: false, anchor: Anchor::Center, scale: 1.0 }
    }
}

impl MarginSettings {
    /// Enabled margins with the page anchored at `anchor` and shrunk by `scale`
    pub fn new(anchor: Anchor, scale: f32) -> EngineResult<Self> {
        let settings = Self { enabled: true, anchor, scale };
        settings.validate()?;
        Ok(settings)
    }

    /// Margins turned off; the page fills the surface at full size, centered
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Scale actually applied to the page.
    ///
    /// Disabled margins always mean full size, whatever `scale` holds.
    pub fn effective_scale(&self) -> f32 {
        if self.enabled {
            self.scale
        } else {
            1.0
        }
    }

    /// Anchor actually applied to the page (disabled margins center it)
    pub fn effective_anchor(&self) -> Anchor {
        if self.enabled {
            self.anchor
        } else {
            Anchor::Center
        }
    }

    /// Check `scale` lies in `(0, 1]`. Disabled settings are always valid.
    pub fn validate(&self) -> EngineResult<()> {
        if self.enabled && !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(EngineError::InvalidScale(self.scale));
        }
        Ok(())
    }

    /// Whether two settings place the page identically
    pub fn same_placement(&self, other: &MarginSettings) -> bool {
        self.effective_anchor() == other.effective_anchor()
            && (self.effective_scale() - other.effective_scale()).abs() <= f32::EPSILON
    }
}

/// Everything that determines where the page sits in the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryModel {
    pub page_index: usize,
    /// Un-rotated authoring size of the page
    pub page_size: Size,
    /// Effective rotation (intrinsic page rotation plus view rotation)
    pub rotation: Rotation,
    pub margin: MarginSettings,
    pub expansion_factor: f32,
}

/// Location of the page's content area inside the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFrame {
    /// Page rectangle in surface coordinates
    pub rect: Rect,
    /// Size of the whole drawing surface
    pub surface: Size,
}

impl PageFrame {
    pub fn origin(&self) -> Point {
        self.rect.origin()
    }

    pub fn size(&self) -> Size {
        self.rect.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(90).unwrap(), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Deg90);
        assert!(matches!(Rotation::from_degrees(45), Err(EngineError::InvalidRotation(45))));
    }

    #[test]
    fn test_rotation_composition() {
        assert_eq!(Rotation::Deg90.plus(Rotation::Deg270), Rotation::Deg0);
        assert_eq!(Rotation::Deg180.plus(Rotation::Deg90), Rotation::Deg270);
        assert!(Rotation::Deg270.swaps_axes());
        assert!(!Rotation::Deg180.swaps_axes());
    }

    #[test]
    fn test_rect_intersection_is_closed() {
        let frame = Rect::new(90.0, 90.0, 100.0, 100.0);
        // Touching the left edge counts
        assert!(Rect::new(80.0, 100.0, 10.0, 10.0).intersects(&frame));
        // Zero-sized rect inside counts
        assert!(Rect::new(120.0, 120.0, 0.0, 0.0).intersects(&frame));
        // Fully outside
        assert!(!Rect::new(0.0, 0.0, 50.0, 50.0).intersects(&frame));
    }

    #[test]
    fn test_margin_scale_validation() {
        assert!(MarginSettings::new(Anchor::TopLeft, 0.5).is_ok());
        assert!(MarginSettings::new(Anchor::TopLeft, 1.0).is_ok());
        assert!(MarginSettings::new(Anchor::TopLeft, 0.0).is_err());
        assert!(MarginSettings::new(Anchor::TopLeft, 1.5).is_err());
        assert!(MarginSettings::new(Anchor::TopLeft, f32::NAN).is_err());

        // Disabled settings ignore the stored scale entirely
        let disabled = MarginSettings { enabled: false, anchor: Anchor::BottomRight, scale: 7.0 };
        assert!(disabled.validate().is_ok());
        assert_eq!(disabled.effective_scale(), 1.0);
        assert_eq!(disabled.effective_anchor(), Anchor::Center);
    }

    #[test]
    fn test_anchor_names() {
        assert_eq!(Anchor::from_name("top-left"), Some(Anchor::TopLeft));
        assert_eq!(Anchor::from_name("BOTTOM_RIGHT"), Some(Anchor::BottomRight));
        assert_eq!(Anchor::from_name("center"), Some(Anchor::Center));
        assert_eq!(Anchor::from_name("middle"), None);
        for anchor in Anchor::ALL {
            let name = serde_json::to_string(&anchor).unwrap();
            assert_eq!(Anchor::from_name(name.trim_matches('"')), Some(anchor));
        }
    }
}
