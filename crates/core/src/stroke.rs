//! Ink stroke data model
//!
//! A stroke is an ordered point path plus a style. The engine never
//! rasterizes ink; it only needs bounds, hit testing and affine transforms.

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Unique identifier for a stroke
///
/// Preserved across transforms so undo snapshots and surfaces can match
/// strokes before and after a geometry change.
pub type StrokeId = uuid::Uuid;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };
}

/// Kind of ink instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InkKind {
    #[default]
    Pen,
    Pencil,
    Marker,
}

/// Visual styling of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    /// Stroke width in the units of the space the stroke lives in
    pub width: f32,
    pub kind: InkKind,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f32, kind: InkKind) -> Self {
        Self { color, width, kind }
    }

    /// Default pen (black, 2pt)
    pub fn pen() -> Self {
        Self { color: Color::BLACK, width: 2.0, kind: InkKind::Pen }
    }

    /// Semi-transparent yellow marker
    pub fn highlighter() -> Self {
        Self { color: Color::new(255, 255, 0, 128), width: 12.0, kind: InkKind::Marker }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::pen()
    }
}

/// 2x3 affine transform: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self { e: tx, f: ty, ..Self::IDENTITY }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Transform that applies `self` first, then `next`
    pub fn then(&self, next: &Affine) -> Affine {
        Affine {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Uniform factor applied to lengths (geometric mean of the axis scales)
    pub fn length_scale(&self) -> f32 {
        self.determinant().abs().sqrt()
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A freehand ink stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<Point>,
    style: StrokeStyle,
}

impl Stroke {
    /// Create a new stroke with a generated ID
    pub fn new(points: Vec<Point>, style: StrokeStyle) -> Self {
        Self { id: StrokeId::new_v4(), points, style }
    }

    /// Create a stroke with a specific ID (for deserialization)
    pub fn with_id(id: StrokeId, points: Vec<Point>, style: StrokeStyle) -> Self {
        Self { id, points, style }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounds of the point path, `None` for an empty stroke
    pub fn path_bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let mut min_x = first.x;
        let mut max_x = first.x;
        let mut min_y = first.y;
        let mut max_y = first.y;
        for point in self.points.iter().skip(1) {
            min_x = min_x.min(point.x);
            max_x = max_x.max(point.x);
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }
        Some(Rect::from_bounds(min_x, min_y, max_x, max_y))
    }

    /// Bounds of the painted ink: the path padded by half the width
    pub fn render_bounds(&self) -> Option<Rect> {
        self.path_bounds().map(|bounds| bounds.inflate(self.style.width.max(0.0) / 2.0))
    }

    /// New stroke with `transform` applied to every point.
    ///
    /// The width is scaled by the transform's length scale, so mapping into
    /// a space and back restores it. The ID is preserved.
    pub fn transformed(&self, transform: &Affine) -> Stroke {
        let points = self.points.iter().map(|p| transform.apply(*p)).collect();
        let width = self.style.width * transform.length_scale();
        let style = StrokeStyle { width, ..self.style };
        Stroke { id: self.id, points, style }
    }

    /// Whether `point` lies within `radius` of the painted path
    pub fn hits(&self, point: &Point, radius: f32) -> bool {
        let tolerance = radius + self.style.width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [only] => point.distance_to(only) <= tolerance,
            points => points
                .windows(2)
                .any(|segment| point_near_line_segment(point, &segment[0], &segment[1], tolerance)),
        }
    }

    /// Component-wise comparison within `epsilon` (points and width)
    pub fn approx_eq(&self, other: &Stroke, epsilon: f32) -> bool {
        self.id == other.id
            && self.style.color == other.style.color
            && self.style.kind == other.style.kind
            && (self.style.width - other.style.width).abs() <= epsilon
            && self.points.len() == other.points.len()
            && self.points.iter().zip(&other.points).all(|(a, b)| {
                (a.x - b.x).abs() <= epsilon && (a.y - b.y).abs() <= epsilon
            })
    }
}

/// Point-to-line-segment distance check
fn point_near_line_segment(point: &Point, start: &Point, end: &Point, tolerance: f32) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-6 {
        // Degenerate segment
        return point.distance_to(start) <= tolerance;
    }

    let t = ((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);

    let closest = Point::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(&closest) <= tolerance
}
