//! Surface <-> normalized page space conversion
//!
//! A [`CoordinateTransformer`] is built from one [`PageFrame`] and is only
//! valid for the geometry that produced it. No rotation happens here:
//! rotation is already baked into the frame's dimensions by the layout
//! resolver, and any visual rotation of the rendered surface is applied by
//! the presentation layer around this coordinate system.

use crate::error::{EngineError, EngineResult};
use crate::geometry::{PageFrame, Point, Rect};
use crate::stroke::{Affine, Stroke};

/// Which part of the drawing surface a stroke belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Intersects the page frame; stored normalized, moves with the page
    Page,
    /// Entirely outside the page frame; stored in surface space
    Margin,
}

/// Stroke-space conversions for one page geometry plus the view's zoom/pan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    frame: PageFrame,
    zoom: f32,
    pan: Point,
    to_unit: Affine,
    to_surface: Affine,
}

impl CoordinateTransformer {
    /// Build a transformer for `frame`, rejecting frames without area
    pub fn new(frame: PageFrame) -> EngineResult<Self> {
        Self::with_view(frame, 1.0, Point::default())
    }

    /// Build a transformer with an explicit view zoom and pan offset
    pub fn with_view(frame: PageFrame, zoom: f32, pan: Point) -> EngineResult<Self> {
        if !frame.rect.size().has_area() || !frame.rect.x.is_finite() || !frame.rect.y.is_finite() {
            return Err(EngineError::DegenerateFrame);
        }
        validate_zoom(zoom)?;

        let rect = frame.rect;
        let to_unit = Affine::translate(-rect.x, -rect.y)
            .then(&Affine::scale(1.0 / rect.width, 1.0 / rect.height));
        let to_surface =
            Affine::scale(rect.width, rect.height).then(&Affine::translate(rect.x, rect.y));

        Ok(Self { frame, zoom, pan, to_unit, to_surface })
    }

    /// Same page geometry with a different zoom/pan
    pub fn with_zoom_and_pan(&self, zoom: f32, pan: Point) -> EngineResult<Self> {
        validate_zoom(zoom)?;
        Ok(Self { zoom, pan, ..*self })
    }

    pub fn frame(&self) -> &PageFrame {
        &self.frame
    }

    pub fn page_rect(&self) -> Rect {
        self.frame.rect
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    /// Surface space -> [0,1] page space
    pub fn normalize(&self, stroke: &Stroke) -> Stroke {
        stroke.transformed(&self.to_unit)
    }

    /// [0,1] page space -> surface space
    pub fn denormalize(&self, stroke: &Stroke) -> Stroke {
        stroke.transformed(&self.to_surface)
    }

    pub fn normalize_point(&self, point: Point) -> Point {
        self.to_unit.apply(point)
    }

    pub fn denormalize_point(&self, point: Point) -> Point {
        self.to_surface.apply(point)
    }

    /// Classify surface-space bounds. Any intersection with the page frame,
    /// including touching its edge, counts as [`Region::Page`].
    pub fn classify(&self, bounds: &Rect) -> Region {
        if bounds.intersects(&self.frame.rect) {
            Region::Page
        } else {
            Region::Margin
        }
    }

    pub fn classify_point(&self, point: Point) -> Region {
        self.classify(&Rect::new(point.x, point.y, 0.0, 0.0))
    }

    /// Classify a surface-space stroke by its render bounds.
    ///
    /// An empty stroke has no bounds and is kept in the margin set.
    pub fn classify_stroke(&self, stroke: &Stroke) -> Region {
        match stroke.render_bounds() {
            Some(bounds) => self.classify(&bounds),
            None => Region::Margin,
        }
    }

    /// View (zoomed, panned) point -> surface point
    pub fn view_to_surface(&self, point: Point) -> Point {
        Point::new((point.x - self.pan.x) / self.zoom, (point.y - self.pan.y) / self.zoom)
    }

    /// Surface point -> view (zoomed, panned) point
    pub fn surface_to_view(&self, point: Point) -> Point {
        Point::new(point.x * self.zoom + self.pan.x, point.y * self.zoom + self.pan.y)
    }

    /// Whether both transformers place the page identically
    pub fn same_frame(&self, other: &CoordinateTransformer) -> bool {
        self.frame.rect.approx_eq(&other.frame.rect, FRAME_EPSILON)
    }
}

/// Tolerance for comparing frames computed from the same settings
pub(crate) const FRAME_EPSILON: f32 = 1e-3;

fn validate_zoom(zoom: f32) -> EngineResult<()> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidZoom(zoom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Anchor, MarginSettings, Rotation, Size};
    use crate::layout::resolve;
    use crate::stroke::StrokeStyle;

    const EPS: f32 = 0.001;

    fn centered_square() -> CoordinateTransformer {
        let frame =
            resolve(Size::new(100.0, 100.0), Rotation::Deg0, &MarginSettings::disabled(), 2.8);
        CoordinateTransformer::new(frame).unwrap()
    }

    fn stroke(points: &[(f32, f32)]) -> Stroke {
        Stroke::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect(), StrokeStyle::pen())
    }

    #[test]
    fn test_normalize_corners() {
        let t = centered_square();
        let unit = t.normalize(&stroke(&[(90.0, 90.0), (190.0, 190.0), (140.0, 115.0)]));
        let points = unit.points();
        assert!(points[0].x.abs() < EPS && points[0].y.abs() < EPS);
        assert!((points[1].x - 1.0).abs() < EPS && (points[1].y - 1.0).abs() < EPS);
        assert!((points[2].x - 0.5).abs() < EPS && (points[2].y - 0.25).abs() < EPS);
    }

    #[test]
    fn test_margin_point_normalizes_outside_unit_square() {
        let t = centered_square();
        let unit = t.normalize(&stroke(&[(50.0, 50.0)]));
        assert!((unit.points()[0].x + 0.4).abs() < EPS);
        assert!((unit.points()[0].y + 0.4).abs() < EPS);
        assert_eq!(t.classify_point(Point::new(50.0, 50.0)), Region::Margin);
    }

    #[test]
    fn test_round_trip_all_geometries() {
        let sizes = [Size::new(100.0, 100.0), Size::new(612.0, 792.0), Size::new(100.0, 200.0)];
        let rotations = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270];
        let mut margins = vec![MarginSettings::disabled()];
        for anchor in Anchor::ALL {
            margins.push(MarginSettings::new(anchor, 0.4).unwrap());
            margins.push(MarginSettings::new(anchor, 1.0).unwrap());
        }

        let original = stroke(&[(0.0, 0.0), (13.5, 270.25), (600.0, 12.0), (-5.0, 900.0)]);
        for size in sizes {
            for rotation in rotations {
                for margin in &margins {
                    let frame = resolve(size, rotation, margin, 2.8);
                    let t = CoordinateTransformer::new(frame).unwrap();
                    let back = t.denormalize(&t.normalize(&original));
                    assert!(back.approx_eq(&original, 0.01), "{size:?} {rotation:?} {margin:?}");
                }
            }
        }
    }

    #[test]
    fn test_classify_edges() {
        let t = centered_square();
        // Touching the frame edge counts as page
        assert_eq!(t.classify(&Rect::new(80.0, 80.0, 10.0, 10.0)), Region::Page);
        assert_eq!(t.classify(&Rect::new(80.0, 80.0, 9.0, 9.0)), Region::Margin);
        // Straddling strokes are page
        assert_eq!(t.classify(&Rect::new(0.0, 100.0, 280.0, 2.0)), Region::Page);
        assert_eq!(t.classify_stroke(&stroke(&[])), Region::Margin);
    }

    #[test]
    fn test_stroke_width_counts_for_classification() {
        let t = centered_square();
        let dot_of_width = |width: f32| {
            Stroke::new(vec![Point::new(87.0, 100.0)], StrokeStyle { width, ..StrokeStyle::pen() })
        };
        let thin = dot_of_width(2.0);
        let thick = dot_of_width(8.0);
        assert_eq!(t.classify_stroke(&thin), Region::Margin);
        assert_eq!(t.classify_stroke(&thick), Region::Page);
    }

    #[test]
    fn test_view_mapping() {
        let t = centered_square().with_zoom_and_pan(2.0, Point::new(-30.0, 10.0)).unwrap();
        let view = t.surface_to_view(Point::new(100.0, 50.0));
        assert_eq!(view, Point::new(170.0, 110.0));
        let back = t.view_to_surface(view);
        assert!((back.x - 100.0).abs() < EPS && (back.y - 50.0).abs() < EPS);

        assert!(matches!(
            t.with_zoom_and_pan(0.0, Point::default()),
            Err(EngineError::InvalidZoom(_))
        ));
        assert!(t.with_zoom_and_pan(f32::NAN, Point::default()).is_err());
    }

    #[test]
    fn test_degenerate_frame_rejected() {
        let frame =
            resolve(Size::new(0.0, 100.0), Rotation::Deg0, &MarginSettings::disabled(), 2.8);
        assert!(matches!(CoordinateTransformer::new(frame), Err(EngineError::DegenerateFrame)));
    }
}
