//! Freehand ink stroke data model
//!
//! A stroke is a polyline in page coordinates with a color and a width.
//! Its shape only grows (points are appended while drawing, never removed);
//! color, width and position stay editable after the pointer is released.

use crate::geometry::{distance_to_segment, Bounds, PagePoint, PageVector};

/// Unique identifier for a stroke
///
/// Stable for the whole session, used for hit-testing, selection and deletion.
pub type StrokeId = uuid::Uuid;

/// Smallest stroke width a stroke can have
pub const MIN_WIDTH: f32 = 0.5;

/// Largest stroke width a stroke can have
pub const MAX_WIDTH: f32 = 64.0;

/// Width of new strokes unless configured otherwise
pub const DEFAULT_WIDTH: f32 = 2.0;

/// Width change applied by a single increase/decrease action
pub const DEFAULT_WIDTH_STEP: f32 = 1.0;

/// Minimum distance (page units) at which a point still hits a stroke
pub const HIT_TOLERANCE: f32 = 4.0;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Presentation attributes of a stroke
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width: clamp_width(width) }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { color: Color::BLACK, width: DEFAULT_WIDTH }
    }
}

/// Clamp a requested width into `[MIN_WIDTH, MAX_WIDTH]`
///
/// Non-finite input maps to `MIN_WIDTH`.
pub fn clamp_width(width: f32) -> f32 {
    if width.is_finite() {
        width.clamp(MIN_WIDTH, MAX_WIDTH)
    } else {
        MIN_WIDTH
    }
}

/// A single freehand ink path
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<PagePoint>,
    color: Color,
    width: f32,
    bounds: Bounds,
}

impl Stroke {
    /// Start a new stroke anchored at `origin`
    pub fn new(origin: PagePoint, style: StrokeStyle) -> Self {
        Self::with_id(StrokeId::new_v4(), origin, style)
    }

    /// Start a stroke with a specific ID
    pub fn with_id(id: StrokeId, origin: PagePoint, style: StrokeStyle) -> Self {
        Self {
            id,
            points: vec![origin],
            color: style.color,
            width: clamp_width(style.width),
            bounds: Bounds::from_point(origin),
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Points in drawing order; never empty
    pub fn points(&self) -> &[PagePoint] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        StrokeStyle { color: self.color, width: self.width }
    }

    /// Bounding box of the path itself
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Region covered on screen, including half the pen width
    pub fn render_bounds(&self) -> Bounds {
        self.bounds.inflate(self.width / 2.0)
    }

    /// Extend the path to `point`
    ///
    /// Returns the region the display surface has to repaint.
    pub fn append_point(&mut self, point: PagePoint) -> Bounds {
        let previous = self.points.last().copied().unwrap_or(point);
        self.points.push(point);
        self.bounds.include(point);

        let mut dirty = Bounds::from_point(previous);
        dirty.include(point);
        dirty.inflate(self.width / 2.0)
    }

    /// Check whether `point` lies on or near the path
    pub fn hit_test(&self, point: PagePoint) -> bool {
        let tolerance = self.hit_tolerance();
        if !self.bounds.inflate(tolerance).contains(point) {
            return false;
        }

        match self.points.as_slice() {
            [single] => single.distance_to(&point) <= tolerance,
            points => points
                .windows(2)
                .any(|segment| distance_to_segment(&point, &segment[0], &segment[1]) <= tolerance),
        }
    }

    /// Move the whole path by `delta`
    pub fn translate(&mut self, delta: PageVector) {
        if delta.is_zero() {
            return;
        }
        for point in &mut self.points {
            *point = *point + delta;
        }
        self.bounds = self.bounds.translate(delta);
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Set the width, clamped to `[MIN_WIDTH, MAX_WIDTH]`
    pub fn set_width(&mut self, width: f32) {
        self.width = clamp_width(width);
    }

    /// Change the width by a signed step and return the clamped result
    pub fn adjust_width(&mut self, delta: f32) -> f32 {
        self.set_width(self.width + delta);
        self.width
    }

    fn hit_tolerance(&self) -> f32 {
        HIT_TOLERANCE.max(self.width / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke_through(points: &[(f32, f32)]) -> Stroke {
        let (first, rest) = points.split_first().expect("at least one point");
        let mut stroke = Stroke::new(PagePoint::new(first.0, first.1), StrokeStyle::default());
        for (x, y) in rest {
            stroke.append_point(PagePoint::new(*x, *y));
        }
        stroke
    }

    #[test]
    fn test_new_stroke_has_origin_point() {
        let stroke = Stroke::new(PagePoint::new(10.0, 20.0), StrokeStyle::default());

        assert_eq!(stroke.points(), &[PagePoint::new(10.0, 20.0)]);
        assert_eq!(stroke.color(), Color::BLACK);
        assert_eq!(stroke.width(), DEFAULT_WIDTH);
        assert_eq!(stroke.bounds(), Bounds::from_point(PagePoint::new(10.0, 20.0)));
    }

    #[test]
    fn test_append_grows_points_and_bounds() {
        let mut stroke = stroke_through(&[(0.0, 0.0)]);
        let dirty = stroke.append_point(PagePoint::new(30.0, -10.0));

        assert_eq!(stroke.points().len(), 2);
        assert_eq!(stroke.bounds(), Bounds { min_x: 0.0, min_y: -10.0, max_x: 30.0, max_y: 0.0 });
        // Dirty region covers the new segment plus half the pen width
        assert_eq!(dirty, Bounds { min_x: -1.0, min_y: -11.0, max_x: 31.0, max_y: 1.0 });
    }

    #[test]
    fn test_freshly_appended_point_is_hit() {
        let mut stroke = stroke_through(&[(0.0, 0.0), (10.0, 10.0)]);
        for point in [PagePoint::new(250.0, 3.0), PagePoint::new(-40.0, 90.0)] {
            stroke.append_point(point);
            assert!(stroke.hit_test(point));
        }
    }

    #[test]
    fn test_hit_test_uses_segments() {
        let stroke = stroke_through(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);

        assert!(stroke.hit_test(PagePoint::new(50.0, 2.0)));
        assert!(stroke.hit_test(PagePoint::new(103.0, 60.0)));
        // Inside the bounding box but far from the path
        assert!(!stroke.hit_test(PagePoint::new(40.0, 60.0)));
        assert!(!stroke.hit_test(PagePoint::new(500.0, 500.0)));
    }

    #[test]
    fn test_single_point_stroke_hit_test() {
        let stroke = stroke_through(&[(20.0, 20.0)]);
        assert!(stroke.hit_test(PagePoint::new(22.0, 21.0)));
        assert!(!stroke.hit_test(PagePoint::new(30.0, 20.0)));
    }

    #[test]
    fn test_wide_strokes_widen_hit_area() {
        let mut stroke = stroke_through(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(!stroke.hit_test(PagePoint::new(50.0, 10.0)));

        stroke.set_width(24.0);
        assert!(stroke.hit_test(PagePoint::new(50.0, 10.0)));
    }

    #[test]
    fn test_translate_moves_points_and_bounds() {
        let mut stroke = stroke_through(&[(0.0, 0.0), (10.0, 5.0)]);
        stroke.translate(PageVector::new(3.0, -2.0));

        assert_eq!(stroke.points(), &[PagePoint::new(3.0, -2.0), PagePoint::new(13.0, 3.0)]);
        assert_eq!(stroke.bounds(), Bounds { min_x: 3.0, min_y: -2.0, max_x: 13.0, max_y: 3.0 });
        assert!(stroke.hit_test(PagePoint::new(13.0, 3.0)));
        assert!(!stroke.hit_test(PagePoint::new(-5.0, -5.0)));
    }

    #[test]
    fn test_width_is_clamped() {
        let mut stroke = stroke_through(&[(0.0, 0.0)]);

        stroke.set_width(-3.0);
        assert_eq!(stroke.width(), MIN_WIDTH);

        stroke.set_width(f32::NAN);
        assert_eq!(stroke.width(), MIN_WIDTH);

        stroke.set_width(1000.0);
        assert_eq!(stroke.width(), MAX_WIDTH);

        stroke.set_width(2.0);
        assert_eq!(stroke.adjust_width(-1.0), 1.0);
        assert_eq!(stroke.adjust_width(-1.0), MIN_WIDTH);
        assert_eq!(stroke.adjust_width(-1.0), MIN_WIDTH);
        assert_eq!(stroke.adjust_width(0.25), 0.75);
    }

    #[test]
    fn test_style_constructor_clamps_width() {
        let style = StrokeStyle::new(Color::RED, 0.0);
        assert_eq!(style.width, MIN_WIDTH);
        assert_eq!(Stroke::new(PagePoint::default(), style).color(), Color::RED);
    }

    #[test]
    fn test_color_serde_shape() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).expect("serialize color");
        assert_eq!(json, r#"{"r":1,"g":2,"b":3,"a":255}"#);
    }
}
