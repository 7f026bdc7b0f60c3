//! Page and viewport geometry
//!
//! Strokes live in page-local coordinates (PDF points, origin at the top-left
//! corner of the page as displayed). Pointer input arrives in viewport-local
//! pixels and is mapped to page space by the display surface.

use std::fmt;
use std::ops::{Add, Sub};

/// Position on a page, in points
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

impl PagePoint {
    /// Create a new page point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &PagePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Offset between two page points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageVector {
    pub dx: f32,
    pub dy: f32,
}

impl PageVector {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Sub for PagePoint {
    type Output = PageVector;

    fn sub(self, rhs: PagePoint) -> PageVector {
        PageVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<PageVector> for PagePoint {
    type Output = PagePoint;

    fn add(self, rhs: PageVector) -> PagePoint {
        PagePoint::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

/// Viewport-local pointer position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewportPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Size of the drawing viewport in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl Default for PageSize {
    /// US Letter, the fallback when a page has no usable media box
    fn default() -> Self {
        Self { width_pt: 612.0, height_pt: 792.0 }
    }
}

/// Axis-aligned bounding region in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Zero-sized bounds at a single point
    pub fn from_point(point: PagePoint) -> Self {
        Self { min_x: point.x, min_y: point.y, max_x: point.x, max_y: point.y }
    }

    /// Smallest bounds containing every point, `None` for an empty slice
    pub fn from_points(points: &[PagePoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for point in rest {
            bounds.include(*point);
        }
        Some(bounds)
    }

    /// Grow to include a point
    pub fn include(&mut self, point: PagePoint) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Expand on every side by `margin`
    pub fn inflate(&self, margin: f32) -> Bounds {
        Bounds {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn translate(&self, delta: PageVector) -> Bounds {
        Bounds {
            min_x: self.min_x + delta.dx,
            min_y: self.min_y + delta.dy,
            max_x: self.max_x + delta.dx,
            max_y: self.max_y + delta.dy,
        }
    }

    pub fn contains(&self, point: PagePoint) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Distance from `point` to the segment `start..end`
pub(crate) fn distance_to_segment(point: &PagePoint, start: &PagePoint, end: &PagePoint) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-6 {
        // Degenerate segment
        return point.distance_to(start);
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq).clamp(0.0, 1.0);
    let closest = PagePoint::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(&closest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = PagePoint::new(0.0, 0.0);
        let p2 = PagePoint::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_point_arithmetic() {
        let delta = PagePoint::new(7.0, 2.0) - PagePoint::new(4.0, 6.0);
        assert_eq!(delta, PageVector::new(3.0, -4.0));
        assert_eq!(PagePoint::new(1.0, 1.0) + delta, PagePoint::new(4.0, -3.0));
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points(&[
            PagePoint::new(10.0, 80.0),
            PagePoint::new(50.0, 20.0),
            PagePoint::new(30.0, 40.0),
        ])
        .expect("non-empty slice has bounds");

        assert_eq!(bounds, Bounds { min_x: 10.0, min_y: 20.0, max_x: 50.0, max_y: 80.0 });
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_inflate_and_translate() {
        let bounds = Bounds::from_point(PagePoint::new(5.0, 5.0)).inflate(2.0);
        assert!(bounds.contains(PagePoint::new(3.0, 7.0)));
        assert!(!bounds.contains(PagePoint::new(2.0, 5.0)));

        let moved = bounds.translate(PageVector::new(10.0, 0.0));
        assert_eq!(moved.min_x, 13.0);
        assert_eq!(moved.width(), 4.0);
    }

    #[test]
    fn test_distance_to_segment() {
        let start = PagePoint::new(0.0, 0.0);
        let end = PagePoint::new(10.0, 0.0);

        assert!((distance_to_segment(&PagePoint::new(5.0, 3.0), &start, &end) - 3.0).abs() < 0.001);
        // Beyond the end the distance is measured to the endpoint
        assert!((distance_to_segment(&PagePoint::new(13.0, 4.0), &start, &end) - 5.0).abs() < 0.001);
        // Degenerate segment
        assert!((distance_to_segment(&PagePoint::new(3.0, 4.0), &start, &start) - 5.0).abs() < 0.001);
    }
}
