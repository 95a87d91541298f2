#![forbid(unsafe_code)]

//! Geometric primitives in canvas space.

/// A point in canvas or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Translate by a vector.
    #[inline]
    pub fn offset(&self, v: Vec2) -> Point {
        Point::new(self.x + v.dx, self.y + v.dy)
    }
}

/// A displacement between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Vector length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

impl std::ops::Sub for Point {
    type Output = Vec2;

    fn sub(self, rhs: Point) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle of the given size centered on a point.
    #[inline]
    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Top-left corner.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Size of the rectangle.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// The rectangle translated by `(dx, dy)`.
    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The rectangle moved so its top-left corner is at `p`.
    #[inline]
    pub fn at(&self, p: Point) -> Rect {
        Rect::new(p.x, p.y, self.width, self.height)
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// The rectangle grown outward by `margin` on every side.
    #[inline]
    pub fn inflated(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Padded axis-aligned overlap test.
    ///
    /// Two rectangles overlap when they are closer than `padding` on both
    /// axes. With `padding = 0.0` this degenerates to touching-counts-as-
    /// overlap, which is what the layout gap-filler wants.
    pub fn overlaps(&self, other: &Rect, padding: f64) -> bool {
        !(self.right() + padding <= other.x
            || other.right() + padding <= self.x
            || self.bottom() + padding <= other.y
            || other.bottom() + padding <= self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, Size, Vec2};

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn point_sub_gives_vec() {
        let v = Point::new(5.0, 7.0) - Point::new(2.0, 3.0);
        assert_eq!(v, Vec2::new(3.0, 4.0));
        assert_eq!(v.length(), 5.0);
    }

    #[test]
    fn rect_edges_and_center() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn rect_from_center() {
        let r = Rect::from_center(Point::new(0.0, 0.0), Size::new(100.0, 40.0));
        assert_eq!(r, Rect::new(-50.0, -20.0, 100.0, 40.0));
        assert_eq!(r.center(), Point::new(0.0, 0.0));
    }

    #[test]
    fn rect_contains_edges_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.1, 5.0)));
        assert!(!r.contains(Point::new(5.0, -0.1)));
    }

    #[test]
    fn rect_union() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(3.0, 3.0, 5.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 8.0, 8.0));
    }

    #[test]
    fn rect_union_contained() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = Rect::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(outer.union(&inner), outer);
    }

    #[test]
    fn overlap_with_padding() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // 5 units apart horizontally: overlaps at padding 10, not at 4.
        let b = Rect::new(15.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b, 10.0));
        assert!(!a.overlaps(&b, 4.0));
    }

    #[test]
    fn overlap_disjoint_on_one_axis_only() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Overlaps in x, far away in y.
        let b = Rect::new(5.0, 100.0, 10.0, 10.0);
        assert!(!a.overlaps(&b, 10.0));
    }

    #[test]
    fn overlap_touching_counts_at_zero_padding() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(4.9, 0.0, 5.0, 5.0);
        assert!(a.overlaps(&b, 0.0));
        let c = Rect::new(5.0, 0.0, 5.0, 5.0);
        assert!(!a.overlaps(&c, 0.0));
    }

    #[test]
    fn rect_translated_and_at() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.translated(10.0, 20.0), Rect::new(11.0, 22.0, 3.0, 4.0));
        assert_eq!(r.at(Point::new(0.0, 0.0)), Rect::new(0.0, 0.0, 3.0, 4.0));
    }

    #[test]
    fn rect_inflated() {
        let r = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(r.inflated(2.0), Rect::new(8.0, 8.0, 14.0, 14.0));
    }
}
