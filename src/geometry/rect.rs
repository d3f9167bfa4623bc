//! Rectangles in document space.
//!
//! Rectangles are stored as two corners in PDF points. All predicates accept
//! denormalized input, but the algorithms in this crate assume normalized
//! rectangles (`x1 <= x2` and `y1 <= y2`) unless noted otherwise.

use std::cmp::Ordering;

/// Tolerance on containment checks, in PDF points.
///
/// Character rectangles reported by backends wobble by fractions of a point;
/// strict comparisons would spuriously reject containment.
pub const TOLERANCE: f64 = 0.001;

/// A rectangle in document coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x1: f64,
    /// Top edge
    pub y1: f64,
    /// Right edge
    pub x2: f64,
    /// Bottom edge
    pub y2: f64,
}

/// Minimal size bounds for a rectangle: both dimensions must exceed `both`,
/// and at least one must exceed `each`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeBound {
    /// Lower bound on both dimensions
    pub both: f64,
    /// Lower bound on at least one dimension
    pub each: f64,
}

impl SizeBound {
    /// The zero bound: only degenerate rectangles are rejected.
    pub const ZERO: SizeBound = SizeBound { both: 0.0, each: 0.0 };

    /// Create a new bound.
    pub fn new(both: f64, each: f64) -> Self {
        Self { both, each }
    }
}

impl Rect {
    /// Create a rectangle from its corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockview::geometry::Rect;
    ///
    /// let r = Rect::new(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(r.width(), 100.0);
    /// assert_eq!(r.height(), 50.0);
    /// ```
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// A rectangle with top-left corner at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Swap corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalize(&mut self) {
        if self.x1 > self.x2 {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether the rectangle covers no area. True for denormalized input.
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Whether the rectangle satisfies the size bound: both dimensions above
    /// `both` and at least one above `each`.
    pub fn satisfies(&self, bound: &SizeBound) -> bool {
        self.width() > bound.both
            && self.height() > bound.both
            && (self.width() > bound.each || self.height() > bound.each)
    }

    /// Equal horizontal extent (exact).
    pub fn h_equal(&self, other: &Rect) -> bool {
        self.x1 == other.x1 && self.x2 == other.x2
    }

    /// Equal vertical extent (exact).
    pub fn v_equal(&self, other: &Rect) -> bool {
        self.y1 == other.y1 && self.y2 == other.y2
    }

    /// The horizontal extent of `other` lies within this rectangle's, up to
    /// [`TOLERANCE`].
    pub fn h_contains(&self, other: &Rect) -> bool {
        self.x1 <= other.x1 + TOLERANCE && other.x2 - TOLERANCE <= self.x2
    }

    /// The vertical extent of `other` lies within this rectangle's, up to
    /// [`TOLERANCE`].
    pub fn v_contains(&self, other: &Rect) -> bool {
        self.y1 <= other.y1 + TOLERANCE && other.y2 - TOLERANCE <= self.y2
    }

    /// Whether this rectangle contains `other` on both axes.
    pub fn contains(&self, other: &Rect) -> bool {
        self.h_contains(other) && self.v_contains(other)
    }

    /// Strict horizontal overlap: a shared edge does not count.
    pub fn h_overlaps(&self, other: &Rect) -> bool {
        !(self.x2 <= other.x1 || self.x1 >= other.x2)
    }

    /// Strict vertical overlap: a shared edge does not count.
    pub fn v_overlaps(&self, other: &Rect) -> bool {
        !(self.y2 <= other.y1 || self.y1 >= other.y2)
    }

    /// Strict overlap on both axes.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.h_overlaps(other) && self.v_overlaps(other)
    }

    /// Non-strict horizontal proximity: meeting at an edge counts.
    pub fn h_touches(&self, other: &Rect) -> bool {
        !(self.x2 < other.x1 || self.x1 > other.x2)
    }

    /// Non-strict vertical proximity: meeting at an edge counts.
    pub fn v_touches(&self, other: &Rect) -> bool {
        !(self.y2 < other.y1 || self.y1 > other.y2)
    }

    /// Whether the rectangles touch (meet or overlap).
    pub fn touches(&self, other: &Rect) -> bool {
        self.h_touches(other) && self.v_touches(other)
    }

    /// Horizontal gap between the rectangles, zero if they touch.
    pub fn h_distance(&self, other: &Rect) -> f64 {
        (other.x1 - self.x2).max(0.0).max((self.x1 - other.x2).max(0.0))
    }

    /// Vertical gap between the rectangles, zero if they touch.
    pub fn v_distance(&self, other: &Rect) -> f64 {
        (other.y1 - self.y2).max(0.0).max((self.y1 - other.y2).max(0.0))
    }

    /// Move the rectangle by the given amounts.
    pub fn shift(&mut self, dx: f64, dy: f64) {
        self.x1 += dx;
        self.y1 += dy;
        self.x2 += dx;
        self.y2 += dy;
    }

    /// Grow the rectangle outward on each side.
    pub fn expand(&mut self, dx: f64, dy: f64) {
        self.x1 -= dx;
        self.y1 -= dy;
        self.x2 += dx;
        self.y2 += dy;
    }

    /// Intersection of two rectangles.
    ///
    /// The result may be empty or denormalized when the rectangles do not
    /// overlap; callers must test with [`Rect::is_empty`].
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        )
    }

    /// Smallest rectangle containing both.
    pub fn join(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    /// Compare by left edge.
    pub fn h_cmp(&self, other: &Rect) -> Ordering {
        self.x1.partial_cmp(&other.x1).unwrap_or(Ordering::Equal)
    }

    /// Compare by top edge.
    pub fn v_cmp(&self, other: &Rect) -> Ordering {
        self.y1.partial_cmp(&other.y1).unwrap_or(Ordering::Equal)
    }

    /// Reading-position comparator: rectangles that horizontally touch are
    /// ordered top to bottom, the others left to right.
    ///
    /// This relation is not transitively consistent; see
    /// [`crate::geometry::order`] for how the sorts cope with that.
    pub fn pos_cmp(&self, other: &Rect) -> Ordering {
        if self.h_touches(other) {
            self.v_cmp(other)
        } else {
            self.h_cmp(other)
        }
    }

    /// Compare by area.
    pub fn area_cmp(&self, other: &Rect) -> Ordering {
        self.area()
            .partial_cmp(&other.area())
            .unwrap_or(Ordering::Equal)
    }

    /// Parse a rectangle from the `[x1,y1-x2,y2]` notation.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockview::geometry::Rect;
    ///
    /// let r = Rect::parse("[10,20-110,70]").unwrap();
    /// assert_eq!(r, Rect::new(10.0, 20.0, 110.0, 70.0));
    /// ```
    pub fn parse(s: &str) -> Option<Rect> {
        let body = s.trim().strip_prefix('[')?.strip_suffix(']')?;
        let (first, second) = body.split_once('-')?;
        let (x1, y1) = first.split_once(',')?;
        let (x2, y2) = second.split_once(',')?;
        Some(Rect::new(
            x1.trim().parse().ok()?,
            y1.trim().parse().ok()?,
            x2.trim().parse().ok()?,
            y2.trim().parse().ok()?,
        ))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}-{},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Well-known paper sizes in PDF points.
const PAPER_SIZES: &[(&str, f64, f64)] = &[
    ("Letter", 612.0, 792.0),
    ("LetterSmall", 612.0, 792.0),
    ("Tabloid", 792.0, 1224.0),
    ("Ledger", 1224.0, 792.0),
    ("Legal", 612.0, 1008.0),
    ("Statement", 396.0, 612.0),
    ("Executive", 540.0, 720.0),
    ("Folio", 612.0, 936.0),
    ("Quarto", 610.0, 780.0),
    ("10x14", 720.0, 1008.0),
    ("A0", 2384.0, 3371.0),
    ("A1", 1685.0, 2384.0),
    ("A2", 1190.0, 1684.0),
    ("A3", 842.0, 1190.0),
    ("A4", 595.0, 842.0),
    ("A5", 420.0, 595.0),
    ("A6", 298.0, 420.0),
    ("A7", 210.0, 298.0),
    ("A8", 148.0, 210.0),
    ("A9", 105.0, 147.0),
    ("A10", 74.0, 105.0),
    ("B0", 2835.0, 4008.0),
    ("B1", 2004.0, 2835.0),
    ("B2", 1417.0, 2004.0),
    ("B3", 1001.0, 1417.0),
    ("B4", 729.0, 1032.0),
    ("B5", 516.0, 729.0),
    ("B6", 354.0, 499.0),
    ("B7", 249.0, 354.0),
    ("B8", 176.0, 249.0),
    ("B9", 125.0, 176.0),
    ("B10", 88.0, 125.0),
];

/// Look up a named paper size (case-insensitive).
pub fn paper_size(name: &str) -> Option<Rect> {
    PAPER_SIZES
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, w, h)| Rect::from_size(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        let mut r = Rect::new(10.0, 30.0, 5.0, 20.0);
        r.normalize();
        assert_eq!(r, Rect::new(5.0, 20.0, 10.0, 30.0));
    }

    #[test]
    fn test_contains_tolerance() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        // Sticks out by less than the tolerance
        let inner = Rect::new(-0.0005, 0.0, 100.0005, 100.0);
        assert!(outer.contains(&inner));
        let outside = Rect::new(-0.1, 0.0, 100.0, 100.0);
        assert!(!outer.contains(&outside));
    }

    #[test]
    fn test_shared_edge_touches_but_does_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.touches(&b));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_distance() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(15.0, 30.0, 20.0, 40.0);
        assert_eq!(a.h_distance(&b), 5.0);
        assert_eq!(a.v_distance(&b), 20.0);
        assert_eq!(b.h_distance(&a), 5.0);
        let c = Rect::new(5.0, 5.0, 8.0, 8.0);
        assert_eq!(a.h_distance(&c), 0.0);
    }

    #[test]
    fn test_intersection_and_join() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 20.0, 20.0);
        assert_eq!(a.intersection(&b), Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(a.join(&b), Rect::new(0.0, 0.0, 20.0, 20.0));
        let c = Rect::new(50.0, 50.0, 60.0, 60.0);
        assert!(a.intersection(&c).is_empty());
    }

    #[test]
    fn test_satisfies_bound() {
        let r = Rect::new(0.0, 0.0, 12.0, 120.0);
        assert!(r.satisfies(&SizeBound::new(10.0, 100.0)));
        assert!(!r.satisfies(&SizeBound::new(15.0, 100.0)));
        assert!(!r.satisfies(&SizeBound::new(10.0, 150.0)));
        assert!(r.satisfies(&SizeBound::ZERO));
    }

    #[test]
    fn test_pos_cmp_columns() {
        // Two blocks in the same column are ordered vertically, blocks in
        // different columns by their left edge.
        let top = Rect::new(50.0, 100.0, 290.0, 200.0);
        let bottom = Rect::new(50.0, 300.0, 290.0, 400.0);
        let right = Rect::new(320.0, 100.0, 560.0, 400.0);
        assert_eq!(top.pos_cmp(&bottom), Ordering::Less);
        assert_eq!(top.pos_cmp(&right), Ordering::Less);
        assert_eq!(right.pos_cmp(&bottom), Ordering::Greater);
    }

    #[test]
    fn test_parse_roundtrip() {
        let r = Rect::new(1.5, 2.0, 3.25, 4.0);
        assert_eq!(Rect::parse(&r.to_string()), Some(r));
        assert_eq!(Rect::parse("nonsense"), None);
        assert_eq!(Rect::parse("[1,2-3]"), None);
    }

    #[test]
    fn test_paper_size() {
        assert_eq!(paper_size("a4"), Some(Rect::from_size(595.0, 842.0)));
        assert_eq!(paper_size("Letter"), Some(Rect::from_size(612.0, 792.0)));
        assert_eq!(paper_size("nope"), None);
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (0.0..600.0f64, 0.0..800.0f64, 0.1..300.0f64, 0.1..300.0f64)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
    }

    proptest! {
        #[test]
        fn prop_touch_and_overlap_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(a.touches(&b), b.touches(&a));
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_overlap_implies_touch(a in rect_strategy(), b in rect_strategy()) {
            if a.overlaps(&b) {
                prop_assert!(a.touches(&b));
            }
        }

        #[test]
        fn prop_contain_reflexive_transitive(
            a in rect_strategy(),
            b in rect_strategy(),
            c in rect_strategy(),
        ) {
            prop_assert!(a.contains(&a));
            if a.contains(&b) && b.contains(&c) {
                // Transitive up to the containment tolerance stacking once
                let mut slack = c;
                slack.expand(-2.0 * TOLERANCE, -2.0 * TOLERANCE);
                if !slack.is_empty() {
                    prop_assert!(a.contains(&slack));
                }
            }
        }

        #[test]
        fn prop_contain_implies_overlap(a in rect_strategy(), b in rect_strategy()) {
            if a.contains(&b) && b.area() > 0.0 {
                prop_assert!(a.overlaps(&b) || b.area() == 0.0);
            }
        }

        #[test]
        fn prop_join_contains_both(a in rect_strategy(), b in rect_strategy()) {
            let j = a.join(&b);
            prop_assert!(j.contains(&a));
            prop_assert!(j.contains(&b));
        }
    }
}
