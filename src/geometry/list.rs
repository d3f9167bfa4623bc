//! Rectangle lists with set-union semantics.
//!
//! A [`RectUnion`] represents the area covered by the union of its
//! rectangles. Insertion deduplicates: a rectangle contained in an existing
//! one is dropped, and a rectangle that contains existing ones replaces
//! them. The list may still be redundant (a rectangle covered by the union
//! of two others is kept); the algorithms tolerate that.
//!
//! Ordered block sequences are plain `Vec<Rect>`, produced from a union by
//! the sorts in [`crate::geometry::order`].

use crate::error::{Error, Result};
use crate::geometry::rect::{Rect, SizeBound};

/// Default cap on the number of rectangles in a union.
///
/// The subtraction step of the text-area engine can blow up on pathological
/// pages; when the cap is hit the engine falls back to a whole-page list.
pub const MAX_RECTS: usize = 4096;

/// An area as a union of rectangles.
#[derive(Debug, Clone)]
pub struct RectUnion {
    rects: Vec<Rect>,
    limit: usize,
}

impl Default for RectUnion {
    fn default() -> Self {
        Self::new()
    }
}

impl RectUnion {
    /// Create an empty union with the default entry cap.
    pub fn new() -> Self {
        Self::with_limit(MAX_RECTS)
    }

    /// Create an empty union with a caller-chosen entry cap.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            rects: Vec::new(),
            limit,
        }
    }

    /// A union holding a single rectangle.
    pub fn single(rect: Rect) -> Self {
        Self {
            rects: vec![rect],
            limit: MAX_RECTS,
        }
    }

    /// Build a union from rectangles without deduplication.
    pub fn from_rects(rects: Vec<Rect>) -> Self {
        Self {
            rects,
            limit: MAX_RECTS,
        }
    }

    /// Number of rectangles.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether the union is empty.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The rectangles as a slice.
    pub fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    /// Consume the union into its rectangles. The order carries no meaning;
    /// run one of the sorts in [`crate::geometry::order`] to obtain a
    /// reading order.
    pub fn into_vec(self) -> Vec<Rect> {
        self.rects
    }

    /// Iterate over the rectangles.
    pub fn iter(&self) -> std::slice::Iter<'_, Rect> {
        self.rects.iter()
    }

    /// Append without deduplication.
    pub fn push(&mut self, rect: Rect) -> Result<()> {
        if self.rects.len() >= self.limit {
            return Err(Error::RectOverflow(self.limit));
        }
        self.rects.push(rect);
        Ok(())
    }

    /// Remove the rectangle at `index`, replacing it with the last one.
    pub fn remove(&mut self, index: usize) {
        if index < self.rects.len() {
            self.rects.swap_remove(index);
        }
    }

    /// Add a rectangle, keeping the union non-redundant against single
    /// rectangles: a rectangle contained in an existing entry is dropped,
    /// and every entry contained in the new rectangle is removed.
    ///
    /// The union may still be redundant against unions of entries (a
    /// rectangle covered by two others together is kept).
    pub fn add(&mut self, rect: Rect) -> Result<()> {
        if self.rects.iter().any(|r| r.contains(&rect)) {
            return Ok(());
        }
        self.rects.retain(|r| !rect.contains(r));
        self.push(rect)
    }

    /// Smallest rectangle enclosing the whole union, `None` when empty.
    pub fn join_all(&self) -> Option<Rect> {
        let mut iter = self.rects.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| acc.join(r)))
    }

    /// Index of the first rectangle containing `rect`.
    pub fn index_containing(&self, rect: &Rect) -> Option<usize> {
        self.rects.iter().position(|r| r.contains(rect))
    }

    /// Index of the first rectangle touching `rect`.
    pub fn index_touching(&self, rect: &Rect) -> Option<usize> {
        self.rects.iter().position(|r| r.touches(rect))
    }

    /// Index of the first rectangle overlapping `rect`.
    pub fn index_overlapping(&self, rect: &Rect) -> Option<usize> {
        self.rects.iter().position(|r| r.overlaps(rect))
    }

    /// The rectangle of maximal area.
    pub fn largest(&self) -> Option<&Rect> {
        self.rects
            .iter()
            .max_by(|a, b| a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Sort the rectangles by increasing area.
    pub fn area_sort(&mut self) {
        self.rects
            .sort_by(|a, b| a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Total width of the rectangles.
    pub fn sum_width(&self) -> f64 {
        self.rects.iter().map(Rect::width).sum()
    }

    /// Total height of the rectangles.
    pub fn sum_height(&self) -> f64 {
        self.rects.iter().map(Rect::height).sum()
    }

    /// Average width, zero for an empty union.
    pub fn average_width(&self) -> f64 {
        if self.rects.is_empty() {
            0.0
        } else {
            self.sum_width() / self.rects.len() as f64
        }
    }

    /// Average height, zero for an empty union.
    pub fn average_height(&self) -> f64 {
        if self.rects.is_empty() {
            0.0
        } else {
            self.sum_height() / self.rects.len() as f64
        }
    }

    /// Merge horizontally touching projections after a left-edge sort: the
    /// horizontal extents of the union.
    pub fn h_extents(&self) -> Vec<Rect> {
        self.directional_extents(|a, b| a.h_cmp(b), |a, b| a.h_touches(b))
    }

    /// Merge vertically touching projections after a top-edge sort: the
    /// vertical extents of the union.
    pub fn v_extents(&self) -> Vec<Rect> {
        self.directional_extents(|a, b| a.v_cmp(b), |a, b| a.v_touches(b))
    }

    fn directional_extents(
        &self,
        cmp: impl Fn(&Rect, &Rect) -> std::cmp::Ordering,
        touch: impl Fn(&Rect, &Rect) -> bool,
    ) -> Vec<Rect> {
        let mut sorted = self.rects.clone();
        sorted.sort_by(|a, b| cmp(a, b));
        let mut out: Vec<Rect> = Vec::new();
        for r in sorted {
            match out.last_mut() {
                Some(last) if touch(last, &r) => *last = last.join(&r),
                _ => out.push(r),
            }
        }
        out
    }

    /// Single pass merging each rectangle into the previous one while they
    /// touch. Only effective on lists whose neighbours are already adjacent
    /// (such as character streams); used to shrink the input of the
    /// subtraction step.
    pub fn merge_consecutive(&mut self) {
        if self.rects.is_empty() {
            return;
        }
        let mut j = 0;
        for i in 1..self.rects.len() {
            if self.rects[j].touches(&self.rects[i]) {
                self.rects[j] = self.rects[j].join(&self.rects[i]);
            } else {
                j += 1;
                self.rects[j] = self.rects[i];
            }
        }
        self.rects.truncate(j + 1);
    }

    /// Join touching rectangles until a fixed point.
    ///
    /// A single pass is not enough: a join may produce a rectangle that
    /// touches entries already examined.
    pub fn join_touching(&mut self) {
        loop {
            let before = self.rects.len();
            let mut i = 0;
            while i < self.rects.len() {
                let mut j = i + 1;
                while j < self.rects.len() {
                    if self.rects[i].touches(&self.rects[j]) {
                        self.rects[i] = self.rects[i].join(&self.rects[j]);
                        self.rects.swap_remove(j);
                        j = i + 1;
                    } else {
                        j += 1;
                    }
                }
                i += 1;
            }
            if self.rects.len() == before {
                break;
            }
        }
    }

    /// Release spare capacity.
    pub fn tighten(&mut self) {
        self.rects.shrink_to_fit();
    }

    /// Subtract a single rectangle: every entry is replaced by up to four
    /// strips (left, top, right, bottom) covering its area minus `sub`.
    ///
    /// Candidates must contain `cont` (when given) and satisfy `bound` to be
    /// kept. Results accumulate through [`RectUnion::add`].
    fn subtract_rect(
        &self,
        sub: &Rect,
        cont: Option<&Rect>,
        bound: &SizeBound,
    ) -> Result<RectUnion> {
        let mut dest = RectUnion::with_limit(self.limit);
        for a in &self.rects {
            let candidates = [
                Rect::new(a.x1, a.y1, a.x2.min(sub.x1), a.y2),
                Rect::new(a.x1, a.y1, a.x2, a.y2.min(sub.y1)),
                Rect::new(a.x1.max(sub.x2), a.y1, a.x2, a.y2),
                Rect::new(a.x1, a.y1.max(sub.y2), a.x2, a.y2),
            ];
            for r in candidates {
                if !r.satisfies(bound) {
                    continue;
                }
                if let Some(c) = cont {
                    if !r.contains(c) {
                        continue;
                    }
                }
                dest.add(r)?;
            }
        }
        Ok(dest)
    }

    /// Subtract a rectangle list: `self -= other`, filtering candidates by
    /// `cont` and `bound` as in [`RectUnion::subtract_from`].
    pub fn subtract(
        &mut self,
        other: &RectUnion,
        cont: Option<&Rect>,
        bound: Option<&SizeBound>,
    ) -> Result<()> {
        let bound = bound.copied().unwrap_or(SizeBound::ZERO);
        for sub in &other.rects {
            *self = self.subtract_rect(sub, cont, &bound)?;
        }
        Ok(())
    }

    /// Subtract a rectangle list from a single rectangle: `rect - list`.
    pub fn subtract_from(
        rect: Rect,
        list: &RectUnion,
        cont: Option<&Rect>,
        bound: Option<&SizeBound>,
    ) -> Result<RectUnion> {
        let mut res = RectUnion::with_limit(list.limit);
        res.push(rect)?;
        res.subtract(list, cont, bound)?;
        Ok(res)
    }

    /// Find the first position where `rect` fits into `page` without
    /// overlapping any rectangle of the union, scanning left to right and
    /// top to bottom and jumping past obstacles by their far edges.
    pub fn place(&self, page: &Rect, rect: &Rect) -> Option<Rect> {
        let mut origin = *rect;
        origin.shift(-origin.x1, -origin.y1);

        let mut y = page.y1;
        while y + origin.y2 <= page.y2 {
            let mut min_y = page.y2;
            let mut x = page.x1;
            while x + origin.x2 <= page.x2 {
                let mut moved = origin;
                moved.shift(x, y);
                match self.index_overlapping(&moved) {
                    None => return Some(moved),
                    Some(i) => {
                        min_y = min_y.min(self.rects[i].y2);
                        x = self.rects[i].x2;
                    }
                }
            }
            y = min_y;
        }
        None
    }
}

impl<'a> IntoIterator for &'a RectUnion {
    type Item = &'a Rect;
    type IntoIter = std::slice::Iter<'a, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_drops_contained() {
        let mut u = RectUnion::new();
        u.add(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        u.add(Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        assert_eq!(u.len(), 1);
    }

    #[test]
    fn test_add_replaces_contained() {
        let mut u = RectUnion::new();
        u.add(Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        u.add(Rect::new(40.0, 40.0, 50.0, 50.0)).unwrap();
        u.add(Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert_eq!(u.len(), 1);
        assert_eq!(u.as_slice()[0], Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_overflow() {
        let mut u = RectUnion::with_limit(2);
        u.add(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        u.add(Rect::new(10.0, 0.0, 11.0, 1.0)).unwrap();
        assert!(matches!(
            u.add(Rect::new(20.0, 0.0, 21.0, 1.0)),
            Err(Error::RectOverflow(2))
        ));
    }

    #[test]
    fn test_join_all() {
        let mut u = RectUnion::new();
        assert_eq!(u.join_all(), None);
        u.add(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        u.add(Rect::new(50.0, 20.0, 60.0, 30.0)).unwrap();
        assert_eq!(u.join_all(), Some(Rect::new(0.0, 0.0, 60.0, 30.0)));
    }

    #[test]
    fn test_subtract_middle() {
        // Cutting a hole in a page leaves four strips around it.
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        let hole = RectUnion::single(Rect::new(40.0, 40.0, 60.0, 60.0));
        let res = RectUnion::subtract_from(page, &hole, None, None).unwrap();
        assert_eq!(res.len(), 4);
        let area: f64 = res
            .iter()
            .map(|r| r.area())
            .sum();
        // Strips overlap at the corners, so the sum exceeds the difference.
        assert!(area >= page.area() - 400.0);
        for r in &res {
            assert!(!r.overlaps(&Rect::new(40.0, 40.0, 60.0, 60.0)));
        }
    }

    #[test]
    fn test_subtract_respects_bound() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        // A vertical cut at x=10 leaves a thin left strip that the bound
        // rejects.
        let cut = RectUnion::single(Rect::new(10.0, -1.0, 50.0, 101.0));
        let bound = SizeBound::new(15.0, 0.0);
        let res = RectUnion::subtract_from(page, &cut, None, Some(&bound)).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res.as_slice()[0], Rect::new(50.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_merge_consecutive() {
        let mut u = RectUnion::from_rects(vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(10.0, 0.0, 20.0, 10.0),
            Rect::new(50.0, 0.0, 60.0, 10.0),
        ]);
        u.merge_consecutive();
        assert_eq!(u.len(), 2);
        assert_eq!(u.as_slice()[0], Rect::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn test_join_touching_chain() {
        // The chain reaches back: the last join produces a rectangle that
        // includes the first, so a single pass would not suffice.
        let mut u = RectUnion::from_rects(vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(40.0, 0.0, 50.0, 10.0),
            Rect::new(40.0, 10.0, 50.0, 20.0),
            Rect::new(0.0, 10.0, 45.0, 20.0),
        ]);
        u.join_touching();
        assert_eq!(u.len(), 1);
        assert_eq!(u.as_slice()[0], Rect::new(0.0, 0.0, 50.0, 20.0));
    }

    #[test]
    fn test_extents() {
        let u = RectUnion::from_rects(vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 50.0, 20.0, 60.0),
            Rect::new(100.0, 0.0, 110.0, 10.0),
        ]);
        let h = u.h_extents();
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].x1, 0.0);
        assert_eq!(h[0].x2, 20.0);
        let v = u.v_extents();
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_place() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut occupied = RectUnion::new();
        occupied.push(Rect::new(0.0, 0.0, 100.0, 40.0)).unwrap();
        occupied.push(Rect::new(0.0, 40.0, 60.0, 100.0)).unwrap();
        let spot = occupied
            .place(&page, &Rect::new(0.0, 0.0, 30.0, 30.0))
            .unwrap();
        assert!(!occupied.iter().any(|r| r.overlaps(&spot)));
        assert!(page.contains(&spot));

        let too_big = occupied.place(&page, &Rect::new(0.0, 0.0, 80.0, 80.0));
        assert!(too_big.is_none());
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (0.0..500.0f64, 0.0..500.0f64, 1.0..200.0f64, 1.0..200.0f64)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
    }

    proptest! {
        #[test]
        fn prop_add_no_strict_nesting(rects in prop::collection::vec(rect_strategy(), 1..20)) {
            let mut u = RectUnion::new();
            for r in &rects {
                u.add(*r).unwrap();
            }
            // Every input rectangle is covered by some element of the result.
            for r in &rects {
                prop_assert!(u.iter().any(|e| e.contains(r)));
            }
            // No element strictly contains another.
            for (i, a) in u.iter().enumerate() {
                for (j, b) in u.iter().enumerate() {
                    if i != j {
                        prop_assert!(!(a.contains(b) && a != b));
                    }
                }
            }
        }

        #[test]
        fn prop_subtract_plus_intersection_covers(
            a in rect_strategy(),
            b in rect_strategy(),
        ) {
            // subtract(a,b) together with intersect(a,b) covers a: sample
            // points of a and check each is in the difference or in the
            // intersection.
            let diff = RectUnion::subtract_from(a, &RectUnion::single(b), None, None).unwrap();
            let inter = a.intersection(&b);
            for i in 0..10 {
                for j in 0..10 {
                    let px = a.x1 + (a.width()) * (i as f64 + 0.5) / 10.0;
                    let py = a.y1 + (a.height()) * (j as f64 + 0.5) / 10.0;
                    let point = Rect::new(px, py, px, py);
                    let in_diff = diff.iter().any(|r| r.contains(&point));
                    let in_inter = !inter.is_empty() && inter.contains(&point);
                    prop_assert!(in_diff || in_inter);
                }
            }
        }
    }
}
