//! Bounded frequency vector of rectangles.
//!
//! The recurring-block detector accumulates short text blocks from sampled
//! pages into this vector. Entries are kept sorted by descending rank; an
//! incoming rectangle either reinforces an entry with the same vertical
//! extent (page numbers grow and shrink horizontally, so horizontal
//! containment in either direction counts as a match) or is inserted with
//! rank one, displacing the tail when the vector is full.

use crate::geometry::rect::Rect;

/// Default number of entries tracked.
pub const DEFAULT_CAPACITY: usize = 30;

/// A ranked rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEntry {
    /// Accumulated evidence for this rectangle.
    pub rank: i32,
    /// The rectangle, narrowed to the intersection of all matches.
    pub rect: Rect,
}

/// Bounded sequence of `(rank, rect)` pairs in descending-rank order.
#[derive(Debug, Clone)]
pub struct FrequencyVector {
    entries: Vec<FrequencyEntry>,
    capacity: usize,
}

impl FrequencyVector {
    /// Create an empty vector with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty vector holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, highest rank first.
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    /// Insert a rectangle with an explicit rank, before the first entry of
    /// lower or equal rank. When full, the last entry is displaced.
    pub fn insert(&mut self, rank: i32, rect: Rect) {
        let pos = self
            .entries
            .iter()
            .position(|e| rank >= e.rank)
            .unwrap_or(self.entries.len());
        if pos < self.entries.len() || self.entries.len() < self.capacity {
            self.entries.insert(pos, FrequencyEntry { rank, rect });
            self.entries.truncate(self.capacity);
        }
    }

    /// Add a rectangle, reinforcing matching entries.
    ///
    /// An entry matches when its vertical extent equals the rectangle's and
    /// one horizontally contains the other. Each match gains rank 4 if the
    /// rectangles are identical, 1 otherwise; its rectangle is narrowed to
    /// the intersection and it bubbles forward past lower-ranked entries.
    /// With no match at all, the rectangle is inserted with rank one.
    pub fn add(&mut self, rect: Rect) {
        let mut matched = false;
        let mut i = 0;
        while i < self.entries.len() {
            let e = self.entries[i];
            if e.rect.v_equal(&rect)
                && (e.rect.h_contains(&rect) || rect.h_contains(&e.rect))
            {
                let gain = if e.rect == rect { 4 } else { 1 };
                let rank = e.rank + gain;
                let narrowed = e.rect.intersection(&rect);
                // bubble forward past lower-ranked neighbours
                let mut j = i;
                while j > 0 && rank > self.entries[j - 1].rank {
                    j -= 1;
                }
                self.entries.remove(i);
                self.entries.insert(
                    j,
                    FrequencyEntry {
                        rank,
                        rect: narrowed,
                    },
                );
                matched = true;
            }
            i += 1;
        }
        if !matched {
            self.insert(1, rect);
        }
    }

    /// Drop every entry whose rank does not exceed `cutoff`.
    ///
    /// Entries are rank-sorted, so this truncates at the first one at or
    /// below the cutoff.
    pub fn retain_above(&mut self, cutoff: i32) {
        let keep = self
            .entries
            .iter()
            .position(|e| e.rank <= cutoff)
            .unwrap_or(self.entries.len());
        self.entries.truncate(keep);
    }

    /// The rectangles, highest rank first.
    pub fn to_rects(&self) -> Vec<Rect> {
        self.entries.iter().map(|e| e.rect).collect()
    }
}

impl Default for FrequencyVector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_ordering() {
        let mut v = FrequencyVector::with_capacity(3);
        v.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0));
        v.insert(5, Rect::new(0.0, 0.0, 2.0, 2.0));
        v.insert(3, Rect::new(0.0, 0.0, 3.0, 3.0));
        let ranks: Vec<i32> = v.entries().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![5, 3, 1]);
    }

    #[test]
    fn test_insert_full_displaces_tail() {
        let mut v = FrequencyVector::with_capacity(2);
        v.insert(1, Rect::new(0.0, 0.0, 1.0, 1.0));
        v.insert(2, Rect::new(0.0, 0.0, 2.0, 2.0));
        v.insert(3, Rect::new(0.0, 0.0, 3.0, 3.0));
        let ranks: Vec<i32> = v.entries().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![3, 2]);
        // A rank below the whole (full) vector is dropped.
        v.insert(1, Rect::new(9.0, 9.0, 10.0, 10.0));
        assert_eq!(v.len(), 2);
        assert_eq!(v.entries()[1].rank, 2);
    }

    #[test]
    fn test_add_identical_gains_four() {
        let mut v = FrequencyVector::new();
        let r = Rect::new(296.0, 760.0, 316.0, 772.0);
        v.add(r);
        v.add(r);
        assert_eq!(v.len(), 1);
        assert_eq!(v.entries()[0].rank, 5);
        assert_eq!(v.entries()[0].rect, r);
    }

    #[test]
    fn test_add_contained_narrows() {
        let mut v = FrequencyVector::new();
        // Page number grows from one digit to three: same vertical extent,
        // horizontal containment, the entry keeps the narrowest extent.
        let narrow = Rect::new(300.0, 760.0, 312.0, 772.0);
        let wide = Rect::new(290.0, 760.0, 322.0, 772.0);
        v.add(wide);
        v.add(narrow);
        assert_eq!(v.len(), 1);
        assert_eq!(v.entries()[0].rank, 2);
        assert_eq!(v.entries()[0].rect, narrow);
    }

    #[test]
    fn test_add_different_heights_do_not_match() {
        let mut v = FrequencyVector::new();
        v.add(Rect::new(0.0, 0.0, 100.0, 12.0));
        v.add(Rect::new(0.0, 20.0, 100.0, 32.0));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_add_bubbles_forward() {
        let mut v = FrequencyVector::new();
        let a = Rect::new(0.0, 0.0, 100.0, 12.0);
        let b = Rect::new(0.0, 700.0, 100.0, 712.0);
        v.add(a); // rank 1
        v.add(b); // rank 1, after a
        v.add(b); // rank 5, must move before a
        assert_eq!(v.entries()[0].rect, b);
        assert_eq!(v.entries()[0].rank, 5);
    }

    #[test]
    fn test_retain_above() {
        let mut v = FrequencyVector::new();
        v.insert(10, Rect::new(0.0, 0.0, 1.0, 1.0));
        v.insert(5, Rect::new(0.0, 0.0, 2.0, 2.0));
        v.insert(2, Rect::new(0.0, 0.0, 3.0, 3.0));
        v.retain_above(5);
        assert_eq!(v.len(), 1);
        assert_eq!(v.entries()[0].rank, 10);
    }
}
