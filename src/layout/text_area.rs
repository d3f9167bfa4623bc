//! Per-page text-area decomposition.
//!
//! The blocks of text in a page are found by carving whitespace out of the
//! page and joining what remains:
//!
//! 1. take the character rectangles, with spaces nulled to zero width
//!    (backends report space glyphs as real rectangles, and they would
//!    bridge adjacent blocks);
//! 2. join consecutive touching rectangles (shrinks the input, nothing
//!    more);
//! 3. subtract every character rectangle from a slightly enlarged page
//!    rectangle, keeping only white rectangles at least `distance` wide in
//!    both dimensions and 100 pt in one: the wide whitespace;
//! 4. subtract the white rectangles from the page rectangle: the inked
//!    area as disjoint rectangles;
//! 5. join touching rectangles until stable.
//!
//! Any overflow of the intermediate lists degrades to a one-element
//! whole-page list; a viewer that shows the full page beats one that
//! errors out.

use crate::backend::{page_rect, DocumentBackend, PageBackend};
use crate::geometry::{Rect, RectUnion, SizeBound};

/// Minimal length of the short side of a usable white rectangle.
const WHITE_EACH: f64 = 100.0;

/// Character rectangles of a page with spaces nulled to zero width.
pub fn character_rects<P: PageBackend + ?Sized>(page: &P) -> Vec<Rect> {
    page.chars()
        .iter()
        .map(|c| {
            let mut r = c.rect;
            if c.ch == ' ' {
                r.x2 = r.x1;
            }
            r
        })
        .collect()
}

/// The automatic space threshold: between 9 and 15 pt, following the
/// average character width.
pub fn auto_distance(chars: &[Rect]) -> f64 {
    let avg = if chars.is_empty() {
        0.0
    } else {
        chars.iter().map(Rect::width).sum::<f64>() / chars.len() as f64
    };
    15.0_f64.min(9.0_f64.max(1.5 * avg))
}

fn textarea_bound(
    page: Rect,
    layout: Vec<Rect>,
    white: SizeBound,
    black: SizeBound,
) -> crate::error::Result<RectUnion> {
    let mut chars = RectUnion::from_rects(layout);
    log::trace!("character rectangles: {}", chars.len());
    chars.merge_consecutive();
    log::trace!("consecutive rectangles: {}", chars.len());

    // Enlarge the page so thin white areas at the borders survive the
    // bound.
    let mut enlarged = page;
    enlarged.expand(white.both + 1.0, white.both + 1.0);
    let white_list = RectUnion::subtract_from(enlarged, &chars, None, Some(&white))?;
    log::trace!("white rectangles: {}", white_list.len());

    let mut black_list = RectUnion::subtract_from(page, &white_list, None, Some(&black))?;
    log::trace!("black rectangles: {}", black_list.len());

    black_list.join_touching();
    log::trace!("joined rectangles: {}", black_list.len());
    black_list.tighten();
    Ok(black_list)
}

/// The text area of a page: disjoint rectangles covering all its text,
/// where gaps of at least `distance` points count as block separators.
/// A negative `distance` selects the automatic threshold.
///
/// Falls back to a one-element whole-page list when the page has no text
/// or an intermediate list overflows.
pub fn text_area<P: PageBackend + ?Sized>(page: &P, distance: f64) -> RectUnion {
    let layout = character_rects(page);
    let distance = if distance < 0.0 {
        auto_distance(&layout)
    } else {
        distance
    };
    let rect = page_rect(page);
    match textarea_bound(
        rect,
        layout,
        SizeBound::new(distance, WHITE_EACH),
        SizeBound::ZERO,
    ) {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => RectUnion::single(rect),
        Err(_) => {
            log::debug!("text area overflow, falling back to whole page");
            RectUnion::single(rect)
        }
    }
}

/// Bounding box of the page text, ignoring spaces. `None` when the page
/// has no text.
pub fn bounding_box<P: PageBackend + ?Sized>(page: &P) -> Option<Rect> {
    page.chars()
        .iter()
        .filter(|c| c.ch != ' ')
        .map(|c| c.rect)
        .reduce(|acc, r| acc.join(&r))
}

/// The largest block of the page's text area. `None` when the page has no
/// text at all.
pub fn largest_block<P: PageBackend + ?Sized>(page: &P, distance: f64) -> Option<Rect> {
    if page.chars().is_empty() {
        return None;
    }
    text_area(page, distance).largest().copied()
}

/// Bounding box of the whole document. `None` when no page has text.
pub fn document_bounding_box<B: DocumentBackend>(doc: &B) -> Option<Rect> {
    document_box(doc, |page| bounding_box(page))
}

/// Union of the largest blocks of every page. `None` when no page has
/// text.
pub fn document_largest_block<B: DocumentBackend>(doc: &B, distance: f64) -> Option<Rect> {
    document_box(doc, |page| largest_block(page, distance))
}

fn document_box<B: DocumentBackend>(
    doc: &B,
    per_page: impl Fn(&B::Page) -> Option<Rect>,
) -> Option<Rect> {
    let mut total: Option<Rect> = None;
    for n in 0..doc.page_count() {
        let Ok(page) = doc.load_page(n) else {
            continue;
        };
        if let Some(b) = per_page(&page) {
            total = Some(match total {
                Some(t) => t.join(&b),
                None => b,
            });
        }
    }
    total
}

/// The rows of a page: characters sorted by top edge and merged greedily
/// while the vertical gap stays within `distance`.
pub fn rows<P: PageBackend + ?Sized>(page: &P, distance: f64) -> Vec<Rect> {
    let mut chars = character_rects(page);
    chars.sort_by(|a, b| a.v_cmp(b));
    let distance = distance.max(0.0);
    let mut rows: Vec<Rect> = Vec::new();
    for c in chars {
        match rows.last_mut() {
            Some(last) if last.v_distance(&c) <= distance => *last = last.join(&c),
            _ => rows.push(c),
        }
    }
    rows
}

/// The inter-overlap index of a decomposition: evidence that the page is
/// genuinely multi-column.
///
/// Sums, over every pair of blocks in different columns (not horizontally
/// touching), the product of their heights relative to the bounding box.
/// Near zero for a single column; around one for a clean two-column page.
pub fn inter_overlap(blocks: &[Rect], bounding_box: &Rect) -> f64 {
    let height = bounding_box.height();
    if height <= 0.0 {
        return 0.0;
    }
    let mut index = 0.0;
    for a in blocks {
        for b in blocks {
            if !a.h_touches(b) {
                index += (a.height() / height) * (b.height() / height);
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::SimPage;

    /// A 612x792 page with two 12-line columns.
    fn two_column_page() -> SimPage {
        let mut page = SimPage::new(612.0, 792.0);
        for line in 0..12 {
            let y = 100.0 + line as f64 * 14.0;
            page = page
                .text_line(50.0, y, "this is the left side column")
                .text_line(320.0, y, "and this the right side one x")
        }
        page
    }

    #[test]
    fn test_two_columns_decompose() {
        let page = two_column_page();
        let area = text_area(&page, 9.0);
        assert_eq!(area.len(), 2);
        let mut blocks = area.into_vec();
        blocks.sort_by(|a, b| a.h_cmp(b));
        assert!(blocks[0].contains(&Rect::new(50.0, 100.0, 224.0, 264.0)));
        assert!(blocks[1].x1 >= 300.0);
    }

    #[test]
    fn test_inter_overlap_two_columns() {
        let page = two_column_page();
        let area = text_area(&page, 9.0);
        let bbox = area.join_all().unwrap();
        let index = inter_overlap(area.as_slice(), &bbox);
        assert!(index > 0.8, "index {index} too low for two columns");
    }

    #[test]
    fn test_single_column_low_overlap() {
        let mut page = SimPage::new(612.0, 792.0);
        for line in 0..12 {
            page = page.text_line(50.0, 100.0 + line as f64 * 14.0, "a single column of text");
        }
        let area = text_area(&page, 9.0);
        let bbox = area.join_all().unwrap();
        assert!(inter_overlap(area.as_slice(), &bbox) < 0.8);
    }

    #[test]
    fn test_empty_page_falls_back() {
        let page = SimPage::new(612.0, 792.0);
        let area = text_area(&page, 9.0);
        assert_eq!(area.len(), 1);
        assert_eq!(area.as_slice()[0], Rect::new(0.0, 0.0, 612.0, 792.0));
        assert_eq!(bounding_box(&page), None);
    }

    #[test]
    fn test_bounding_box_ignores_spaces() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "ab")
            // A lone space far to the right must not extend the box.
            .line(500.0, 100.0, " ", 6.0, 10.0, "Sim-Regular");
        let bbox = bounding_box(&page).unwrap();
        assert_eq!(bbox, Rect::new(50.0, 100.0, 62.0, 110.0));
    }

    #[test]
    fn test_spaces_do_not_bridge_blocks() {
        // Two words joined by a wide run of spaces: the nulled spaces leave
        // the gap white, so two blocks result.
        let page = SimPage::new(612.0, 792.0)
            .line(50.0, 300.0, "left", 6.0, 120.0, "Sim-Regular")
            .line(74.0, 300.0, "      ", 6.0, 120.0, "Sim-Regular")
            .line(110.0, 300.0, "right", 6.0, 120.0, "Sim-Regular");
        let area = text_area(&page, 9.0);
        assert_eq!(area.len(), 2);
    }

    #[test]
    fn test_refinement_monotone() {
        // A smaller distance can only split blocks further.
        let page = two_column_page();
        let coarse = text_area(&page, 120.0).len();
        let medium = text_area(&page, 40.0).len();
        let fine = text_area(&page, 9.0).len();
        assert_eq!(coarse, 1);
        assert!(coarse <= medium);
        assert!(medium <= fine);
        assert_eq!(fine, 2);
    }

    #[test]
    fn test_rows() {
        let page = SimPage::new(612.0, 792.0)
            .text_line(50.0, 100.0, "first row")
            .text_line(50.0, 130.0, "second row");
        let r = rows(&page, 5.0);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].y1, 100.0);
        assert_eq!(r[1].y1, 130.0);
        // A distance spanning the gap merges them.
        assert_eq!(rows(&page, 25.0).len(), 1);
    }

    #[test]
    fn test_auto_distance_clamps() {
        let narrow = vec![Rect::new(0.0, 0.0, 2.0, 10.0)];
        assert_eq!(auto_distance(&narrow), 9.0);
        let wide = vec![Rect::new(0.0, 0.0, 30.0, 10.0)];
        assert_eq!(auto_distance(&wide), 15.0);
        let mid = vec![Rect::new(0.0, 0.0, 8.0, 10.0)];
        assert_eq!(auto_distance(&mid), 12.0);
    }

    #[test]
    fn test_document_boxes() {
        let doc = crate::backend::sim::SimDocument::new(vec![
            SimPage::new(612.0, 792.0).text_line(50.0, 100.0, "top"),
            SimPage::new(612.0, 792.0).text_line(50.0, 700.0, "bottom"),
            SimPage::new(612.0, 792.0),
        ]);
        let bbox = document_bounding_box(&doc).unwrap();
        assert_eq!(bbox.y1, 100.0);
        assert_eq!(bbox.y2, 710.0);
        assert!(document_largest_block(&doc, 9.0).is_some());
    }
}
