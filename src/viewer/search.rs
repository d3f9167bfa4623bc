//! Search across pages.
//!
//! The next match is the first one, in reading order, outside the
//! currently displayed portion of the current block; the first match is
//! the same but accepts matches inside it. The filter only applies to the
//! starting block; later blocks and pages take every match. When the page
//! is exhausted the scan wraps across the document, terminating after one
//! full cycle.
//!
//! With fit none the visible region may be an interior sub-rectangle of
//! the block, where "the first match outside" is not well defined; the
//! same test is applied regardless, and certain pathological layouts may
//! skip a match. Kept as in the reference.

use crate::backend::{DocumentBackend, PageBackend};
use crate::geometry::Rect;
use crate::ui::UiContext;
use crate::viewer::position::{move_to, relative_screen, top_of_block, Position};
use crate::viewer::view::{Fit, View};
use crate::viewer::{compute_area, Viewer};

/// Matches of `needle` on a page, converted to top-left origin once, here.
fn find_matches<P: PageBackend + ?Sized>(page: &P, needle: &str) -> Vec<Rect> {
    if needle.is_empty() {
        return Vec::new();
    }
    let (_, height) = page.size();
    page.find_text(needle)
        .into_iter()
        .map(|r| Rect::new(r.x1, height - r.y2, r.x2, height - r.y1))
        .collect()
}

/// Scroll so `r` sits one anchor length from the viewport's leading edge:
/// the top for a forward search, the bottom for a backward one.
fn scroll_to_rect(scan: &mut Position, view: &View, dest: &Rect, r: &Rect, top: bool) {
    let block = scan.block();
    top_of_block(scan, view, dest);
    move_to(scan, view, dest);
    let anchor = view.search_anchor;
    if view.fit != Fit::Horizontal {
        scan.scroll_x = if top {
            r.x1 - block.x1 - anchor
        } else {
            r.x2 - block.x1 + anchor
                - scan.transform.to_user_distance(dest.width(), 0.0).0
        };
    }
    if view.fit != Fit::Vertical {
        scan.scroll_y = if top {
            r.y1 - block.y1 - anchor
        } else {
            r.y2 - block.y1 + anchor
                - scan.transform.to_user_distance(0.0, dest.height()).1
        };
    }
    // recomputing the transform clamps the scroll to the bounding box
    move_to(scan, view, dest);
}

/// Find the next match on the scan's page, starting at its current block.
fn next_page_match(
    scan: &mut Position,
    view: &View,
    dest: &Rect,
    mut in_screen: bool,
    mut first: bool,
) -> bool {
    if view.found.is_empty() {
        return false;
    }
    let forward = view.forward;
    let boxes: Vec<usize> = if forward {
        (scan.box_index..scan.textarea.len()).collect()
    } else {
        (0..=scan.box_index.min(scan.textarea.len().saturating_sub(1))).rev().collect()
    };
    let matches: Vec<Rect> = if forward {
        view.found.clone()
    } else {
        view.found.iter().rev().copied().collect()
    };

    for b in boxes {
        let block = scan.textarea[b];
        for r in &matches {
            if !block.contains(r) {
                continue;
            }
            if first && !relative_screen(scan, dest, r, in_screen, forward) {
                continue;
            }
            scan.box_index = b;
            scroll_to_rect(scan, view, dest, r, forward);
            return true;
        }
        in_screen = true;
        first = false;
    }
    false
}

impl<B: DocumentBackend> Viewer<B> {
    /// Recompute the matches on the current page.
    pub(crate) fn page_match(&mut self) {
        self.view.found = find_matches(&self.page, &self.view.search);
    }

    /// Jump to the first match from the displayed region onward.
    pub(crate) fn first_match(&mut self, ui: &mut UiContext) -> Option<()> {
        self.goto_match(ui, true)
    }

    /// Jump to the next match strictly past the displayed region.
    pub(crate) fn next_match(&mut self, ui: &mut UiContext) -> Option<()> {
        self.goto_match(ui, false)
    }

    fn goto_match(&mut self, ui: &mut UiContext, in_screen: bool) -> Option<()> {
        if self.view.search.is_empty() {
            self.view.found.clear();
            return None;
        }
        move_to(&mut self.pos, &self.view, &ui.dest);

        let total = self.doc.page_count();
        let mut in_screen = in_screen;
        let mut first = true;
        let mut scan = self.pos.clone();
        let mut scan_page: Option<B::Page> = None;
        self.view.found = find_matches(&self.page, &self.view.search);

        for _ in 0..=total {
            if next_page_match(&mut scan, &self.view, &ui.dest, in_screen, first) {
                self.pos = scan;
                if let Some(page) = scan_page {
                    self.page = page;
                }
                return Some(());
            }
            in_screen = true;
            first = false;

            scan.page_index = if self.view.forward {
                (scan.page_index + 1) % total
            } else {
                (scan.page_index + total - 1) % total
            };
            let Ok(page) = self.doc.load_page(scan.page_index) else {
                continue;
            };
            self.view.found = find_matches(&page, &self.view.search);
            let empty = self.view.found.is_empty();
            scan_page = Some(page);
            if empty {
                continue;
            }
            compute_area(
                &mut scan,
                scan_page.as_ref().expect("scan page just stored"),
                &self.view,
            );
            scan.box_index = if self.view.forward {
                0
            } else {
                scan.textarea.len() - 1
            };
        }

        // full wrap with nothing found; restore the current page's matches
        self.page_match();
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::sim::{SimDocument, SimPage};
    use crate::geometry::Rect;
    use crate::signals::SignalFlags;
    use crate::ui::UiContext;
    use crate::viewer::view::{View, ViewMode};
    use crate::viewer::Viewer;

    fn body_page() -> SimPage {
        let mut page = SimPage::new(612.0, 792.0);
        for line in 0..40 {
            let y = 60.0 + line as f64 * 14.0;
            page = page.text_line(50.0, y, "ordinary body text with no needle");
        }
        page
    }

    fn hello_page() -> SimPage {
        let mut page = SimPage::new(612.0, 792.0);
        for line in 0..40 {
            let y = 60.0 + line as f64 * 14.0;
            if line == 20 {
                page = page.text_line(50.0, y, "the word hello sits on this line");
            } else {
                page = page.text_line(50.0, y, "ordinary body text with no needle");
            }
        }
        page
    }

    fn fixture(doc: SimDocument) -> (Viewer<SimDocument>, UiContext) {
        let mut view = View::new();
        view.screen_width = 640.0;
        view.screen_height = 480.0;
        view.mode = ViewMode::TextArea;
        view.distance = 9.0;
        let viewer = Viewer::open(doc, view).unwrap();
        let mut ui = UiContext::new(SignalFlags::new());
        ui.dest = Rect::new(10.0, 10.0, 630.0, 470.0);
        (viewer, ui)
    }

    #[test]
    fn test_search_wraps_forward() {
        // "hello" on pages 2 and 6, viewer on page 4.
        let pages: Vec<SimPage> = (0..10)
            .map(|n| if n == 2 || n == 6 { hello_page() } else { body_page() })
            .collect();
        let (mut viewer, mut ui) = fixture(SimDocument::new(pages));
        viewer.pos.page_index = 4;
        viewer.read_page(&mut ui);

        viewer.view.search = "hello".to_string();
        viewer.view.forward = true;
        assert!(viewer.first_match(&mut ui).is_some());
        assert_eq!(viewer.pos.page_index, 6);
        assert!(!viewer.view.found.is_empty());

        // The next match wraps past the end back to page 2.
        assert!(viewer.next_match(&mut ui).is_some());
        assert_eq!(viewer.pos.page_index, 2);
    }

    #[test]
    fn test_match_anchored_below_top() {
        let (mut viewer, mut ui) = fixture(SimDocument::new(vec![hello_page()]));
        viewer.view.search = "hello".to_string();
        assert!(viewer.first_match(&mut ui).is_some());
        let m = viewer.view.found[0];
        // The match sits the anchor distance below the viewport top (in
        // document points, before clamping).
        let (_, y) = viewer.pos.transform.to_device(m.x1, m.y1);
        let scale = viewer.pos.transform.sy;
        let expected = ui.dest.y1 + viewer.view.search_anchor * scale;
        assert!(
            (y - expected).abs() < 1.0,
            "match at {y}, expected {expected}"
        );
    }

    #[test]
    fn test_matches_visited_once_before_wrap() {
        // Three matches on a single page.
        let mut page = SimPage::new(612.0, 792.0);
        for line in 0..40 {
            let y = 60.0 + line as f64 * 14.0;
            if line == 5 || line == 20 || line == 35 {
                page = page.text_line(50.0, y, "needle on this line of the text x");
            } else {
                page = page.text_line(50.0, y, "ordinary body text without it xxx");
            }
        }
        let (mut viewer, mut ui) = fixture(SimDocument::new(vec![page]));
        // A short viewport, so only one match is ever on screen and the
        // strict next-match filter cannot skip ahead.
        ui.dest = Rect::new(10.0, 10.0, 630.0, 130.0);
        viewer.view.search = "needle".to_string();

        assert!(viewer.first_match(&mut ui).is_some());
        let first_y = viewer.pos.scroll_y;
        let mut seen = vec![first_y];
        for _ in 0..2 {
            assert!(viewer.next_match(&mut ui).is_some());
            seen.push(viewer.pos.scroll_y);
        }
        // Three distinct positions, then the wrap returns to the first.
        assert!(seen[0] < seen[1] && seen[1] < seen[2], "positions {seen:?}");
        assert!(viewer.next_match(&mut ui).is_some());
        assert!((viewer.pos.scroll_y - seen[0]).abs() < 1e-6);
    }

    #[test]
    fn test_no_match_returns_none() {
        let (mut viewer, mut ui) = fixture(SimDocument::new(vec![body_page()]));
        viewer.view.search = "absent".to_string();
        assert!(viewer.first_match(&mut ui).is_none());
        assert!(viewer.view.found.is_empty());
    }

    #[test]
    fn test_backward_search() {
        let pages: Vec<SimPage> = (0..6)
            .map(|n| if n == 1 { hello_page() } else { body_page() })
            .collect();
        let (mut viewer, mut ui) = fixture(SimDocument::new(pages));
        viewer.pos.page_index = 4;
        viewer.read_page(&mut ui);
        viewer.view.search = "hello".to_string();
        viewer.view.forward = false;
        assert!(viewer.first_match(&mut ui).is_some());
        assert_eq!(viewer.pos.page_index, 1);
    }
}
