//! The position within the document and its viewport transform.
//!
//! The current block (`textarea[box_index]`) is enlarged to the viewbox,
//! the viewbox is mapped onto the destination rectangle according to the
//! fit mode, and the scroll shifts the result. Scrolling is clamped so no
//! space outside the bounding box is shown when the box exceeds the
//! viewport, and the box is centered when it does not: whitespace outside
//! the ink envelope never steals screen space.

use crate::geometry::{Rect, Transform};
use crate::viewer::view::{Fit, View};

/// Where the viewer is: page, block, scroll, and the derived geometry.
#[derive(Debug, Clone)]
pub struct Position {
    /// Current page.
    pub page_index: usize,
    /// Current block within [`Position::textarea`].
    pub box_index: usize,
    /// The page's blocks in reading order.
    pub textarea: Vec<Rect>,
    /// Bounding box of the page's text.
    pub boundingbox: Rect,
    /// The block enlarged to the minimal displayed size.
    pub viewbox: Rect,
    /// Horizontal shift of the document under the viewport.
    pub scroll_x: f64,
    /// Vertical shift of the document under the viewport.
    pub scroll_y: f64,
    /// Document-to-device transform, valid after [`move_to`].
    pub transform: Transform,
}

impl Position {
    /// A position at the top of the first block of the first page.
    pub fn new() -> Self {
        Self {
            page_index: 0,
            box_index: 0,
            textarea: Vec::new(),
            boundingbox: Rect::default(),
            viewbox: Rect::default(),
            scroll_x: 0.0,
            scroll_y: 0.0,
            transform: Transform::identity(),
        }
    }

    /// The current block.
    pub fn block(&self) -> Rect {
        self.textarea
            .get(self.box_index)
            .copied()
            .unwrap_or(self.boundingbox)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// Recompute the transform for the current block, fit mode and scroll.
///
/// The pixel-aspect correction scales the axis the fit does not constrain;
/// the destination rectangle is counter-scaled so the viewbox still maps
/// onto it. The scroll shift composes last, which amounts to scrolling the
/// document before mapping the viewbox to the top of the destination.
pub fn move_to(pos: &mut Position, view: &View, dest: &Rect) {
    let mut t = Transform::identity();

    let mut scaled = *dest;
    if matches!(view.fit, Fit::Horizontal | Fit::Both) {
        t.scale(1.0, view.aspect);
        scaled.y1 /= view.aspect;
        scaled.y2 /= view.aspect;
    } else {
        t.scale(1.0 / view.aspect, 1.0);
        scaled.x1 *= view.aspect;
        scaled.x2 *= view.aspect;
    }

    pos.viewbox = pos.block();
    pad_viewbox(pos, view, &t, dest);
    t.map_to(
        &scaled,
        &pos.viewbox,
        view.fit == Fit::Horizontal,
        view.fit == Fit::Vertical,
        view.fit != Fit::Both,
        true,
        true,
    );
    pos.transform = t;

    clamp_scroll(pos, dest);
    pos.transform.translate(-pos.scroll_x, -pos.scroll_y);
}

/// Enforce the minimal displayed size on the viewbox.
///
/// The minimum width is given in screen points and shrinks with the
/// drawable area, so a narrow block in a small window still zooms enough
/// to be readable. Fit none sets both axes unconditionally (the viewbox
/// may shrink below the block, giving the fixed-zoom pan mode); the other
/// fits only ever enlarge.
fn pad_viewbox(pos: &mut Position, view: &View, aspect_only: &Transform, dest: &Rect) {
    let (min_w, _) = aspect_only
        .to_user_distance(view.min_width * dest.width() / view.screen_width, 0.0);
    let (_, min_h) = aspect_only
        .to_user_distance(0.0, view.min_width * dest.height() / view.screen_height);

    let vb = &mut pos.viewbox;
    let pad_w = match view.fit {
        Fit::None => true,
        Fit::Horizontal | Fit::Both => vb.width() < min_w,
        Fit::Vertical => false,
    };
    if pad_w {
        let d = min_w - vb.width();
        vb.x1 -= d / 2.0;
        vb.x2 += d / 2.0;
    }
    let pad_h = match view.fit {
        Fit::None => true,
        Fit::Vertical | Fit::Both => vb.height() < min_h,
        Fit::Horizontal => false,
    };
    if pad_h {
        let d = min_h - vb.height();
        vb.y1 -= d / 2.0;
        vb.y2 += d / 2.0;
    }
}

/// Clamp the scroll so the screen never shows space outside the bounding
/// box, or centers the box when it is smaller than the viewport.
fn clamp_scroll(pos: &mut Position, dest: &Rect) {
    let t = pos.transform;
    let bb = pos.boundingbox;

    // space at the right of the bounding box
    if t.to_device(bb.x2 - pos.scroll_x, 0.0).0 < dest.x2 {
        pos.scroll_x = bb.x2 - t.to_user(dest.x2, 0.0).0;
    }
    // space at the left
    if t.to_device(bb.x1 - pos.scroll_x, 0.0).0 > dest.x1 {
        pos.scroll_x = bb.x1 - t.to_user(dest.x1, 0.0).0;
    }
    // too narrow to fill the screen: center
    if bb.width() < t.to_user_distance(dest.width(), 0.0).0 {
        pos.scroll_x =
            (bb.x1 + bb.x2) / 2.0 - t.to_user((dest.x1 + dest.x2) / 2.0, 0.0).0;
    }

    // space below
    if t.to_device(0.0, bb.y2 - pos.scroll_y).1 < dest.y2 {
        pos.scroll_y = bb.y2 - t.to_user(0.0, dest.y2).1;
    }
    // space above
    if t.to_device(0.0, bb.y1 - pos.scroll_y).1 > dest.y1 {
        pos.scroll_y = bb.y1 - t.to_user(0.0, dest.y1).1;
    }
    // too short: center
    if bb.height() < t.to_user_distance(0.0, dest.height()).1 {
        pos.scroll_y =
            (bb.y1 + bb.y2) / 2.0 - t.to_user(0.0, (dest.y1 + dest.y2) / 2.0).1;
    }
}

/// Go to the top of the current block.
///
/// Zero scroll maps the viewbox corner to the viewport corner, which
/// centers the block; with fit none the viewbox may be smaller than the
/// block, and a zero scroll would show its middle, so the scroll is offset
/// to the block's upper-left corner instead.
pub fn top_of_block(pos: &mut Position, view: &View, dest: &Rect) {
    pos.scroll_x = 0.0;
    pos.scroll_y = 0.0;
    move_to(pos, view, dest);
    let block = pos.block();
    pos.scroll_x = (block.x1 - pos.viewbox.x1).min(0.0);
    pos.scroll_y = (block.y1 - pos.viewbox.y1).min(0.0);
}

/// Go to the bottom-right of the current block, the mirror image of
/// [`top_of_block`].
pub fn bottom_of_block(pos: &mut Position, view: &View, dest: &Rect) {
    pos.scroll_x = 0.0;
    pos.scroll_y = 0.0;
    move_to(pos, view, dest);
    let block = pos.block();
    let t = pos.transform;
    pos.scroll_x = pos.viewbox.x2.max(block.x2) - t.to_user(dest.x2, 0.0).0;
    pos.scroll_y = pos.viewbox.y2.max(block.y2) - t.to_user(0.0, dest.y2).1;
}

/// Go to the top of the first block of the page.
pub fn first_block(pos: &mut Position, view: &View, dest: &Rect) {
    pos.box_index = 0;
    top_of_block(pos, view, dest);
}

/// Go to the bottom of the last block of the page.
pub fn last_block(pos: &mut Position, view: &View, dest: &Rect) {
    pos.box_index = pos.textarea.len().saturating_sub(1);
    bottom_of_block(pos, view, dest);
}

/// Whether the whole bounding box fits in the viewport.
pub fn boundingbox_in_screen(pos: &Position, dest: &Rect) -> bool {
    let t = pos.transform;
    pos.boundingbox.width() <= t.to_user_distance(dest.width(), 0.0).0
        && pos.boundingbox.height() <= t.to_user_distance(0.0, dest.height()).1
}

/// Whether a rectangle lies inside (or beyond) the visible part of the
/// current block, looking forward or backward.
///
/// With `in_screen`, a rectangle inside the viewport qualifies; without
/// it, only one strictly past the viewport edge does.
pub fn relative_screen(
    pos: &Position,
    dest: &Rect,
    r: &Rect,
    in_screen: bool,
    forward: bool,
) -> bool {
    let t = pos.transform;
    if forward {
        let (x, y) = t.to_device(r.x1, r.y1);
        if in_screen {
            x >= dest.x1 && y >= dest.y1
        } else {
            x > dest.x2 || y > dest.y2
        }
    } else {
        let (x, y) = t.to_device(r.x2, r.y2);
        if in_screen {
            x <= dest.x2 && y <= dest.y2
        } else {
            x < dest.x1 || y < dest.y1
        }
    }
}
