//! Motion between blocks and pages.
//!
//! Scrolling moves within the current block until its far edge reaches the
//! viewport, then delegates to the block transitions; block transitions at
//! the list boundaries advance the page. At the document boundaries every
//! motion is a silent no-op.

use crate::backend::DocumentBackend;
use crate::ui::UiContext;
use crate::viewer::position::{
    self, bottom_of_block, first_block, last_block, move_to, top_of_block,
};
use crate::viewer::view::Fit;
use crate::viewer::Viewer;

impl<B: DocumentBackend> Viewer<B> {
    /// Move to the top of the first block of the next page.
    pub(crate) fn next_page(&mut self, ui: &mut UiContext) {
        if self.pos.page_index + 1 >= self.doc.page_count() {
            return;
        }
        self.pos.page_index += 1;
        self.read_page(ui);
        first_block(&mut self.pos, &self.view, &ui.dest);
    }

    /// Move to the bottom of the last block of the previous page.
    pub(crate) fn prev_page(&mut self, ui: &mut UiContext) {
        if self.pos.page_index == 0 {
            return;
        }
        self.pos.page_index -= 1;
        self.read_page(ui);
        last_block(&mut self.pos, &self.view, &ui.dest);
    }

    /// Move to the top of the next block, or to the next page past the
    /// last block. With fit none, manual scrolling replaces block
    /// navigation, so the page does not advance.
    pub(crate) fn next_block(&mut self, ui: &mut UiContext) {
        if self.pos.box_index + 1 >= self.pos.textarea.len() {
            if self.view.fit != Fit::None {
                self.next_page(ui);
            }
            return;
        }
        self.pos.box_index += 1;
        top_of_block(&mut self.pos, &self.view, &ui.dest);
    }

    /// Move to the bottom of the previous block, or to the previous page.
    pub(crate) fn prev_block(&mut self, ui: &mut UiContext) {
        if self.pos.box_index == 0 {
            if self.view.fit != Fit::None {
                self.prev_page(ui);
            }
            return;
        }
        self.pos.box_index -= 1;
        bottom_of_block(&mut self.pos, &self.view, &ui.dest);
    }

    /// Go to the top of the first block of the page.
    pub(crate) fn first_block(&mut self, ui: &mut UiContext) {
        first_block(&mut self.pos, &self.view, &ui.dest);
    }

    /// Go to the bottom of the last block of the page.
    pub(crate) fn last_block(&mut self, ui: &mut UiContext) {
        last_block(&mut self.pos, &self.view, &ui.dest);
    }

    /// Scroll down, or advance to the next block once the block's bottom
    /// edge is inside the viewport.
    pub(crate) fn scroll_down(&mut self, ui: &mut UiContext) {
        move_to(&mut self.pos, &self.view, &ui.dest);
        let block = self.pos.block();
        let bottom = self.pos.transform.to_device(0.0, block.y2).1;
        if bottom <= ui.dest.y2 + self.view.edge_tolerance {
            self.next_block(ui);
            return;
        }
        self.pos.scroll_y += self
            .pos
            .transform
            .to_user_distance(0.0, ui.dest.height() * self.view.scroll_frac)
            .1;
    }

    /// Scroll up, or retreat to the previous block once the block's top
    /// edge is inside the viewport.
    pub(crate) fn scroll_up(&mut self, ui: &mut UiContext) {
        move_to(&mut self.pos, &self.view, &ui.dest);
        let block = self.pos.block();
        let top = self.pos.transform.to_device(0.0, block.y1).1;
        if top >= ui.dest.y1 - self.view.edge_tolerance {
            self.prev_block(ui);
            return;
        }
        self.pos.scroll_y -= self
            .pos
            .transform
            .to_user_distance(0.0, ui.dest.height() * self.view.scroll_frac)
            .1;
    }

    /// Scroll right, or advance to the next block.
    pub(crate) fn scroll_right(&mut self, ui: &mut UiContext) {
        move_to(&mut self.pos, &self.view, &ui.dest);
        let block = self.pos.block();
        let right = self.pos.transform.to_device(block.x2, 0.0).0;
        if right <= ui.dest.x2 + self.view.edge_tolerance {
            self.next_block(ui);
            return;
        }
        self.pos.scroll_x += self
            .pos
            .transform
            .to_user_distance(ui.dest.width() * self.view.scroll_frac, 0.0)
            .0;
    }

    /// Scroll left, or retreat to the previous block.
    pub(crate) fn scroll_left(&mut self, ui: &mut UiContext) {
        move_to(&mut self.pos, &self.view, &ui.dest);
        let block = self.pos.block();
        let left = self.pos.transform.to_device(block.x1, 0.0).0;
        if left >= ui.dest.x1 - self.view.edge_tolerance {
            self.prev_block(ui);
            return;
        }
        self.pos.scroll_x -= self
            .pos
            .transform
            .to_user_distance(ui.dest.width() * self.view.scroll_frac, 0.0)
            .0;
    }

    /// Whether the whole bounding box is visible (the `Z` key bound).
    pub(crate) fn boundingbox_in_screen(&self, ui: &UiContext) -> bool {
        position::boundingbox_in_screen(&self.pos, &ui.dest)
    }
}
