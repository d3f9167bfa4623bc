//! The viewer: document window, modal windows, labels and reload.
//!
//! Ties the analysis engine to the UI runtime. The document window owns
//! the position and is the only window allowed to request a document
//! redraw directly; the modal windows (menu, search, go-to-page, the
//! value fields) draw over the document and hand control back through the
//! window protocol.

mod labels;
mod navigation;
pub mod position;
mod search;
pub mod view;
mod windows;

pub use position::Position;
pub use view::{Fit, View, ViewMode};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tiny_skia::BlendMode;

use crate::backend::{page_rect, DocumentBackend, PageBackend};
use crate::device::{rgb, Canvas, Key};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::layout::{self, recurring, RecurringParams};
use crate::ui::{App, FieldState, ListState, NumberState, UiContext, WindowReply};

/// The windows of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowId {
    /// The document view; receives input when no modal window is active.
    Document,
    /// Key reference.
    Help,
    /// Startup tutorial.
    Tutorial,
    /// Go-to-page field.
    GotoPage,
    /// Search field.
    Search,
    /// View-mode menu.
    ViewMode,
    /// Fit-direction menu.
    FitDirection,
    /// Block-order menu.
    Order,
    /// Main menu.
    Menu,
    /// Minimal-width field.
    Width,
    /// Block-distance field.
    Distance,
}

/// The viewer over an open document.
pub struct Viewer<B: DocumentBackend> {
    pub(crate) doc: B,
    pub(crate) page: B::Page,
    /// Current position.
    pub pos: Position,
    /// Display state.
    pub view: View,
    update_id: Option<Vec<u8>>,
    recurring: Vec<Rect>,

    // per-window state, living for the viewer's lifetime
    pub(crate) help_list: ListState,
    pub(crate) tutorial_list: ListState,
    pub(crate) menu_list: ListState,
    pub(crate) mode_list: ListState,
    pub(crate) fit_list: ListState,
    pub(crate) order_list: ListState,
    pub(crate) goto_field: NumberState,
    pub(crate) width_field: NumberState,
    pub(crate) distance_field: NumberState,
    pub(crate) search_field: FieldState,

    // last values shown by the labels
    pub(crate) label_page: Option<usize>,
    pub(crate) label_mode: Option<(ViewMode, bool)>,
    pub(crate) label_fit: Option<Fit>,
}

impl<B: DocumentBackend> Viewer<B> {
    /// Open the viewer over a document.
    pub fn open(doc: B, view: View) -> Result<Viewer<B>> {
        if doc.page_count() == 0 {
            return Err(Error::EmptyDocument);
        }
        let page = doc.load_page(0)?;
        let update_id = doc.update_id();
        let mut viewer = Viewer {
            doc,
            page,
            pos: Position::new(),
            view,
            update_id,
            recurring: Vec::new(),
            help_list: ListState::new(),
            tutorial_list: ListState::new(),
            menu_list: ListState::new(),
            mode_list: ListState::new(),
            fit_list: ListState::new(),
            order_list: ListState::new(),
            goto_field: NumberState::new(),
            width_field: NumberState::new(),
            distance_field: NumberState::new(),
            search_field: FieldState::new(),
            label_page: None,
            label_mode: None,
            label_fit: None,
        };
        viewer.refresh_area();
        viewer.detect_recurring();
        Ok(viewer)
    }

    /// The open document.
    pub fn document(&self) -> &B {
        &self.doc
    }

    /// Load the current page and recompute matches and text area. A page
    /// that fails to load promotes to a reload request.
    pub(crate) fn read_page(&mut self, ui: &mut UiContext) {
        match self.doc.load_page(self.pos.page_index) {
            Ok(page) => self.page = page,
            Err(e) => {
                log::debug!("page {} unavailable: {e}", self.pos.page_index);
                ui.reload = true;
                return;
            }
        }
        self.page_match();
        self.refresh_area();
    }

    /// Recompute the text area and bounding box for the view mode.
    pub(crate) fn refresh_area(&mut self) {
        compute_area(&mut self.pos, &self.page, &self.view);
    }

    /// Run the recurring-block detector when clipping is enabled.
    fn detect_recurring(&mut self) {
        if !self.view.clip_recurring {
            self.recurring.clear();
            return;
        }
        let params = RecurringParams {
            distance: self.view.distance,
            cutoff_divisor: self.view.recurring_cutoff,
            ..RecurringParams::default()
        };
        let mut rng = StdRng::from_entropy();
        self.recurring = recurring::frequent(&self.doc, &params, &mut rng);
        log::debug!("{} recurring blocks", self.recurring.len());
    }

    /// Whether the file was rewritten since the last check.
    fn document_changed(&mut self) -> bool {
        let current = self.doc.update_id();
        let changed = match (&self.update_id, &current) {
            (Some(old), Some(new)) => old != new,
            _ => false,
        };
        self.update_id = current;
        changed
    }

    /// Paint the document: page content (with recurring blocks clipped
    /// out), current-block border, page border and search highlights.
    fn draw_document(&mut self, canvas: &mut Canvas, ui: &mut UiContext) {
        position::move_to(&mut self.pos, &self.view, &ui.dest);
        canvas.set_transform(self.pos.transform);

        let whole = page_rect(&self.page);
        if !self.recurring.is_empty() {
            let clip = recurring::blocks_to_clip(&self.pos.textarea, &self.recurring);
            if !clip.is_empty() {
                let holes: Vec<Rect> =
                    clip.iter().map(|&i| self.pos.textarea[i]).collect();
                canvas.clip_exclude(whole, &holes, 2.0);
            }
        }
        self.page.render(canvas);
        canvas.reset_clip();

        if self.document_changed() {
            ui.reload = true;
            return;
        }

        canvas.stroke_rect(self.pos.block(), rgb(0.6, 0.6, 1.0), 1.0);
        canvas.stroke_rect(whole, rgb(1.0, 0.8, 0.8), 1.0);
        for r in &self.view.found {
            canvas.fill_rect_blend(*r, rgb(0.3, 0.0, 0.3), BlendMode::Difference);
        }
        canvas.set_identity();
    }

    /// Re-open the document and clamp the position to its new extent.
    fn reload_document(&mut self, ui: &mut UiContext) {
        if let Err(e) = self.doc.reload() {
            log::error!("cannot reload {}: {e}", self.doc.path());
            return;
        }
        self.update_id = self.doc.update_id();

        let total = self.doc.page_count();
        if self.pos.page_index >= total {
            self.pos.page_index = total.saturating_sub(1);
            self.read_page(ui);
            self.pos.box_index = self.pos.textarea.len().saturating_sub(1);
            position::top_of_block(&mut self.pos, &self.view, &ui.dest);
        } else {
            self.read_page(ui);
            if self.pos.box_index >= self.pos.textarea.len() {
                self.pos.box_index = self.pos.textarea.len() - 1;
            }
        }
        self.detect_recurring();
        ui.redraw = true;
    }
}

/// Compute a position's text area and bounding box for the view mode.
///
/// Free-standing so cross-page search can run it on scan copies without
/// touching the displayed position.
pub(crate) fn compute_area<P: PageBackend + ?Sized>(pos: &mut Position, page: &P, view: &View) {
    let whole = page_rect(page);
    let (boundingbox, blocks) = match view.mode {
        ViewMode::Auto | ViewMode::TextArea => {
            if layout::bounding_box(page).is_none() {
                (None, None)
            } else {
                let area = layout::text_area(page, view.distance);
                let bbox = area.join_all();
                let mut blocks = area.into_vec();
                let multi_column = view.mode == ViewMode::TextArea
                    || bbox
                        .map(|b| layout::inter_overlap(&blocks, &b) >= view.overlap_threshold)
                        .unwrap_or(false);
                if multi_column {
                    let chars: Vec<Rect> = page.chars().iter().map(|c| c.rect).collect();
                    view.order.sort(&mut blocks, &chars);
                    (bbox, Some(blocks))
                } else {
                    (bbox, None)
                }
            }
        }
        ViewMode::BoundingBox => (layout::bounding_box(page), None),
        ViewMode::Page => (Some(whole), None),
    };

    pos.boundingbox = boundingbox.unwrap_or(whole);
    pos.textarea = blocks.unwrap_or_else(|| vec![pos.boundingbox]);
    if pos.box_index >= pos.textarea.len() {
        pos.box_index = pos.textarea.len() - 1;
    }
}

impl<B: DocumentBackend> App for Viewer<B> {
    type WindowId = WindowId;
    const DOCUMENT: WindowId = WindowId::Document;

    fn handle(
        &mut self,
        window: WindowId,
        key: Key,
        canvas: &mut Canvas,
        ui: &mut UiContext,
    ) -> WindowReply<WindowId> {
        windows::dispatch(self, window, key, canvas, ui)
    }

    fn draw(&mut self, canvas: &mut Canvas, ui: &mut UiContext) {
        self.draw_document(canvas, ui);
    }

    fn labels(&mut self, canvas: &mut Canvas, ui: &mut UiContext) {
        labels::run(self, canvas, ui);
    }

    fn resize(&mut self, _canvas: &mut Canvas, _ui: &mut UiContext) {
        // undo the box centering; it is recomputed for the new size
        if matches!(self.view.fit, Fit::Horizontal | Fit::Both) {
            self.pos.scroll_x = 0.0;
        }
        if matches!(self.view.fit, Fit::Vertical | Fit::Both) {
            self.pos.scroll_y = 0.0;
        }
    }

    fn update(&mut self, ui: &mut UiContext) {
        self.reload_document(ui);
    }

    fn external(
        &mut self,
        command: &str,
        window: WindowId,
        canvas: &mut Canvas,
        ui: &mut UiContext,
    ) -> WindowReply<WindowId> {
        windows::external(self, command, window, canvas, ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sim::SimPage;

    fn two_column_page() -> SimPage {
        let mut page = SimPage::new(612.0, 792.0);
        for line in 0..12 {
            let y = 100.0 + line as f64 * 14.0;
            page = page
                .text_line(50.0, y, "this is the left side column")
                .text_line(320.0, y, "and this the right side one x");
        }
        page
    }

    fn area_for(page: &SimPage, mode: ViewMode) -> Position {
        let mut pos = Position::new();
        let mut view = View::new();
        view.mode = mode;
        view.distance = 9.0;
        compute_area(&mut pos, page, &view);
        pos
    }

    #[test]
    fn test_page_mode_is_page_rect() {
        let page = two_column_page();
        let pos = area_for(&page, ViewMode::Page);
        assert_eq!(pos.textarea, vec![Rect::new(0.0, 0.0, 612.0, 792.0)]);
        assert_eq!(pos.boundingbox, Rect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_bbox_mode_is_single_rect() {
        let page = two_column_page();
        let pos = area_for(&page, ViewMode::BoundingBox);
        assert_eq!(pos.textarea.len(), 1);
        assert_eq!(pos.textarea[0], pos.boundingbox);
        assert!(pos.boundingbox.x1 >= 50.0 - 1e-9);
    }

    #[test]
    fn test_auto_keeps_columns_but_collapses_single() {
        let two = area_for(&two_column_page(), ViewMode::Auto);
        assert_eq!(two.textarea.len(), 2);

        // A single column has a low inter-overlap index: auto falls back
        // to the bounding box.
        let mut single = SimPage::new(612.0, 792.0);
        for line in 0..12 {
            single = single.text_line(50.0, 100.0 + line as f64 * 14.0, "one column only");
        }
        let pos = area_for(&single, ViewMode::Auto);
        assert_eq!(pos.textarea.len(), 1);
        assert_eq!(pos.textarea[0], pos.boundingbox);
    }

    #[test]
    fn test_decomposition_join_within_bbox() {
        let page = two_column_page();
        let pos = area_for(&page, ViewMode::TextArea);
        let join = pos
            .textarea
            .iter()
            .copied()
            .reduce(|a, b| a.join(&b))
            .unwrap();
        assert_eq!(join, pos.boundingbox);
    }

    #[test]
    fn test_empty_page_falls_back_to_page_rect() {
        let page = SimPage::new(612.0, 792.0);
        let pos = area_for(&page, ViewMode::Auto);
        assert_eq!(pos.textarea, vec![Rect::new(0.0, 0.0, 612.0, 792.0)]);
    }
}
