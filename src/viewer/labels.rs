//! The labels over the document.
//!
//! Labels run on every cycle and decide by themselves whether to paint,
//! comparing against the value they showed last; the `s` key forces all of
//! them once. A painted label arms a short timeout so the next cycle's
//! redraw erases it.

use crate::backend::{DocumentBackend, PageBackend};
use crate::device::{Canvas, NO_TIMEOUT};
use crate::ui::{draw_label, UiContext};
use crate::viewer::view::{Fit, ViewMode};
use crate::viewer::Viewer;

/// Run every label.
pub(crate) fn run<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) {
    help(viewer, canvas, ui);
    page_number(viewer, canvas, ui);
    show_mode(viewer, canvas, ui);
    show_fit(viewer, canvas, ui);
    filename(viewer, canvas, ui);
}

fn arm_timeout(ui: &mut UiContext) {
    if ui.timeout == NO_TIMEOUT {
        ui.timeout = 1200;
    }
    ui.flush = true;
}

/// One-shot message, consumed once shown.
fn help<B: DocumentBackend>(viewer: &mut Viewer<B>, canvas: &mut Canvas, ui: &mut UiContext) {
    if viewer.view.help.is_empty() {
        return;
    }
    let text = std::mem::take(&mut viewer.view.help);
    draw_label(canvas, ui, &text, 1);
    ui.flush = true;
}

/// Page number, with a note when the page carries annotations or actions.
fn page_number<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) {
    let page_index = viewer.pos.page_index;
    if viewer.label_page == Some(page_index) && !viewer.view.show_page_number {
        return;
    }

    let annots = viewer.page.has_annotations();
    let actions = viewer.page.has_actions();
    let extra = match (annots, actions) {
        (true, true) => " - contains annotations and actions",
        (true, false) => " - contains annotations",
        (false, true) => " - contains actions",
        (false, false) => "",
    };
    let text = if viewer.view.total_pages {
        format!(
            "page {} of {}{}",
            page_index + 1,
            viewer.doc.page_count(),
            extra
        )
    } else {
        format!("page {}{}", page_index + 1, extra)
    };
    draw_label(canvas, ui, &text, 2);

    arm_timeout(ui);
    viewer.view.show_page_number = false;
    viewer.label_page = Some(page_index);
}

/// The view mode, with the effective area in auto mode.
fn show_mode<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) {
    let mode = viewer.view.mode;
    let single = viewer.pos.textarea.len() == 1;
    if viewer.label_mode == Some((mode, single)) && !viewer.view.show_mode {
        return;
    }

    let name = match mode {
        ViewMode::Auto => "auto",
        ViewMode::TextArea => "textarea",
        ViewMode::BoundingBox => "boundingbox",
        ViewMode::Page => "page",
    };
    let actual = if mode != ViewMode::Auto {
        ""
    } else if single {
        " (boundingbox)"
    } else {
        " (textarea)"
    };
    draw_label(canvas, ui, &format!("viewmode: {name}{actual}"), 3);

    arm_timeout(ui);
    viewer.view.show_mode = false;
    viewer.label_mode = Some((mode, single));
}

/// The fit direction.
fn show_fit<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) {
    let fit = viewer.view.fit;
    if viewer.label_fit == Some(fit) && !viewer.view.show_fit {
        return;
    }

    let name = match fit {
        Fit::None => "none",
        Fit::Horizontal => "horizontal",
        Fit::Vertical => "vertical",
        Fit::Both => "both",
    };
    draw_label(canvas, ui, &format!("fit: {name}"), 4);

    arm_timeout(ui);
    viewer.view.show_fit = false;
    viewer.label_fit = Some(fit);
}

/// The file name, only on request.
fn filename<B: DocumentBackend>(
    viewer: &mut Viewer<B>,
    canvas: &mut Canvas,
    ui: &mut UiContext,
) {
    if !viewer.view.show_filename {
        return;
    }
    let path = viewer.doc.path().to_string();
    draw_label(canvas, ui, &path, 5);
    arm_timeout(ui);
    viewer.view.show_filename = false;
}
