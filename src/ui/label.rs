//! Label pills.
//!
//! A label is a centered dark pill at a vertical slot counted from the
//! bottom of the drawable area. Labels never receive input; each label
//! handler decides on its own whether to paint, typically by comparing
//! against the value it showed last.

use crate::device::{rgb, Canvas};
use crate::geometry::Rect;
use crate::ui::UiContext;

/// Paint `text` centered at `slot` label heights from the bottom.
pub fn draw_label(canvas: &mut Canvas, ui: &UiContext, text: &str, slot: usize) {
    canvas.set_identity();

    let width = text.chars().count() as f64 * ui.extents.max_x_advance;
    let h = ui.extents.height;
    let x = ui.dest.x1 + ui.dest.width() / 2.0 - width / 2.0;
    let y = ui.dest.y2 - slot as f64 * (h + 20.0 + 2.0);

    canvas.fill_rect(
        Rect::new(x - 10.0, y - 20.0, x + width + 10.0, y + h),
        rgb(0.0, 0.0, 0.0),
    );
    canvas.show_text(x, y - 10.0 + ui.extents.ascent, text, rgb(0.8, 0.8, 0.8));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UiFont;
    use crate::signals::SignalFlags;

    #[test]
    fn test_label_paints_pill() {
        let mut ui = UiContext::new(SignalFlags::new());
        ui.dest = Rect::new(0.0, 0.0, 200.0, 200.0);
        ui.extents.height = 20.0;
        ui.extents.ascent = 16.0;
        ui.extents.max_x_advance = 10.0;
        let mut canvas = Canvas::new(200, 200, UiFont::metrics_only(16.0));
        canvas.clear(rgb(1.0, 1.0, 1.0));
        draw_label(&mut canvas, &ui, "page 3", 1);
        // The pill is centered horizontally: 6 chars of 10 px → x 70..130.
        let p = canvas.pixmap().pixel(100, 170).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (0, 0, 0));
        let q = canvas.pixmap().pixel(20, 170).unwrap();
        assert_eq!((q.red(), q.green(), q.blue()), (255, 255, 255));
    }
}
