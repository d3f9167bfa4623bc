//! Changeable rectangle.
//!
//! A movable rectangle with one of its two corners selected; the arrow
//! keys nudge the corner, with a larger step while a key is autorepeating
//! (the same key within 200 ms). The rectangle is clamped to the drawable
//! area.

use std::time::{Duration, Instant};

use crate::device::{rgb, Canvas, Key};
use crate::geometry::Rect;
use crate::ui::{Outcome, UiContext};

/// Step while a key repeats.
const FAST_STEP: f64 = 25.0;
/// Step for an isolated keypress.
const SLOW_STEP: f64 = 10.0;
/// Repeat detection window.
const REPEAT_WINDOW: Duration = Duration::from_millis(200);

/// Editor state: which corner moves and the key-repeat tracker.
#[derive(Debug, Clone)]
pub struct RectangleEditor {
    corner: usize,
    last: Option<(Key, Instant)>,
}

impl Default for RectangleEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RectangleEditor {
    /// Editor moving the top-left corner.
    pub fn new() -> Self {
        Self {
            corner: 0,
            last: None,
        }
    }

    /// Choose the moving corner: 0 for top-left, 1 for bottom-right.
    pub fn set_corner(&mut self, corner: usize) {
        self.corner = corner.min(1);
    }

    fn step(&mut self, key: Key) -> f64 {
        let now = Instant::now();
        let fast = matches!(self.last, Some((k, t)) if k == key && now - t < REPEAT_WINDOW);
        self.last = Some((key, now));
        if fast {
            FAST_STEP
        } else {
            SLOW_STEP
        }
    }

    /// Process a key against `rect`, repaint, and report the outcome.
    pub fn handle(
        &mut self,
        key: Key,
        ui: &mut UiContext,
        canvas: &mut Canvas,
        rect: &mut Rect,
    ) -> Outcome {
        if key == Key::Init || key == Key::Refresh {
            self.draw(ui, canvas, rect);
            ui.flush = true;
            return Outcome::Changed;
        }

        let mut x1 = rect.x1;
        let mut y1 = rect.y1;
        let mut x2 = rect.x2;
        let mut y2 = rect.y2;
        let (x, y) = if self.corner == 0 {
            (&mut x1, &mut y1)
        } else {
            (&mut x2, &mut y2)
        };

        match key {
            Key::Right => *x += self.step(key),
            Key::Left => *x -= self.step(key),
            Key::Up => *y -= self.step(key),
            Key::Down => *y += self.step(key),
            Key::Char('c') => {}
            Key::Escape | Key::Exit | Key::Finish => return Outcome::Leave,
            Key::Enter => return Outcome::Done,
            _ => return Outcome::Unchanged,
        }

        *x = x.clamp(ui.dest.x1, ui.dest.x2);
        *y = y.clamp(ui.dest.y1, ui.dest.y2);

        *rect = Rect::new(x1, y1, x2, y2);
        ui.redraw = true;
        Outcome::Refresh
    }

    fn draw(&self, ui: &UiContext, canvas: &mut Canvas, rect: &Rect) {
        let _ = ui;
        canvas.set_identity();
        let red = rgb(1.0, 0.0, 0.0);
        let (cx, cy) = if self.corner == 0 {
            (rect.x1, rect.y1)
        } else {
            (rect.x2, rect.y2)
        };
        canvas.fill_rect(Rect::new(cx - 5.0, cy - 5.0, cx + 5.0, cy + 5.0), red);
        canvas.stroke_rect(*rect, red, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UiFont;
    use crate::signals::SignalFlags;

    fn fixture() -> (UiContext, Canvas) {
        let mut ui = UiContext::new(SignalFlags::new());
        ui.dest = Rect::new(0.0, 0.0, 640.0, 480.0);
        let canvas = Canvas::new(640, 480, UiFont::metrics_only(16.0));
        (ui, canvas)
    }

    #[test]
    fn test_nudge_and_accelerate() {
        let (mut ui, mut canvas) = fixture();
        let mut editor = RectangleEditor::new();
        let mut rect = Rect::new(100.0, 100.0, 200.0, 200.0);
        assert_eq!(
            editor.handle(Key::Right, &mut ui, &mut canvas, &mut rect),
            Outcome::Refresh
        );
        assert_eq!(rect.x1, 110.0);
        // Immediately repeated: the larger step.
        editor.handle(Key::Right, &mut ui, &mut canvas, &mut rect);
        assert_eq!(rect.x1, 135.0);
        assert!(ui.redraw);
    }

    #[test]
    fn test_clamped_to_dest() {
        let (mut ui, mut canvas) = fixture();
        let mut editor = RectangleEditor::new();
        let mut rect = Rect::new(5.0, 5.0, 200.0, 200.0);
        editor.handle(Key::Left, &mut ui, &mut canvas, &mut rect);
        assert_eq!(rect.x1, 0.0);
        editor.handle(Key::Up, &mut ui, &mut canvas, &mut rect);
        assert_eq!(rect.y1, 0.0);
    }

    #[test]
    fn test_second_corner() {
        let (mut ui, mut canvas) = fixture();
        let mut editor = RectangleEditor::new();
        editor.set_corner(1);
        let mut rect = Rect::new(100.0, 100.0, 200.0, 200.0);
        editor.handle(Key::Down, &mut ui, &mut canvas, &mut rect);
        assert_eq!(rect.y2, 210.0);
        assert_eq!(rect.y1, 100.0);
    }

    #[test]
    fn test_done_and_leave() {
        let (mut ui, mut canvas) = fixture();
        let mut editor = RectangleEditor::new();
        let mut rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            editor.handle(Key::Enter, &mut ui, &mut canvas, &mut rect),
            Outcome::Done
        );
        assert_eq!(
            editor.handle(Key::Escape, &mut ui, &mut canvas, &mut rect),
            Outcome::Leave
        );
    }
}
