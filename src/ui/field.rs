//! The generic textfield.

use crate::device::{rgb, Canvas, Key};
use crate::ui::{Outcome, UiContext};

/// Longest accepted input.
const MAX_LEN: usize = 30;

/// An editable line of text with a cursor.
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    chars: Vec<char>,
    cursor: usize,
}

impl FieldState {
    /// An empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current content.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Replace the content, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.chars.truncate(MAX_LEN);
        self.cursor = self.chars.len();
    }

    /// Empty the field.
    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Whether the field is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Process a key, repaint, and report what happened. Pasted text is
    /// taken from `ui.paste`.
    ///
    /// An `error` is shown as a right-aligned badge; the field stays open.
    pub fn handle(
        &mut self,
        key: Key,
        ui: &mut UiContext,
        canvas: &mut Canvas,
        prompt: &str,
        error: Option<&str>,
    ) -> Outcome {
        match key {
            Key::Escape | Key::Exit | Key::Finish => return Outcome::Leave,
            Key::Enter => return Outcome::Done,
            Key::Backspace | Key::Delete => {
                if self.cursor == 0 {
                    return Outcome::Unchanged;
                }
                self.chars.remove(self.cursor - 1);
                self.cursor -= 1;
            }
            Key::Left => {
                if self.cursor == 0 {
                    return Outcome::Unchanged;
                }
                self.cursor -= 1;
            }
            Key::Right => {
                if self.cursor >= MAX_LEN || self.cursor >= self.chars.len() {
                    return Outcome::Unchanged;
                }
                self.cursor += 1;
            }
            Key::Paste => {
                let pasted: Vec<char> = ui.paste.chars().collect();
                if self.chars.len() + pasted.len() > MAX_LEN {
                    return Outcome::Unchanged;
                }
                let count = pasted.len();
                for (i, c) in pasted.into_iter().enumerate() {
                    self.chars.insert(self.cursor + i, c);
                }
                self.cursor += count;
            }
            Key::Char(c) if !c.is_control() => {
                if self.chars.len() > MAX_LEN {
                    return Outcome::Unchanged;
                }
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            Key::Init | Key::Redraw | Key::Refresh | Key::Resize => {}
            _ => return Outcome::Unchanged,
        }

        ui.flush = true;
        self.draw(ui, canvas, prompt, error);
        Outcome::Changed
    }

    /// Paint the field box, prompt, content, cursor and error badge.
    pub fn draw(&self, ui: &UiContext, canvas: &mut Canvas, prompt: &str, error: Option<&str>) {
        let percent = 0.8;
        let margin_x = ui.dest.width() * (1.0 - percent) / 2.0;
        let margin_y = 20.0;
        let start_x = ui.dest.x1 + margin_x;
        let start_y = ui.dest.y1 + margin_y;
        let box_h = ui.extents.height + 10.0;

        canvas.set_identity();
        canvas.fill_rect(
            crate::geometry::Rect::new(start_x, start_y, ui.dest.x2 - margin_x, start_y + box_h),
            rgb(0.8, 0.8, 0.8),
        );

        let black = rgb(0.0, 0.0, 0.0);
        let baseline = start_y + 5.0 + ui.extents.ascent;
        let text = self.text();
        canvas.show_text(start_x + 10.0, baseline, prompt, black);
        let prompt_w = canvas.text_width(prompt);
        canvas.show_text(start_x + 10.0 + prompt_w, baseline, &text, black);

        let prefix: String = self.chars[..self.cursor].iter().collect();
        let cursor_x = start_x + 10.0 + prompt_w + canvas.text_width(&prefix);
        canvas.show_text(cursor_x, baseline, "_", black);

        if let Some(error) = error {
            let advance = canvas.text_width(error);
            let badge_x = ui.dest.x2 - margin_x - advance - 20.0;
            canvas.fill_rect(
                crate::geometry::Rect::new(badge_x, start_y, badge_x + advance + 20.0, start_y + box_h),
                rgb(0.8, 0.0, 0.0),
            );
            canvas.show_text(badge_x + 10.0, baseline, error, rgb(1.0, 1.0, 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UiFont;
    use crate::signals::SignalFlags;

    fn fixture() -> (UiContext, Canvas) {
        let mut ui = UiContext::new(SignalFlags::new());
        ui.dest = crate::geometry::Rect::new(10.0, 10.0, 630.0, 470.0);
        let canvas = Canvas::new(640, 480, UiFont::metrics_only(16.0));
        (ui, canvas)
    }

    #[test]
    fn test_typing_and_cursor() {
        let (mut ui, mut canvas) = fixture();
        let mut field = FieldState::new();
        for c in "abc".chars() {
            assert_eq!(
                field.handle(Key::Char(c), &mut ui, &mut canvas, "find: ", None),
                Outcome::Changed
            );
        }
        field.handle(Key::Left, &mut ui, &mut canvas, "find: ", None);
        field.handle(Key::Char('X'), &mut ui, &mut canvas, "find: ", None);
        assert_eq!(field.text(), "abXc");
        assert_eq!(
            field.handle(Key::Enter, &mut ui, &mut canvas, "find: ", None),
            Outcome::Done
        );
    }

    #[test]
    fn test_backspace_at_start_unchanged() {
        let (mut ui, mut canvas) = fixture();
        let mut field = FieldState::new();
        assert_eq!(
            field.handle(Key::Backspace, &mut ui, &mut canvas, "", None),
            Outcome::Unchanged
        );
        field.handle(Key::Char('a'), &mut ui, &mut canvas, "", None);
        field.handle(Key::Left, &mut ui, &mut canvas, "", None);
        assert_eq!(
            field.handle(Key::Backspace, &mut ui, &mut canvas, "", None),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_paste_inserts_at_cursor() {
        let (mut ui, mut canvas) = fixture();
        let mut field = FieldState::new();
        field.handle(Key::Char('h'), &mut ui, &mut canvas, "", None);
        field.handle(Key::Char('e'), &mut ui, &mut canvas, "", None);
        ui.paste = "llo".to_string();
        assert_eq!(
            field.handle(Key::Paste, &mut ui, &mut canvas, "", None),
            Outcome::Changed
        );
        assert_eq!(field.text(), "hello");
        assert_eq!(
            field.handle(Key::Enter, &mut ui, &mut canvas, "", None),
            Outcome::Done
        );
    }

    #[test]
    fn test_paste_over_limit_rejected() {
        let (mut ui, mut canvas) = fixture();
        let mut field = FieldState::new();
        ui.paste = "x".repeat(31);
        assert_eq!(
            field.handle(Key::Paste, &mut ui, &mut canvas, "", None),
            Outcome::Unchanged
        );
        assert!(field.is_empty());
    }

    #[test]
    fn test_escape_leaves() {
        let (mut ui, mut canvas) = fixture();
        let mut field = FieldState::new();
        assert_eq!(
            field.handle(Key::Escape, &mut ui, &mut canvas, "", None),
            Outcome::Leave
        );
    }
}
